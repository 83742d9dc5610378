use crate::models::VenueCandidate;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// `geo:` URI for a coordinate, labelled with the venue name
pub fn geo_uri(latitude: f64, longitude: f64, name: &str) -> String {
    format!("geo:{},{}?q={}", latitude, longitude, urlencoding::encode(name))
}

/// Maps web search URL for a free-text query
pub fn maps_search_url(query: &str) -> String {
    format!("{}{}", MAPS_SEARCH_URL, urlencoding::encode(query))
}

/// Link that opens the candidate in a maps application
///
/// Prefers a stored maps URL, then a `geo:` URI, then a text search on
/// name and address.
pub fn deep_link(candidate: &VenueCandidate) -> String {
    if let Some(url) = candidate.maps_url.as_deref().filter(|u| !u.is_empty()) {
        return url.to_string();
    }

    match candidate.coordinate {
        Some(c) => geo_uri(c.latitude, c.longitude, candidate.display_name()),
        None => maps_search_url(&format!("{}, {}", candidate.display_name(), candidate.display_address())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    #[test]
    fn test_geo_uri_encodes_name() {
        let candidate = VenueCandidate {
            name: Some("Zig Zag Café".to_string()),
            coordinate: Some(Coordinate::new(47.6085, -122.3405)),
            ..Default::default()
        };
        assert_eq!(deep_link(&candidate), "geo:47.6085,-122.3405?q=Zig%20Zag%20Caf%C3%A9");
    }

    #[test]
    fn test_stored_url_wins() {
        let candidate = VenueCandidate {
            coordinate: Some(Coordinate::new(1.0, 2.0)),
            maps_url: Some("https://maps.example/nue".to_string()),
            ..Default::default()
        };
        assert_eq!(deep_link(&candidate), "https://maps.example/nue");
    }

    #[test]
    fn test_search_url_without_coordinate() {
        let candidate = VenueCandidate {
            name: Some("Dick's Drive-In".to_string()),
            ..Default::default()
        };
        let link = deep_link(&candidate);
        assert!(link.starts_with(MAPS_SEARCH_URL));
        assert!(link.ends_with("Dick%27s%20Drive-In%2C%20Unknown%20Address"));
    }
}
