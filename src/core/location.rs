use crate::models::{Coordinate, LocationState, ResolutionError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// How long a device or geocoding lookup may take before it is abandoned
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Grants or denies access to the device location
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request(&self) -> bool;
}

/// Answers "where is the device right now"
///
/// `Ok(None)` means the provider answered but had no fix.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn last_known(&self) -> Result<Option<Coordinate>, ResolutionError>;
}

/// Turns a free-form address into a coordinate
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ResolutionError>;
}

/// What the user typed on the manual entry screen
#[derive(Debug, Clone, PartialEq)]
pub enum ManualLocation {
    Coordinate(Coordinate),
    Address(String),
    Unspecified,
}

/// Resolves the user's location through the permission / fetch state machine
///
/// `Idle -> RequestingPermission -> Fetching -> Resolved | Failed`
///
/// Calls are single-flight: a second call waits for the one in progress.
/// A device lookup that exceeds the timeout leaves the state at
/// `Failed(Timeout)`; the provider call keeps running detached and its
/// result is dropped.
///
/// The last resolved coordinate outlives later failures and is read
/// through [`LocationResolver::coordinate`].
pub struct LocationResolver {
    permission: Arc<dyn PermissionGate>,
    provider: Arc<dyn LocationProvider>,
    geocoder: Option<Arc<dyn Geocoder>>,
    default_coordinate: Coordinate,
    timeout: Duration,
    state: watch::Sender<LocationState>,
    resolved: watch::Sender<Option<Coordinate>>,
    in_flight: Mutex<()>,
}

impl LocationResolver {
    pub fn new(
        permission: Arc<dyn PermissionGate>,
        provider: Arc<dyn LocationProvider>,
        default_coordinate: Coordinate,
        timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(LocationState::Idle);
        let (resolved, _) = watch::channel(None);
        Self {
            permission,
            provider,
            geocoder: None,
            default_coordinate,
            timeout,
            state,
            resolved,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current state snapshot
    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    /// Last successfully resolved coordinate, kept across failed attempts
    pub fn coordinate(&self) -> Option<Coordinate> {
        *self.resolved.borrow()
    }

    /// Subscribe to state transitions
    pub fn watch(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    /// Resolve from manual entry
    pub async fn resolve_manual(&self, entry: ManualLocation) -> Result<Coordinate, ResolutionError> {
        let _guard = self.in_flight.lock().await;

        let outcome = match entry {
            ManualLocation::Coordinate(coordinate) => Ok(coordinate),
            ManualLocation::Address(address) => match &self.geocoder {
                Some(geocoder) => {
                    self.transition(LocationState::Fetching);
                    self.geocode(geocoder.clone(), address).await
                }
                None => {
                    tracing::debug!("No geocoder configured, using default coordinate for '{}'", address);
                    Ok(self.default_coordinate)
                }
            },
            ManualLocation::Unspecified => Ok(self.default_coordinate),
        };

        self.finish(outcome)
    }

    /// Resolve from the device location provider
    pub async fn resolve_device(&self) -> Result<Coordinate, ResolutionError> {
        let _guard = self.in_flight.lock().await;
        let outcome = self.run_device_flow().await;
        self.finish(outcome)
    }

    /// Re-enter the permission request after a failure
    ///
    /// An already resolved location is returned as is.
    pub async fn retry(&self) -> Result<Coordinate, ResolutionError> {
        let _guard = self.in_flight.lock().await;

        match self.state() {
            LocationState::Resolved { coordinate } => return Ok(coordinate),
            LocationState::Failed { error } => tracing::info!("Retrying location after failure: {}", error),
            _ => {}
        }

        let outcome = self.run_device_flow().await;
        self.finish(outcome)
    }

    async fn run_device_flow(&self) -> Result<Coordinate, ResolutionError> {
        self.transition(LocationState::RequestingPermission);

        if !self.permission.request().await {
            tracing::info!("Location permission denied");
            return Err(ResolutionError::PermissionDenied);
        }

        self.transition(LocationState::Fetching);

        let provider = self.provider.clone();
        let fetch = tokio::spawn(async move { provider.last_known().await });

        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(Ok(Some(coordinate)))) => Ok(coordinate),
            Ok(Ok(Ok(None))) => Err(ResolutionError::ProviderError("location unavailable".to_string())),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(join_error)) => Err(ResolutionError::ProviderError(format!("location task failed: {}", join_error))),
            Err(_) => {
                tracing::warn!("Device location timed out after {:?}", self.timeout);
                Err(ResolutionError::Timeout)
            }
        }
    }

    async fn geocode(&self, geocoder: Arc<dyn Geocoder>, address: String) -> Result<Coordinate, ResolutionError> {
        let lookup = tokio::spawn(async move { geocoder.geocode(&address).await });

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(Ok(Some(coordinate)))) => Ok(coordinate),
            Ok(Ok(Ok(None))) => Err(ResolutionError::NoResultsFound),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(join_error)) => Err(ResolutionError::ProviderError(format!("geocoding task failed: {}", join_error))),
            Err(_) => Err(ResolutionError::Timeout),
        }
    }

    fn finish(&self, outcome: Result<Coordinate, ResolutionError>) -> Result<Coordinate, ResolutionError> {
        match &outcome {
            Ok(coordinate) => {
                tracing::info!("Location resolved: {}", coordinate);
                self.resolved.send_replace(Some(*coordinate));
                self.transition(LocationState::Resolved { coordinate: *coordinate });
            }
            Err(error) => {
                tracing::warn!("Location failed: {}", error);
                self.transition(LocationState::Failed { error: error.clone() });
            }
        }
        outcome
    }

    fn transition(&self, next: LocationState) {
        self.state.send_replace(next);
    }
}
