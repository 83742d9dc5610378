use crate::core::vocabulary::normalize_preferences;
use crate::models::PreferenceSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;

pub const DEFAULT_NAMESPACE: &str = "user_preferences";

/// Errors that can occur reading or writing the preference file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),
}

/// On-disk key-value layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    key_cuisines: BTreeSet<String>,
    #[serde(default)]
    key_atmospheres: BTreeSet<String>,
    #[serde(default)]
    key_favorite_dishes: BTreeSet<String>,
}

impl From<StoredPreferences> for PreferenceSet {
    fn from(stored: StoredPreferences) -> Self {
        PreferenceSet {
            cuisines: stored.key_cuisines,
            atmospheres: stored.key_atmospheres,
            favorite_dishes: stored.key_favorite_dishes,
        }
    }
}

impl From<&PreferenceSet> for StoredPreferences {
    fn from(prefs: &PreferenceSet) -> Self {
        StoredPreferences {
            key_cuisines: prefs.cuisines.clone(),
            key_atmospheres: prefs.atmospheres.clone(),
            key_favorite_dishes: prefs.favorite_dishes.clone(),
        }
    }
}

/// Durable, observable store for the user's preferences
///
/// One JSON file per namespace. Every save replaces all three fields in a
/// single write-then-rename, and the new snapshot is published to all
/// subscribers. Reads come from the in-memory snapshot of the last
/// committed write.
pub struct PreferenceStore {
    path: PathBuf,
    snapshot: watch::Sender<PreferenceSet>,
    writer: Mutex<()>,
}

impl PreferenceStore {
    /// Open (or lazily create) the store for `namespace` under `data_dir`
    pub async fn open(data_dir: impl AsRef<Path>, namespace: &str) -> Result<Self, StoreError> {
        if namespace.is_empty() || namespace.contains(['/', '\\']) || namespace.starts_with('.') {
            return Err(StoreError::InvalidNamespace(namespace.to_string()));
        }

        let path = data_dir.as_ref().join(format!("{}.json", namespace));
        let initial = Self::read_file(&path).await?;

        tracing::info!("Preference store opened at {}", path.display());

        let (snapshot, _) = watch::channel(initial);
        Ok(Self {
            path,
            snapshot,
            writer: Mutex::new(()),
        })
    }

    async fn read_file(path: &Path) -> Result<PreferenceSet, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let stored: StoredPreferences = serde_json::from_slice(&bytes)?;
                Ok(stored.into())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PreferenceSet::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest committed preferences, empty if never written
    pub fn get(&self) -> PreferenceSet {
        self.snapshot.borrow().clone()
    }

    /// Stream of snapshots: the current value first, then one per save
    ///
    /// A slow consumer sees the most recent snapshot rather than every
    /// intermediate one.
    pub fn subscribe(&self) -> WatchStream<PreferenceSet> {
        WatchStream::new(self.snapshot.subscribe())
    }

    /// Replace all preferences in one durable write
    pub async fn save(&self, preferences: PreferenceSet) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;

        let json = serde_json::to_vec_pretty(&StoredPreferences::from(&preferences))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            "Saved preferences: {} cuisines, {} atmospheres, {} dishes",
            preferences.cuisines.len(),
            preferences.atmospheres.len(),
            preferences.favorite_dishes.len()
        );

        self.snapshot.send_replace(preferences);
        Ok(())
    }

    /// Normalize display names and save
    pub async fn save_display<S: AsRef<str>>(
        &self,
        cuisines: Vec<S>,
        atmospheres: Vec<S>,
        dishes: Vec<S>,
    ) -> Result<PreferenceSet, StoreError> {
        let preferences = normalize_preferences(cuisines, atmospheres, dishes);
        self.save(preferences.clone()).await?;
        Ok(preferences)
    }
}
