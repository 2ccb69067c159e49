use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{error, warn};

use crate::domain::{
    common::entities::app_errors::CoreError,
    profile::{
        entities::{BabyProfile, PROFILE_KEY},
        ports::ProfileStore,
    },
};

/// Keeps the profile as `<dir>/baby_profile.json`.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", PROFILE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Result<Option<BabyProfile>, CoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                error!("Failed to read profile {}: {}", self.path.display(), e);
                return Err(CoreError::ProfileStoreError(e.to_string()));
            }
        };

        // A corrupt file reads as no profile.
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("Ignoring unreadable profile {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, profile: &BabyProfile) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::ProfileStoreError(e.to_string()))?;
        }

        let raw = serde_json::to_string_pretty(profile)
            .map_err(|e| CoreError::ProfileStoreError(e.to_string()))?;

        fs::write(&self.path, raw).map_err(|e| {
            error!("Failed to write profile {}: {}", self.path.display(), e);
            CoreError::ProfileStoreError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_is_no_profile() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::new(dir.path().join("never-created"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_overwrites_and_loads() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::new(dir.path().join("profile"));

        store.save(&BabyProfile::default()).unwrap();
        let profile = BabyProfile {
            age_months: 14,
            allergies: vec!["milk".to_string()],
        };
        store.save(&profile).unwrap();

        assert_eq!(store.load().unwrap(), Some(profile));
        assert!(store.path().ends_with("baby_profile.json"));
    }

    #[test]
    fn test_corrupt_file_is_no_profile() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load().unwrap(), None);
    }
}
