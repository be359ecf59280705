// (C) Copyright IBM Corp. 2025.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, warn};

use super::{Storage, StorageError, StorageResult};
use crate::models::ToggleDefinition;
use crate::utils::Waitable;

#[derive(Debug, Default)]
struct Content {
    toggles: HashMap<String, ToggleDefinition>,
    // Set once `reset` ran, so a late backup load does not overwrite fresher data.
    replaced: bool,
}

/// In-memory storage mirrored to a JSON file.
///
/// On creation the previous backup (if any) is loaded in a background thread and the
/// storage becomes ready once that finished. A missing or unreadable backup just
/// means starting empty. Every [`Storage::reset`] writes the file before the new
/// toggles become visible, so a failed write leaves the storage untouched.
#[derive(Debug)]
pub struct FileBackupStorage {
    path: PathBuf,
    content: Arc<RwLock<Content>>,
    ready: Waitable<bool>,
}

impl FileBackupStorage {
    /// # Arguments
    ///
    /// * `backup_dir` - Directory holding the backup file. It must exist.
    /// * `app_name` - Used to name the backup file, so several applications can share the directory.
    pub fn new(backup_dir: &Path, app_name: &str) -> StorageResult<Self> {
        let path = backup_dir.join(Self::file_name(app_name));
        let content = Arc::new(RwLock::new(Content::default()));
        let ready = Waitable::new(false);

        let loader_path = path.clone();
        let loader_content = content.clone();
        let loader_ready = ready.clone();
        std::thread::Builder::new()
            .name("toggle-backup-loader".to_string())
            .spawn(move || {
                let toggles = Self::load(&loader_path);
                match loader_content.write() {
                    Ok(mut content) if !content.replaced => content.toggles = toggles,
                    Ok(_) => debug!("Toggles were replaced before the backup finished loading"),
                    Err(_) => warn!("Cannot acquire storage lock to apply backup"),
                }
                if loader_ready.set(true).is_err() {
                    warn!("Cannot signal readiness of backup storage");
                }
            })
            .map_err(StorageError::LoaderStart)?;

        Ok(Self {
            path,
            content,
            ready,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_name(app_name: &str) -> String {
        let sanitized: String = app_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("toggles-{sanitized}.json")
    }

    fn load(path: &Path) -> HashMap<String, ToggleDefinition> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No toggle backup at '{}'", path.display());
                return HashMap::new();
            }
            Err(e) => {
                warn!("Cannot read toggle backup '{}': {e}", path.display());
                return HashMap::new();
            }
        };
        match serde_json::from_reader(std::io::BufReader::new(file)) {
            Ok(toggles) => toggles,
            Err(e) => {
                warn!("Ignoring corrupted toggle backup '{}': {e}", path.display());
                HashMap::new()
            }
        }
    }

    fn write(&self, toggles: &HashMap<String, ToggleDefinition>) -> StorageResult<()> {
        let data = serde_json::to_vec(toggles)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let map_err = |source| StorageError::BackupWrite {
            path: self.path.display().to_string(),
            source,
        };
        std::fs::write(&tmp_path, data).map_err(map_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(map_err)?;
        Ok(())
    }
}

impl Storage for FileBackupStorage {
    fn wait_until_ready(&self, timeout: Duration) -> StorageResult<bool> {
        let (_, ready) = self.ready.wait_until(timeout, |ready| *ready)?;
        Ok(ready)
    }

    fn reset(&self, toggles: HashMap<String, ToggleDefinition>) -> StorageResult<()> {
        let mut content = self.content.write()?;
        self.write(&toggles)?;
        content.toggles = toggles;
        content.replaced = true;
        Ok(())
    }

    fn get(&self, name: &str) -> StorageResult<Option<ToggleDefinition>> {
        Ok(self.content.read()?.toggles.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{feature_default_strategy, feature_disabled};

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_starts_empty_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileBackupStorage::new(dir.path(), "app").unwrap();

        assert!(storage.wait_until_ready(WAIT).unwrap());
        assert!(storage.get("feature").unwrap().is_none());
        assert_eq!(storage.path(), dir.path().join("toggles-app.json"));
    }

    #[test]
    fn test_backup_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileBackupStorage::new(dir.path(), "app").unwrap();
            assert!(storage.wait_until_ready(WAIT).unwrap());
            storage
                .reset(HashMap::from([(
                    "feature".to_string(),
                    feature_default_strategy(),
                )]))
                .unwrap();
        }

        let storage = FileBackupStorage::new(dir.path(), "app").unwrap();
        assert!(storage.wait_until_ready(WAIT).unwrap());
        assert_eq!(
            storage.get("feature").unwrap(),
            Some(feature_default_strategy())
        );

        // Other applications do not see it
        let other = FileBackupStorage::new(dir.path(), "other app").unwrap();
        assert!(other.wait_until_ready(WAIT).unwrap());
        assert!(other.get("feature").unwrap().is_none());
    }

    #[test]
    fn test_corrupted_backup_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("toggles-app.json"), "{\"feature\": tru").unwrap();

        let storage = FileBackupStorage::new(dir.path(), "app").unwrap();
        assert!(storage.wait_until_ready(WAIT).unwrap());
        assert!(storage.get("feature").unwrap().is_none());
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let backup_dir = dir.path().join("backup");
        std::fs::create_dir(&backup_dir).unwrap();

        let storage = FileBackupStorage::new(&backup_dir, "app").unwrap();
        assert!(storage.wait_until_ready(WAIT).unwrap());
        storage
            .reset(HashMap::from([("a".to_string(), feature_disabled("a"))]))
            .unwrap();

        std::fs::remove_dir_all(&backup_dir).unwrap();
        let r = storage.reset(HashMap::from([(
            "feature".to_string(),
            feature_default_strategy(),
        )]));

        assert!(matches!(r, Err(StorageError::BackupWrite { .. })), "{:?}", r);
        assert!(storage.get("a").unwrap().is_some());
        assert!(storage.get("feature").unwrap().is_none());
    }
}
