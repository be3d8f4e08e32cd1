use log::debug;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, Slot, StorageError};

/// One `<slot>.json` file per slot under a data directory. The previous
/// content of a slot is kept as `<slot>.bak` on every write.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened file store at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path_for(&self, slot: Slot) -> PathBuf {
        self.dir.join(format!("{}.json", slot.key()))
    }

    fn write_with_backup(path: &Path, content: &str) -> Result<(), StorageError> {
        if path.exists() {
            fs::copy(path, path.with_extension("bak"))?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(slot)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        Self::write_with_backup(&self.path_for(slot), value)
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        match fs::remove_file(self.path_for(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
