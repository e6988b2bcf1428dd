use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::PathBuf,
};

use super::{KeyValueStore, StoreError};

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store, creating the directory when needed.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            key: key.to_string(),
            source,
        };
        let path = self.slot_path(key);
        let temp_path = path.with_extension("json.tmp");

        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        // atomic replace, readers never observe a half-written slot
        fs::rename(&temp_path, &path).map_err(io_err)
    }
}
