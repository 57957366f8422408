use std::{
    fs::{self, File, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SinkError;

/// Append-only csv files under one output directory. A destination is a file
/// name relative to that directory.
pub struct CsvStore {
    directory: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        CsvStore {
            directory: directory.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self, destination: &str) -> PathBuf {
        self.directory.join(destination)
    }

    pub fn exists(&self, destination: &str) -> bool {
        self.path(destination).is_file()
    }

    /// Appends `records` to `destination`. Column headers are taken from the
    /// record's field names and only written when the file is new or empty.
    pub fn append<R: Serialize>(&self, records: &[R], destination: &str) -> Result<(), SinkError> {
        if records.is_empty() {
            return Err(SinkError::Empty {
                destination: destination.to_string(),
            });
        }

        let io_error = |source| SinkError::Io {
            destination: destination.to_string(),
            source,
        };

        // Blocking on purpose: callers append one record at a time from the
        // synchronous card callback, so the lock is held for a single short
        // write and never across an await.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        fs::create_dir_all(&self.directory).map_err(io_error)?;
        let path = self.path(destination);
        let write_headers = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(io_error)?;

        Ok(())
    }

    /// Reads every row of `destination` in file order.
    pub fn read_all<R: DeserializeOwned>(&self, destination: &str) -> Result<Vec<R>, SinkError> {
        let file = File::open(self.path(destination)).map_err(|source| SinkError::Io {
            destination: destination.to_string(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        reader
            .deserialize()
            .collect::<Result<Vec<R>, csv::Error>>()
            .map_err(SinkError::from)
    }
}
