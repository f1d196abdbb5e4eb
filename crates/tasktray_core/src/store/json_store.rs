//! Flat JSON file store.
//!
//! # Invariants
//! - A missing or zero-length file loads as an empty list.
//! - Records without an `id` get one on load, written back once so every
//!   later load returns the same ids.
//! - Saves go to a sibling temp file first and are renamed into place, so
//!   readers see either the previous or the next complete list.

use super::{StoreError, StoreResult, TaskStore};
use crate::model::task::{Task, TaskRecord};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const JSON_INDENT: &[u8] = b"    ";
const TEMP_SUFFIX: &str = "tmp";

/// Task store backed by one JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
            }
        }

        let temp_path = self.temp_path();
        let write_result = fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(err) = write_result {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(err));
        }

        fs::rename(&temp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&temp_path);
            self.io_error(err)
        })
    }
}

impl TaskStore for JsonTaskStore {
    fn load(&self) -> StoreResult<Vec<Task>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("event=store_load module=store status=empty reason=missing_file");
                return Ok(Vec::new());
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=read_failed error={}",
                    err
                );
                return Err(self.io_error(err));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("event=store_load module=store status=empty reason=blank_file");
            return Ok(Vec::new());
        }

        let (tasks, minted_ids) = match decode_tasks(&bytes) {
            Ok(decoded) => decoded,
            Err(source) => {
                error!(
                    "event=store_load module=store status=error error_code=corrupt_state line={} column={}",
                    source.line(),
                    source.column()
                );
                return Err(StoreError::Corrupt {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        debug!(
            "event=store_load module=store status=ok count={}",
            tasks.len()
        );

        if minted_ids > 0 {
            // Minted ids must survive to the next load.
            match self.save(&tasks) {
                Ok(()) => info!(
                    "event=store_migrate module=store status=ok assigned_ids={}",
                    minted_ids
                ),
                Err(err) => warn!(
                    "event=store_migrate module=store status=error assigned_ids={} error={}",
                    minted_ids, err
                ),
            }
        }
        Ok(tasks)
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let started_at = Instant::now();

        let mut bytes = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(JSON_INDENT));
        tasks.serialize(&mut serializer).map_err(StoreError::Encode)?;

        match self.write_atomically(&bytes) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error error_code=write_failed duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Decodes the store file, returning the tasks and how many of them were
/// given a fresh id because their record had none.
fn decode_tasks(bytes: &[u8]) -> Result<(Vec<Task>, usize), serde_json::Error> {
    let records: Vec<TaskRecord> = serde_json::from_slice(bytes)?;
    let minted_ids = records.iter().filter(|record| record.needs_id()).count();
    let tasks = records
        .into_iter()
        .map(|record| Task::try_from(record).map_err(serde::de::Error::custom))
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    Ok((tasks, minted_ids))
}
