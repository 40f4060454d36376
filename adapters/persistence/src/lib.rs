#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persisted placement state for the farm planner.
//!
//! State is a JSON array of placement records. Every record read back is run
//! through [`migrate`] before it reaches the placement store, so stores only
//! ever hold current-schema instances.

mod layout_transfer;
mod schema;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use farm_planner_world::PlacementStore;
use thiserror::Error;

pub use layout_transfer::{LayoutSnapshot, LayoutTransferError, SNAPSHOT_HEADER};
pub use schema::{
    migrate, migrate_record, migrate_records, CurrentRecord, LegacyRecord, PersistedRecord,
};

/// Errors raised while reading or writing placement state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The state file could not be read or written.
    #[error("could not access placement state at {path}: {source}")]
    Io {
        /// Location of the state file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The state text is not a valid record list.
    #[error("could not parse placement state: {0}")]
    Parse(#[source] serde_json::Error),
    /// The records could not be serialised.
    #[error("could not serialise placement state: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Parses persisted state text into raw records.
pub fn parse_records(text: &str) -> Result<Vec<PersistedRecord>, PersistenceError> {
    serde_json::from_str(text).map_err(PersistenceError::Parse)
}

/// Captures every instance of the store as a current-schema record.
#[must_use]
pub fn records_from_store(store: &PlacementStore) -> Vec<CurrentRecord> {
    store.iter().map(CurrentRecord::from_instance).collect()
}

/// Rebuilds a store from state text, falling back to an empty store when the
/// text cannot be parsed.
#[must_use]
pub fn store_from_str(text: &str) -> PlacementStore {
    match parse_records(text) {
        Ok(records) => PlacementStore::from_instances(migrate(records)),
        Err(error) => {
            tracing::warn!(%error, "discarding unreadable placement state");
            PlacementStore::new()
        }
    }
}

/// Loads the store persisted at `path`.
///
/// A missing, unreadable or unparsable file yields an empty store.
#[must_use]
pub fn load_store(path: &Path) -> PlacementStore {
    match fs::read_to_string(path) {
        Ok(text) => {
            let store = store_from_str(&text);
            tracing::debug!(path = %path.display(), instances = store.len(), "placement state loaded");
            store
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no placement state found, starting empty");
            PlacementStore::new()
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not read placement state");
            PlacementStore::new()
        }
    }
}

/// Writes the store to `path` as a pretty-printed JSON record list.
pub fn save_store(path: &Path, store: &PlacementStore) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(&records_from_store(store))
        .map_err(PersistenceError::Serialize)?;
    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), instances = store.len(), "placement state saved");
    Ok(())
}
