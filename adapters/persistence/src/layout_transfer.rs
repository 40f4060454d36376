//! Single-line layout strings for sharing a plan through the clipboard.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use farm_planner_world::PlacementStore;
use thiserror::Error;

use crate::schema::{migrate, CurrentRecord, PersistedRecord};

const SNAPSHOT_DOMAIN: &str = "farm";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub const SNAPSHOT_HEADER: &str = "farm:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the placed instances together with the grid they were planned on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutSnapshot {
    /// Number of columns of the planning grid.
    pub columns: u32,
    /// Number of rows of the planning grid.
    pub rows: u32,
    /// Records composing the layout.
    pub records: Vec<PersistedRecord>,
}

impl LayoutSnapshot {
    /// Captures the instances of `store` planned on a `columns × rows` grid.
    #[must_use]
    pub fn capture(columns: u32, rows: u32, store: &PlacementStore) -> Self {
        Self {
            columns,
            rows,
            records: store
                .iter()
                .map(|instance| PersistedRecord::Current(CurrentRecord::from_instance(instance)))
                .collect(),
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(&self.records).map_err(LayoutTransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let records: Vec<PersistedRecord> =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            records,
        })
    }

    /// Migrates the records and rebuilds a store from them.
    #[must_use]
    pub fn into_store(self) -> PlacementStore {
        PlacementStore::from_instances(migrate(self.records))
    }
}

/// Errors that can occur while encoding or decoding layout strings.
#[derive(Debug, Error)]
pub enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded layout.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The records could not be serialised.
    #[error("could not serialise layout records: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}
