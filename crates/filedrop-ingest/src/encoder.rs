use std::io;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use filedrop_core::{RejectReason, Rejection};
use thiserror::Error;
use tracing::debug;

use crate::source::FileSource;

/// File content materialized as base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub payload: String,
    /// Length of the bytes that were encoded, not of `payload`.
    pub size_bytes: u64,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name} exceeds {limit} bytes")]
    TooLarge { name: String, limit: u64 },
}

impl EncodeError {
    pub fn reason(&self) -> RejectReason {
        match self {
            EncodeError::Read { .. } => RejectReason::ReadFailure,
            EncodeError::TooLarge { .. } => RejectReason::FileTooLarge,
        }
    }

    pub fn to_rejection(&self) -> Rejection {
        match self {
            EncodeError::Read { name, .. } => Rejection::read_failure(name),
            EncodeError::TooLarge { name, limit } => Rejection::file_too_large(name, *limit),
        }
    }
}

/// Read `source` and encode it as standard base64.
///
/// At most `max_size + 1` bytes are read; a file that turns out larger than
/// `max_size` (it grew after its size was checked) fails with `TooLarge`.
pub async fn encode(source: &dyn FileSource, max_size: u64) -> Result<Encoded, EncodeError> {
    let data = source
        .read(max_size.saturating_add(1))
        .await
        .map_err(|e| EncodeError::Read {
            name: source.name().to_string(),
            source: e,
        })?;
    let size_bytes = data.len() as u64;
    if size_bytes > max_size {
        return Err(EncodeError::TooLarge {
            name: source.name().to_string(),
            limit: max_size,
        });
    }
    debug!(file = source.name(), size_bytes, "encoded");
    Ok(Encoded {
        payload: encode_bytes(&data),
        size_bytes,
    })
}

pub fn encode_bytes(data: &[u8]) -> String {
    B64.encode(data)
}
