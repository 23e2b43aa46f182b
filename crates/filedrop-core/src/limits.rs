//! Limits shared with the backend that receives attachments.
//!
//! Both sides must agree on these values; changing one is a protocol change.

/// Maximum size of a single file before encoding (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of attachments held for one message.
pub const MAX_FILES_PER_BATCH: usize = 20;

const MIB: f64 = 1024.0 * 1024.0;

/// A byte count expressed in whole mebibytes, rounded to nearest.
pub fn whole_megabytes(bytes: u64) -> u64 {
    (bytes as f64 / MIB).round() as u64
}
