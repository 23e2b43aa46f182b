pub mod attachment;
pub mod error;
pub mod limits;
pub mod mime;
pub mod registry;
pub mod validate;

pub use attachment::{format_file_size, Attachment, Category};
pub use error::{IngestError, RejectReason, Rejection};
pub use limits::{MAX_FILES_PER_BATCH, MAX_FILE_SIZE_BYTES};
pub use validate::{validate, Verdict};
