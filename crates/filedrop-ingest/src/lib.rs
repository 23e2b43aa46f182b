//! Asynchronous side of filedrop: reading files, encoding them, and keeping
//! the per-session attachment collection.

pub mod config;
pub mod encoder;
pub mod notifier;
pub mod pipeline;
pub mod source;
pub mod store;

pub use config::IngestConfig;
pub use encoder::{encode, EncodeError, Encoded};
pub use notifier::{MemoryNotifier, NoopNotifier, Notice, NoticeLevel, Notifier, NotifyError, TracingNotifier};
pub use pipeline::{IngestOutcome, IngestionPipeline};
pub use source::{scan_folder, FileSource, LocalFile, MemoryFile};
pub use store::{AttachmentStore, Reservation};
