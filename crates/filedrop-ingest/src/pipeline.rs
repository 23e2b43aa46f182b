use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use filedrop_core::{
    mime, validate, Attachment, IngestError, Rejection, Verdict, MAX_FILE_SIZE_BYTES,
};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::encoder;
use crate::notifier::{Notice, Notifier};
use crate::source::FileSource;
use crate::store::AttachmentStore;

/// What happened to one file of a batch.
enum FileOutcome {
    Accepted(Attachment),
    /// Failed validation; the notice has already gone out.
    Invalid(Rejection),
    /// Failed while reading or encoding.
    Rejected(Rejection),
    Cancelled,
}

/// Structured result of one [`IngestionPipeline::ingest`] call.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Attachments committed to the store, in selection order.
    pub accepted: Vec<Attachment>,
    /// Per-file rejections, in selection order.
    pub rejected: Vec<Rejection>,
    /// Set when the whole batch was refused before any file was looked at.
    pub batch_error: Option<Rejection>,
    /// The batch was cancelled; nothing was committed.
    pub cancelled: bool,
    /// Internal failure while committing; the store was left unchanged.
    pub fault: Option<IngestError>,
}

impl IngestOutcome {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_batch_rejected(&self) -> bool {
        self.batch_error.is_some()
    }
}

/// Turns batches of raw files into attachments in an [`AttachmentStore`].
///
/// A batch whose size does not fit the store's free capacity is refused as a
/// whole. Otherwise each file is resolved and validated on its own, the valid
/// ones are encoded concurrently, and the survivors are appended in selection
/// order as one commit. Messages for the user go to the [`Notifier`]; the
/// returned [`IngestOutcome`] carries the same information for the caller.
///
/// Clones share the store, the notifier and the processing flag.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: AttachmentStore,
    notifier: Arc<dyn Notifier>,
    config: IngestConfig,
    in_flight: Arc<AtomicUsize>,
}

impl IngestionPipeline {
    /// Create a pipeline with a fresh store sized by `config.max_files`.
    pub fn new(config: IngestConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_store(AttachmentStore::new(config.max_files), config, notifier)
    }

    /// Create a pipeline that ingests into an existing store, e.g. one the
    /// caller also renders or edits. The store's own capacity bounds batches;
    /// `config.max_files` is not consulted.
    pub fn with_store(
        store: AttachmentStore,
        config: IngestConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn store(&self) -> &AttachmentStore {
        &self.store
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Whether any ingestion on this pipeline is still running.
    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn ingest(&self, files: Vec<Box<dyn FileSource>>) -> IngestOutcome {
        self.ingest_until(files, &CancellationToken::new()).await
    }

    /// Like [`ingest`](Self::ingest), but abandons the batch once `cancel`
    /// fires. Encodes still in flight are dropped and nothing from the batch is
    /// committed. Validation notices go out before encoding starts, so those
    /// are sent even for a batch that is later cancelled.
    pub async fn ingest_until(
        &self,
        files: Vec<Box<dyn FileSource>>,
        cancel: &CancellationToken,
    ) -> IngestOutcome {
        let _busy = Busy::enter(&self.in_flight);

        let reservation = match self.store.reserve(files.len()) {
            Ok(r) => r,
            Err(e) => {
                warn!("refusing batch of {} files: {e}", files.len());
                let rejection = Rejection::batch_limit(self.store.capacity());
                self.emit(&Notice::rejected(&rejection));
                return IngestOutcome {
                    batch_error: Some(rejection),
                    ..Default::default()
                };
            }
        };

        let max_size = self.config.max_file_size;
        let checked: Vec<Result<String, Rejection>> =
            files.iter().map(|f| check(f.as_ref(), max_size)).collect();
        for rejection in checked.iter().filter_map(|c| c.as_ref().err()) {
            self.emit(&Notice::rejected(rejection));
        }

        let results = join_all(files.iter().zip(checked).map(|(file, checked)| async move {
            match checked {
                Ok(content_type) => encode_one(file.as_ref(), content_type, max_size, cancel).await,
                Err(rejection) => FileOutcome::Invalid(rejection),
            }
        }))
        .await;

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut failed = Vec::new();
        let mut cancelled = cancel.is_cancelled();
        for result in results {
            match result {
                FileOutcome::Accepted(a) => accepted.push(a),
                FileOutcome::Invalid(r) => rejected.push(r),
                FileOutcome::Rejected(r) => {
                    failed.push(rejected.len());
                    rejected.push(r);
                }
                FileOutcome::Cancelled => cancelled = true,
            }
        }

        if cancelled {
            info!("batch of {} files cancelled", files.len());
            return IngestOutcome {
                rejected,
                cancelled: true,
                ..Default::default()
            };
        }

        for i in failed {
            self.emit(&Notice::rejected(&rejected[i]));
        }

        if let Err(e) = reservation.commit(accepted.clone()) {
            error!("commit failed, store left unchanged: {e}");
            return IngestOutcome {
                rejected,
                fault: Some(e),
                ..Default::default()
            };
        }

        info!(
            accepted = accepted.len(),
            rejected = rejected.len(),
            "batch committed"
        );
        if !accepted.is_empty() {
            self.emit(&Notice::added(accepted.len()));
        }

        IngestOutcome {
            accepted,
            rejected,
            ..Default::default()
        }
    }

    fn emit(&self, notice: &Notice) {
        if let Err(e) = self.notifier.notify(notice) {
            warn!("dropping notice {:?}: {e}", notice.message);
        }
    }
}

/// Resolve the content type of `file` and validate it.
fn check(file: &dyn FileSource, max_size: u64) -> Result<String, Rejection> {
    let content_type = mime::resolve(file.name(), file.platform_type());
    match validate(file.name(), file.size(), &content_type, max_size) {
        Verdict::Accepted => {
            debug!(file = file.name(), content_type = %content_type, "accepted");
            Ok(content_type)
        }
        Verdict::Rejected(r) => {
            debug!(file = file.name(), reason = %r.reason, "rejected");
            Err(r)
        }
    }
}

async fn encode_one(
    file: &dyn FileSource,
    content_type: String,
    max_size: u64,
    cancel: &CancellationToken,
) -> FileOutcome {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => FileOutcome::Cancelled,
        res = encoder::encode(file, max_size) => match res {
            Ok(encoded) => {
                let size_bytes = encoded.size_bytes;
                match Attachment::new(
                    file.name(),
                    content_type,
                    encoded.payload,
                    size_bytes,
                    file.relative_path().map(str::to_string),
                ) {
                    Ok(a) => FileOutcome::Accepted(a),
                    Err(e) => {
                        error!(file = file.name(), "{e}");
                        FileOutcome::Rejected(record_rejection(file.name(), size_bytes))
                    }
                }
            }
            Err(e) => {
                warn!("{e}");
                FileOutcome::Rejected(e.to_rejection())
            }
        },
    }
}

/// Rejection for an encoded file that still fails the attachment invariants,
/// which only happens with a limit above [`MAX_FILE_SIZE_BYTES`].
fn record_rejection(name: &str, size_bytes: u64) -> Rejection {
    if size_bytes > MAX_FILE_SIZE_BYTES {
        Rejection::file_too_large(name, MAX_FILE_SIZE_BYTES)
    } else {
        Rejection::unsupported_type(name)
    }
}

struct Busy(Arc<AtomicUsize>);

impl Busy {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for Busy {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
