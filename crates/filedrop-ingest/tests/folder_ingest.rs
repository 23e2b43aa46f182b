//! End-to-end ingestion from the local filesystem.

use std::sync::Arc;

use filedrop_core::{Category, RejectReason};
use filedrop_ingest::{
    scan_folder, FileSource, IngestConfig, IngestionPipeline, LocalFile, MemoryNotifier,
    NoticeLevel,
};
use tempfile::TempDir;

fn pipeline_with(config: IngestConfig) -> (IngestionPipeline, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    (IngestionPipeline::new(config, notifier.clone()), notifier)
}

fn boxed(files: Vec<LocalFile>) -> Vec<Box<dyn FileSource>> {
    files
        .into_iter()
        .map(|f| Box::new(f) as Box<dyn FileSource>)
        .collect()
}

/// Create `<tmp>/src/a.ts` and `<tmp>/src/b.py`.
fn source_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("a.ts"), "export const a = 1;\n").unwrap();
    std::fs::write(src.join("b.py"), "b = 2\n").unwrap();
    dir
}

#[tokio::test]
async fn folder_selection_keeps_relative_paths() {
    let dir = source_folder();
    let (pipeline, notifier) = pipeline_with(IngestConfig::default());

    let files = scan_folder(dir.path().join("src")).await.unwrap();
    let outcome = pipeline.ingest(boxed(files)).await;

    assert_eq!(outcome.accepted_count(), 2);
    let stored = pipeline.store().list();
    assert_eq!(stored[0].relative_path(), Some("src/a.ts"));
    assert_eq!(stored[0].content_type(), "text/typescript");
    assert_eq!(stored[1].relative_path(), Some("src/b.py"));
    assert_eq!(stored[1].content_type(), "text/x-python");
    assert!(stored.iter().all(|a| a.category() == Category::Code));
    assert_eq!(stored[1].display_label(), "src/b.py");

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn mixed_folder_drops_only_bad_files() {
    let dir = source_folder();
    let src = dir.path().join("src");
    std::fs::write(src.join("c.bin"), [0u8, 1, 2]).unwrap();
    std::fs::write(src.join("d.md"), vec![b'#'; 64]).unwrap();

    let config = IngestConfig {
        max_file_size: 32,
        ..Default::default()
    };
    let (pipeline, notifier) = pipeline_with(config);

    let files = scan_folder(&src).await.unwrap();
    let outcome = pipeline.ingest(boxed(files)).await;

    let names: Vec<_> = outcome.accepted.iter().map(|a| a.filename()).collect();
    assert_eq!(names, vec!["a.ts", "b.py"]);
    let reasons: Vec<_> = outcome.rejected.iter().map(|r| r.reason).collect();
    assert_eq!(
        reasons,
        vec![RejectReason::UnsupportedType, RejectReason::FileTooLarge]
    );
    assert_eq!(notifier.count_of(RejectReason::UnsupportedType), 1);
    assert_eq!(notifier.count_of(RejectReason::FileTooLarge), 1);
}

#[tokio::test]
async fn file_removed_before_encode_is_read_failure() {
    let dir = source_folder();
    let src = dir.path().join("src");
    let a = LocalFile::open(src.join("a.ts")).await.unwrap();
    let b = LocalFile::open(src.join("b.py")).await.unwrap();
    std::fs::remove_file(src.join("a.ts")).unwrap();

    let (pipeline, notifier) = pipeline_with(IngestConfig::default());
    let outcome = pipeline.ingest(boxed(vec![a, b])).await;

    assert_eq!(outcome.accepted_count(), 1);
    assert_eq!(outcome.accepted[0].filename(), "b.py");
    assert_eq!(outcome.rejected[0].reason, RejectReason::ReadFailure);
    assert_eq!(notifier.count_of(RejectReason::ReadFailure), 1);
}

#[tokio::test]
async fn file_grown_after_stat_is_too_large() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.txt");
    std::fs::write(&path, "short").unwrap();
    let file = LocalFile::open(&path).await.unwrap();
    std::fs::write(&path, vec![b'x'; 100]).unwrap();

    let config = IngestConfig {
        max_file_size: 50,
        ..Default::default()
    };
    let (pipeline, _) = pipeline_with(config);
    let outcome = pipeline.ingest(boxed(vec![file])).await;

    assert!(pipeline.store().is_empty());
    assert_eq!(outcome.rejected[0].reason, RejectReason::FileTooLarge);
}

#[tokio::test]
async fn remove_and_clear_after_ingest() {
    let dir = source_folder();
    let (pipeline, _) = pipeline_with(IngestConfig::default());
    let files = scan_folder(dir.path().join("src")).await.unwrap();
    pipeline.ingest(boxed(files)).await;

    let store = pipeline.store();
    let first = store.list()[0].id().to_string();
    store.remove(&first);
    store.remove(&first);
    assert_eq!(store.len(), 1);

    store.clear();
    assert!(store.list().is_empty());
    assert_eq!(store.remaining(), store.capacity());
}

#[tokio::test]
async fn stored_attachments_serialize_to_wire_shape() {
    let dir = source_folder();
    let (pipeline, _) = pipeline_with(IngestConfig::default());
    let files = scan_folder(dir.path().join("src")).await.unwrap();
    pipeline.ingest(boxed(files)).await;

    let json = serde_json::to_value(pipeline.store().list()).unwrap();
    let first = &json[0];
    assert_eq!(first["filename"], "a.ts");
    assert_eq!(first["contentType"], "text/typescript");
    assert_eq!(first["category"], "code");
    assert_eq!(first["relativePath"], "src/a.ts");
    assert_eq!(first["sizeBytes"], 20);
    assert_eq!(first["payload"], "ZXhwb3J0IGNvbnN0IGEgPSAxOwo=");
    assert!(first["id"].as_str().unwrap().starts_with("file-"));
}
