use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::warn;

/// A file offered for ingestion, as handed over by a picker or a drop.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Original file name, without any directory part.
    fn name(&self) -> &str;

    /// Size in bytes as reported by the source.
    fn size(&self) -> u64;

    /// Content type reported by the platform, if any.
    fn platform_type(&self) -> Option<&str> {
        None
    }

    /// Path within the selected folder, for folder selections.
    fn relative_path(&self) -> Option<&str> {
        None
    }

    /// Read the content, stopping after `limit` bytes.
    async fn read(&self, limit: u64) -> io::Result<Bytes>;
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size: u64,
    relative_path: Option<String>,
}

impl LocalFile {
    /// Stat `path` and capture its name and size. Fails if it is not a regular file.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            path,
            name,
            size: meta.len(),
            relative_path: None,
        })
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    async fn read(&self, limit: u64) -> io::Result<Bytes> {
        let file = tokio::fs::File::open(&self.path).await?;
        let mut buf = Vec::with_capacity(self.size.min(limit) as usize);
        file.take(limit).read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}

/// A file whose bytes are already in memory, e.g. from drag-and-drop or a paste.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    data: Bytes,
    platform_type: Option<String>,
    relative_path: Option<String>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            platform_type: None,
            relative_path: None,
        }
    }

    pub fn with_type(mut self, content_type: impl Into<String>) -> Self {
        self.platform_type = Some(content_type.into());
        self
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn platform_type(&self) -> Option<&str> {
        self.platform_type.as_deref()
    }

    fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    async fn read(&self, limit: u64) -> io::Result<Bytes> {
        let end = self.data.len().min(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(self.data.slice(..end))
    }
}

/// Collect every regular file under `root` as a folder selection.
///
/// Relative paths start with the name of `root` itself (`src/a.ts` for a
/// selected `src` folder) and always use `/`. Hidden entries (leading `.`)
/// are skipped, as are files that vanish or stop being regular files
/// between listing and stat. The result is sorted by relative path.
pub async fn scan_folder(root: impl AsRef<Path>) -> io::Result<Vec<LocalFile>> {
    let root = root.as_ref();
    let root_name = folder_name(root).await?;

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let ft = entry.file_type().await?;
            if ft.is_dir() {
                stack.push(path);
            } else if ft.is_file() {
                let Ok(rel) = path.strip_prefix(root) else {
                    continue;
                };
                let rel = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let relative_path = if root_name.is_empty() {
                    rel
                } else {
                    format!("{root_name}/{rel}")
                };
                if let Some(file) = open_entry(&path, relative_path).await {
                    files.push(file);
                }
            }
        }
    }
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// Name of the selected folder. Paths such as `.` or `src/..` have no final
/// component, so those are resolved first.
async fn folder_name(root: &Path) -> io::Result<String> {
    if let Some(name) = root.file_name() {
        return Ok(name.to_string_lossy().to_string());
    }
    let resolved = tokio::fs::canonicalize(root).await?;
    Ok(resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default())
}

async fn open_entry(path: &Path, relative_path: String) -> Option<LocalFile> {
    match LocalFile::open(path).await {
        Ok(file) => Some(file.with_relative_path(relative_path)),
        Err(e) => {
            warn!("skipping {relative_path}: {e}");
            None
        }
    }
}
