use std::future::Future;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use url::Url;

use crate::errors::{Result, TesseraError};

/// Asynchronous source of asset bytes, addressed by uri.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Reads a UTF-8 text asset.
    fn read_string(&self, uri: &str) -> impl Future<Output = Result<String>> + Send {
        async move {
            let bytes = self.read_bytes(uri).await?;
            String::from_utf8(bytes).map_err(|e| TesseraError::Parse {
                line: 0,
                message: format!("`{uri}` is not valid UTF-8: {e}"),
            })
        }
    }
}

/// Reads files below a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// A path to a file roots the reader at the file's directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TesseraError::AssetNotFound(uri.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory assets, keyed by uri.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(uri.into(), bytes.into());
    }

    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, bytes);
        self
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| TesseraError::AssetNotFound(uri.to_string()))
    }
}

/// Resolves `relative` against the document at `base`.
///
/// Absolute urls (`https://...`, `file://...`) are joined with [`Url::join`];
/// plain paths are resolved against the directory part of `base`.
pub fn resolve_relative(base: &str, relative: &str) -> Result<String> {
    if let Ok(url) = Url::parse(base) {
        return Ok(url.join(relative)?.to_string());
    }
    if Url::parse(relative).is_ok() || relative.starts_with('/') {
        return Ok(relative.to_string());
    }
    Ok(match base.rfind('/') {
        Some(slash) => format!("{}{relative}", &base[..=slash]),
        None => relative.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_use_the_base_directory() {
        assert_eq!(resolve_relative("models/cube.obj", "cube.mtl").unwrap(), "models/cube.mtl");
        assert_eq!(resolve_relative("cube.obj", "cube.mtl").unwrap(), "cube.mtl");
        assert_eq!(resolve_relative("models/cube.obj", "/abs/tex.png").unwrap(), "/abs/tex.png");
    }

    #[test]
    fn urls_are_joined() {
        assert_eq!(
            resolve_relative("https://example.com/a/b.obj", "c.mtl").unwrap(),
            "https://example.com/a/c.mtl"
        );
    }

    #[test]
    fn memory_reader_reports_missing_assets() {
        let reader = MemoryAssetReader::new().with("a.txt", b"hello".to_vec());
        assert_eq!(pollster::block_on(reader.read_string("a.txt")).unwrap(), "hello");
        assert!(matches!(
            pollster::block_on(reader.read_bytes("b.txt")),
            Err(TesseraError::AssetNotFound(_))
        ));
    }
}
