//! Where definition documents come from: the WoWDBDefs repository over HTTP,
//! a local checkout, or an on-disk cache in front of either.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_DEFS_URL: &str =
    "https://raw.githubusercontent.com/wowdev/WoWDBDefs/master/definitions/";

const DBD_EXTENSION: &str = "dbd";

/// Fetches the raw `.dbd` document for a table.
pub trait DocumentSource {
    fn fetch(&self, table_name: &str) -> Result<Vec<u8>>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn fetch(&self, table_name: &str) -> Result<Vec<u8>> {
        (**self).fetch(table_name)
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn fetch(&self, table_name: &str) -> Result<Vec<u8>> {
        (**self).fetch(table_name)
    }
}

fn document_file_name(table_name: &str) -> Result<String> {
    let name = table_name.trim();
    if name.is_empty() {
        anyhow::bail!("table name must be non-empty");
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        anyhow::bail!("table name contains invalid characters: {:?}", name);
    }
    Ok(format!("{name}.{DBD_EXTENSION}"))
}

/// `<base>/<Table>.dbd` over `http(s)://` or `file://`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: Url,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid definitions url: {base_url:?} (expected URL)"))?;
        if !base.as_str().ends_with('/') {
            anyhow::bail!(
                "definitions url must end with '/': got {:?} (example: {DEFAULT_DEFS_URL})",
                base.as_str()
            );
        }
        Ok(Self { base })
    }

    /// Uses `DBD2CPP_DEFS_URL` when set, the WoWDBDefs master branch otherwise.
    pub fn from_env() -> Result<Self> {
        match std::env::var("DBD2CPP_DEFS_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::new(DEFAULT_DEFS_URL),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn document_url(&self, table_name: &str) -> Result<Url> {
        let file = document_file_name(table_name)?;
        self.base
            .join(&file)
            .with_context(|| format!("definitions url join: {file:?}"))
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self, table_name: &str) -> Result<Vec<u8>> {
        let url = self.document_url(table_name)?;
        log::debug!("fetching {}", url.as_str());
        fetch_bytes(&url)
    }
}

fn fetch_bytes(url: &Url) -> Result<Vec<u8>> {
    match url.scheme() {
        "file" => {
            let path = url.to_file_path().map_err(|_| {
                anyhow::anyhow!("file url could not be converted to a path: {:?}", url)
            })?;
            std::fs::read(&path).with_context(|| format!("read {}", path.display()))
        }
        "http" | "https" => {
            let resp = ureq::get(url.as_str())
                .call()
                .map_err(|e| anyhow::anyhow!("http GET {}: {e}", url))?;
            let mut reader = resp.into_body().into_reader();
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).context("read http response")?;
            Ok(buf)
        }
        other => anyhow::bail!("unsupported url scheme {other:?} for {}", url.as_str()),
    }
}

/// A local checkout of the `definitions/` directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stems of every `.dbd` file in the directory, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("read dir {}", self.dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("read dir {}", self.dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(DBD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                out.push(stem.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}

impl DocumentSource for DirectorySource {
    fn fetch(&self, table_name: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(document_file_name(table_name)?);
        std::fs::read(&path).with_context(|| format!("read {}", path.display()))
    }
}

/// Serves documents from `cache_dir` and fills it from `inner` on a miss.
#[derive(Debug, Clone)]
pub struct CachedSource<S> {
    inner: S,
    cache_dir: PathBuf,
    refresh: bool,
}

impl<S: DocumentSource> CachedSource<S> {
    pub fn new(inner: S, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.into(),
            refresh: false,
        }
    }

    /// Always refetch, overwriting cached copies.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn cache_path(&self, table_name: &str) -> Result<PathBuf> {
        Ok(self.cache_dir.join(document_file_name(table_name)?))
    }
}

impl<S: DocumentSource> DocumentSource for CachedSource<S> {
    fn fetch(&self, table_name: &str) -> Result<Vec<u8>> {
        let path = self.cache_path(table_name)?;
        if !self.refresh {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    log::debug!("cache hit: {}", path.display());
                    return Ok(bytes);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
            }
        }

        log::debug!("cache miss: {}", path.display());
        let bytes = self.inner.fetch(table_name)?;
        std::fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("create dir: {}", self.cache_dir.display()))?;
        std::fs::write(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
        Ok(bytes)
    }
}

/// `DBD2CPP_HOME/cache`, else `~/.dbd2cpp/cache`.
pub fn default_cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("DBD2CPP_HOME") {
        return Ok(PathBuf::from(dir).join("cache"));
    }

    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home).join(".dbd2cpp").join("cache"));
    }
    if let Ok(home) = std::env::var("USERPROFILE") {
        return Ok(PathBuf::from(home).join(".dbd2cpp").join("cache"));
    }

    anyhow::bail!("missing HOME/USERPROFILE; set DBD2CPP_HOME to choose a cache location")
}
