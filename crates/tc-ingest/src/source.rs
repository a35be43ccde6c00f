//! File access for schema documents and CSV tables.
//!
//! Readers are lent to a callback rather than returned so archive entries
//! can be streamed without buffering them.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{IngestError, Result};

/// Callback receiving an open reader.
pub type ReadFn<'a> = dyn FnMut(&mut dyn Read) -> Result<()> + 'a;

/// Where schema documents and tables are read from.
pub trait FileSource {
    /// True when `path` can be opened.
    fn exists(&self, path: &Path) -> bool;

    /// Open `path` and hand the reader to `read`.
    fn read_with(&self, path: &Path, read: &mut ReadFn<'_>) -> Result<()>;

    /// Human-readable location of `path`, for messages.
    fn describe(&self, path: &Path) -> String {
        path.display().to_string()
    }
}

/// Read a whole file into a string.
pub fn read_to_string(source: &dyn FileSource, path: &Path) -> Result<String> {
    let mut text = String::new();
    source.read_with(path, &mut |reader| {
        reader
            .read_to_string(&mut text)
            .map(|_| ())
            .map_err(|error| IngestError::io(path, error))
    })?;
    Ok(text)
}

/// Plain filesystem access.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_with(&self, path: &Path, read: &mut ReadFn<'_>) -> Result<()> {
        let file = File::open(path).map_err(|error| IngestError::io(path, error))?;
        let mut reader = BufReader::new(file);
        read(&mut reader)
    }
}

/// Entries of a zip archive, addressed by their path inside the archive.
pub struct ZipSource {
    path: PathBuf,
    archive: RefCell<ZipArchive<BufReader<File>>>,
}

impl std::fmt::Debug for ZipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipSource").field("path", &self.path).finish()
    }
}

impl ZipSource {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|error| IngestError::io(&path, error))?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|source| IngestError::Archive {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            archive: RefCell::new(archive),
        })
    }

    pub fn archive_path(&self) -> &Path {
        &self.path
    }

    /// JSON entries outside `META-INF/`, sorted.
    pub fn schema_candidates(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| name.ends_with(".json") && !name.starts_with("META-INF/"))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// The schema document to validate when none was named explicitly.
    pub fn find_schema(&self) -> Result<PathBuf> {
        self.schema_candidates()
            .into_iter()
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| IngestError::NoSchemaInArchive {
                path: self.path.clone(),
            })
    }
}

impl FileSource for ZipSource {
    fn exists(&self, path: &Path) -> bool {
        let entry = entry_name(path);
        self.archive
            .borrow()
            .file_names()
            .any(|name| name == entry)
    }

    fn read_with(&self, path: &Path, read: &mut ReadFn<'_>) -> Result<()> {
        let entry = entry_name(path);
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(&entry).map_err(|error| match error {
            ZipError::FileNotFound => IngestError::NotFound {
                path: path.to_path_buf(),
            },
            source => IngestError::Archive {
                path: self.path.clone(),
                source,
            },
        })?;
        read(&mut file)
    }

    fn describe(&self, path: &Path) -> String {
        format!("{}!/{}", self.path.display(), entry_name(path))
    }
}

/// Lexically normalise a path: drop `.` and fold `..` into its parent.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Archive entry name for a path: normalised, `/`-separated, no leading `/`.
fn entry_name(path: &Path) -> String {
    normalize(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `http://` or `https://` URL.
pub fn is_http_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve a table URL against the schema's directory. HTTP(S) URLs are
/// returned unchanged.
pub fn resolve_table_path(base_dir: Option<&Path>, url: &str) -> PathBuf {
    if is_http_url(url) {
        return PathBuf::from(url);
    }
    match base_dir {
        Some(base) => normalize(&base.join(url)),
        None => normalize(Path::new(url)),
    }
}
