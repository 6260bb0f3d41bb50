//! Schema resource lookup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

/// Opens a byte stream for a logical resource name.
pub trait ResourceLoader {
    /// Open the resource named by `locator`
    fn open(&self, locator: &str) -> io::Result<Box<dyn Read>>;
}

/// Loader that reads local files once and serves later requests from memory.
///
/// Locators are plain paths or `file:` URLs. Relative paths are resolved
/// against the base directory when one is set. Entries can also be
/// registered up front with [`CachedResources::insert`], which is how
/// bundled schemas are provided without touching the filesystem.
#[derive(Debug, Default)]
pub struct CachedResources {
    base_dir: Option<PathBuf>,
    cache: RefCell<HashMap<String, Bytes>>,
}

impl CachedResources {
    /// Empty cache resolving relative paths against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Serve `content` for `locator` from now on
    pub fn insert(&self, locator: impl Into<String>, content: impl Into<Bytes>) {
        self.cache.borrow_mut().insert(locator.into(), content.into());
    }

    /// Whether `locator` is already held in memory
    pub fn contains(&self, locator: &str) -> bool {
        self.cache.borrow().contains_key(locator)
    }

    fn resolve(&self, locator: &str) -> io::Result<PathBuf> {
        if locator.contains("://") && !locator.starts_with("file://") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported resource scheme in `{locator}`"),
            ));
        }
        let path = locator
            .strip_prefix("file://")
            .or_else(|| locator.strip_prefix("file:"))
            .unwrap_or(locator);
        let path = Path::new(path);

        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl ResourceLoader for CachedResources {
    fn open(&self, locator: &str) -> io::Result<Box<dyn Read>> {
        if let Some(content) = self.cache.borrow().get(locator) {
            return Ok(Box::new(Cursor::new(content.clone())));
        }

        let path = self.resolve(locator)?;
        let content = Bytes::from(fs::read(&path)?);
        debug!("Cached {} ({} bytes)", path.display(), content.len());
        self.insert(locator, content.clone());
        Ok(Box::new(Cursor::new(content)))
    }
}
