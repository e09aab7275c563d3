//! Storage used for uploads and downloads.
//!
//! The engine only needs a handful of operations from a file: where it lives
//! on the local filesystem (if anywhere), how big it is, what it is called,
//! and the ability to read it whole or open it for writing. Transports can
//! only stream from and to files that are [locally addressable][File::local_path].

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A file reference, as used for request bodies, form fields and `save_as`.
pub type FileRef = Arc<dyn File>;

/// Minimal storage interface.
pub trait File: fmt::Debug + Send + Sync {
    /// Path on the local filesystem, or `None` if the file is not locally addressable.
    fn local_path(&self) -> Option<&Path>;

    /// Human readable location, used in error messages.
    fn location(&self) -> String;

    /// Last path component.
    fn basename(&self) -> String;

    /// Size in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Read the entire contents.
    fn read(&self) -> io::Result<Vec<u8>>;

    /// Open for writing, truncating any previous contents.
    fn open_write(&self) -> io::Result<Box<dyn Write + Send>>;
}

/// A file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    /// Refer to the file at `path`. The file does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalFile { path: path.into() }
    }

    /// Shorthand for wrapping a new `LocalFile` in a [`FileRef`].
    pub fn shared(path: impl Into<PathBuf>) -> FileRef {
        Arc::new(Self::new(path))
    }

    /// The path of this file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl File for LocalFile {
    fn local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn size(&self) -> io::Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    fn open_write(&self) -> io::Result<Box<dyn Write + Send>> {
        let file = fs::File::create(&self.path)?;
        Ok(Box::new(io::BufWriter::new(file)))
    }
}

/// A file held in memory.
///
/// Not locally addressable, so it cannot be uploaded, but it is a valid
/// `save_as` destination.
#[derive(Debug, Clone, Default)]
pub struct MemoryFile {
    name: String,
    data: Arc<Mutex<Vec<u8>>>,
}

impl MemoryFile {
    /// Create an empty in-memory file.
    pub fn new(name: impl Into<String>) -> Self {
        MemoryFile {
            name: name.into(),
            data: Arc::default(),
        }
    }

    /// Create an in-memory file with initial contents.
    pub fn with_contents(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        MemoryFile {
            name: name.into(),
            data: Arc::new(Mutex::new(data.into())),
        }
    }

    /// Copy of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.data).clone()
    }
}

fn lock(data: &Mutex<Vec<u8>>) -> std::sync::MutexGuard<'_, Vec<u8>> {
    // A writer panicking mid-write leaves bytes that are still worth reading.
    data.lock().unwrap_or_else(|e| e.into_inner())
}

impl File for MemoryFile {
    fn local_path(&self) -> Option<&Path> {
        None
    }

    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn basename(&self) -> String {
        self.name.clone()
    }

    fn size(&self) -> io::Result<u64> {
        Ok(lock(&self.data).len() as u64)
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.contents())
    }

    fn open_write(&self) -> io::Result<Box<dyn Write + Send>> {
        lock(&self.data).clear();
        Ok(Box::new(MemoryWriter(self.data.clone())))
    }
}

struct MemoryWriter(Arc<Mutex<Vec<u8>>>);

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
