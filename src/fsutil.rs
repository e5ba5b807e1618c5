//! Buffered file access for the cgroup and procfs readers.
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Opening a stat file failed.
#[derive(Debug, thiserror::Error)]
#[error("cannot open `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileOpenError {
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Opens `path` for buffered reading.
///
/// # Errors
///
/// Returns a [`FileOpenError`] carrying the path if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use garden_tagger::fsutil;
/// let reader = fsutil::open_file_reader("/sys/fs/cgroup/garden/cpu.stat")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| FileOpenError {
            path: path.to_path_buf(),
            source,
        })
}

/// Like [`open_file_reader`], but a missing file yields `Ok(None)`.
///
/// Controllers that are not enabled for a cgroup leave their files out, so
/// most cgroup files are read through this.
pub fn open_optional_file_reader(
    path: impl AsRef<Path>,
) -> Result<Option<BufReader<File>>, FileOpenError> {
    match open_file_reader(path) {
        Ok(reader) => Ok(Some(reader)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
