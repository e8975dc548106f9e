//! File locking utilities for safe concurrent access
//!
//! Provides locked read/write operations using `fs2` advisory locks so that
//! several `ferment` processes (CLI invocations, the `watch` loop) can share
//! one data directory without corrupting records.
//!
//! Advisory locks are cooperative - all participants must use these functions
//! for the locking to be effective.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Read file contents with a shared (read) lock.
///
/// Multiple readers may hold the lock at once; readers wait while a writer
/// holds the exclusive lock, so they never observe a half-written record.
pub fn locked_read(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;
    let mut content = String::new();
    BufReader::new(&file).read_to_string(&mut content)?;
    Ok(content)
}

/// Read-modify-write under a single exclusive lock.
///
/// The sequence is: open, lock, read, truncate, write, flush. Truncation only
/// happens after the lock is held, so a reader never sees an empty file.
/// `update` receives the current contents (empty for a new file) and returns
/// the replacement. If it fails, the file is left untouched.
pub fn locked_update<E, F>(path: &Path, update: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&str) -> Result<String, E>,
{
    #[allow(clippy::suspicious_open_options)]
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;
    file.lock_exclusive()?;

    let mut current = String::new();
    file.read_to_string(&mut current)?;

    let next = update(&current)?;

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    let mut writer = BufWriter::new(&file);
    writer.write_all(next.as_bytes())?;
    writer.flush()?;
    Ok(())
}
