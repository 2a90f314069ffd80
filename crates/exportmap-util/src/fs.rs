use std::fs;
use std::io;
use std::path::Path;

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a file if it exists.
///
/// Returns `Ok(None)` when the file is missing, so callers can treat
/// absence as a normal outcome instead of an error.
///
/// # Errors
/// Returns an error for any failure other than the file not existing.
pub fn read_if_exists(path: &Path) -> io::Result<Option<String>> {
    match read_to_string_lossy(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
