//! Scratch directory for throwaway files such as the live preview.

use std::{fs, io::ErrorKind, path::Path};

use crate::error::FramegrabError;

/// Default scratch directory, relative to the working directory.
pub const DEFAULT_SCRATCH_DIRECTORY: &str = "temp_previews";

/// Empty `directory`, creating it if needed.
///
/// Session directories live under the output root and are never touched.
///
/// # Errors
///
/// Returns [`FramegrabError::IoError`] if the tree cannot be removed or the
/// directory cannot be recreated.
pub fn reset<P: AsRef<Path>>(directory: P) -> Result<(), FramegrabError> {
    let directory = directory.as_ref();
    match fs::remove_dir_all(directory) {
        Ok(()) => log::debug!("Removed scratch directory {}", directory.display()),
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => return Err(error.into()),
    }
    fs::create_dir_all(directory)?;
    Ok(())
}
