//! Filesystem metadata writes: creation time and document properties
//!
//! Both operations are best-effort. The walker logs their failures and
//! carries on, since the rename alone already makes a message searchable.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset};
use filetime::FileTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::DocumentProperties;

/// Extended attribute names used for document properties on Unix
pub const AUTHOR_XATTR: &str = "user.xdg.creator";
pub const TITLE_XATTR: &str = "user.dublincore.title";
pub const COMMENT_XATTR: &str = "user.xdg.comment";

/// Capability to attach searchable metadata to a file
pub trait MetadataWriter {
    /// Stamp `path` as created at `at`
    fn set_creation_time(&self, path: &Path, at: DateTime<FixedOffset>) -> Result<()>;

    /// Attach author, title and comment to `path`
    fn set_document_properties(&self, path: &Path, properties: &DocumentProperties)
    -> Result<()>;
}

/// Writes metadata with whatever the current platform supports.
///
/// Access and modification times are always set. Creation time is set on
/// Windows and macOS. Document properties become user extended attributes on
/// Unix and are skipped with a warning elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformMetadata;

impl MetadataWriter for PlatformMetadata {
    fn set_creation_time(&self, path: &Path, at: DateTime<FixedOffset>) -> Result<()> {
        debug!("SENT ON: {at} for {}", path.display());
        let time = SystemTime::from(at);

        match set_created(path, time) {
            Ok(true) => {}
            Ok(false) => debug!(
                "no creation time on this platform, only updating access/modification time of {}",
                path.display()
            ),
            Err(e) => return Err(metadata_error(path, &e)),
        }

        let file_time = FileTime::from_system_time(time);
        filetime::set_file_times(path, file_time, file_time).map_err(|e| metadata_error(path, &e))
    }

    fn set_document_properties(
        &self,
        path: &Path,
        properties: &DocumentProperties,
    ) -> Result<()> {
        write_properties(path, properties)
    }
}

/// Logs what it would write and touches nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetadata;

impl MetadataWriter for NoopMetadata {
    fn set_creation_time(&self, path: &Path, at: DateTime<FixedOffset>) -> Result<()> {
        debug!("skipping creation time {at} for {}", path.display());
        Ok(())
    }

    fn set_document_properties(
        &self,
        path: &Path,
        properties: &DocumentProperties,
    ) -> Result<()> {
        debug!(
            author = %properties.author,
            title = %properties.title,
            comment = %properties.comment,
            "skipping document properties for {}",
            path.display()
        );
        Ok(())
    }
}

fn metadata_error(path: &Path, e: &std::io::Error) -> Error {
    Error::MetadataWrite {
        path: path.to_path_buf(),
        details: e.to_string(),
    }
}

#[cfg(windows)]
fn set_created(path: &Path, at: SystemTime) -> std::io::Result<bool> {
    use std::os::windows::fs::FileTimesExt;

    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    file.set_times(std::fs::FileTimes::new().set_created(at))?;
    Ok(true)
}

#[cfg(target_os = "macos")]
fn set_created(path: &Path, at: SystemTime) -> std::io::Result<bool> {
    use std::os::macos::fs::FileTimesExt;

    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    file.set_times(std::fs::FileTimes::new().set_created(at))?;
    Ok(true)
}

#[cfg(not(any(windows, target_os = "macos")))]
#[allow(clippy::unnecessary_wraps)]
fn set_created(_path: &Path, _at: SystemTime) -> std::io::Result<bool> {
    Ok(false)
}

#[cfg(unix)]
fn write_properties(path: &Path, properties: &DocumentProperties) -> Result<()> {
    let attributes = [
        (AUTHOR_XATTR, &properties.author),
        (TITLE_XATTR, &properties.title),
        (COMMENT_XATTR, &properties.comment),
    ];

    for (name, value) in attributes {
        xattr::set(path, name, value.as_bytes()).map_err(|e| metadata_error(path, &e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn write_properties(path: &Path, properties: &DocumentProperties) -> Result<()> {
    // OLE summary properties need COM; not available here
    tracing::warn!(
        title = %properties.title,
        "document properties not supported on this platform, skipping {}",
        path.display()
    );
    Ok(())
}
