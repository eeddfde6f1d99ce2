//! Renaming message files after their subject

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Legacy Windows path length ceiling
pub const MAX_PATH_LEN: usize = 260;

/// Longest file name, in bytes, most Unix filesystems accept
pub const MAX_NAME_BYTES: usize = 255;

/// Highest `[n]` suffix tried when the target name is taken
pub const MAX_COLLISION_SUFFIX: u32 = 1023;

/// Options for [`rename`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOptions {
    /// Keep the file's own extension instead of forcing `.eml`
    pub keep_original_extension: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            keep_original_extension: true,
        }
    }
}

/// Rename `current` to `<subject><ext>` in the same folder.
///
/// Over-long names are truncated and taken names get a `[n]` suffix. Returns
/// the new full path. A file that already carries its target name, or a
/// suffixed variant of it from an earlier run, is left alone.
pub fn rename(current: &Path, subject: &str, options: RenameOptions) -> Result<PathBuf> {
    let folder = current.parent().unwrap_or_else(|| Path::new(""));
    let mut target = target_path(current, subject, options);

    debug!(
        "subject: -{subject}-, fp -{}- -> -{}-",
        current.display(),
        target.display()
    );

    if target == current {
        return Ok(target);
    }

    if target.exists() {
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target = folder.join(incremental_filename(folder, &file_name, Some(current))?);
        if target == current {
            debug!("{} already carries a suffixed name", current.display());
            return Ok(target);
        }
    }

    std::fs::rename(current, &target).map_err(|source| {
        error!(
            "cannot rename file: {} - {}",
            current.display(),
            target.display()
        );
        Error::Rename {
            from: current.to_path_buf(),
            to: target.clone(),
            source,
        }
    })?;

    Ok(target)
}

/// The path `current` would be renamed to, before collision handling
#[must_use]
pub fn target_path(current: &Path, subject: &str, options: RenameOptions) -> PathBuf {
    let folder = current.parent().unwrap_or_else(|| Path::new(""));
    let extension = if options.keep_original_extension {
        current
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    } else {
        ".eml".to_string()
    };

    let candidate = folder.join(format!("{subject}{extension}"));
    if char_len(&candidate) <= MAX_PATH_LEN && subject.len() + extension.len() <= MAX_NAME_BYTES {
        return candidate;
    }

    let fixed = char_len(folder) + 1 + extension.chars().count();
    let budget = MAX_PATH_LEN.saturating_sub(fixed).max(1);
    let truncated: String = subject.chars().take(budget).collect();
    let truncated = truncate_bytes(&truncated, MAX_NAME_BYTES.saturating_sub(extension.len()));
    debug!("truncating subject to {} for {}", truncated.len(), folder.display());

    folder.join(format!("{}{extension}", truncated.trim_end()))
}

/// First `base[n].ext` with `n` in `1..=1023` that does not exist in `folder`.
///
/// `current` counts as free, so a file already holding one of the suffixed
/// names gets that name back. The base is cut so the name stays within
/// [`MAX_NAME_BYTES`].
pub fn incremental_filename(
    folder: &Path,
    file_name: &str,
    current: Option<&Path>,
) -> Result<String> {
    let suffixed = |n: u32| {
        let suffix = format!("[{n}]");
        match file_name.rsplit_once('.') {
            Some((base, ext)) => {
                let room = MAX_NAME_BYTES.saturating_sub(suffix.len() + 1 + ext.len());
                format!("{}{suffix}.{ext}", truncate_bytes(base, room))
            }
            None => {
                let room = MAX_NAME_BYTES.saturating_sub(suffix.len());
                format!("{}{suffix}", truncate_bytes(file_name, room))
            }
        }
    };

    (1..=MAX_COLLISION_SUFFIX)
        .map(suffixed)
        .find(|candidate| {
            let path = folder.join(candidate);
            current == Some(path.as_path()) || !path.exists()
        })
        .ok_or_else(|| {
            error!("no free name left for {file_name} in {}", folder.display());
            Error::CollisionExhausted {
                path: folder.join(file_name),
            }
        })
}

/// Longest prefix of `s` within `max` bytes that ends on a char boundary
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    &s[..end]
}

fn char_len(path: &Path) -> usize {
    path.as_os_str().to_string_lossy().chars().count()
}
