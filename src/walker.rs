//! Folder walker: runs extract, rename and metadata writes over a tree

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::metadata::MetadataWriter;
use crate::parser::extract;
use crate::rename::{RenameOptions, rename};
use crate::types::{FileKind, MessageRecord, WalkReport, is_plausible_email};

/// How a tree walk treats files and failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Only process files whose name contains `.eml` or `.ics`.
    ///
    /// When off, every file is extracted, only plausible emails are renamed,
    /// and renamed files get a `.eml` extension.
    pub require_known_extension: bool,

    /// Abort the whole walk on the first extraction or rename failure
    pub strict_mode: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            require_known_extension: true,
            strict_mode: false,
        }
    }
}

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Extracted and renamed; metadata writes may still have failed
    Renamed {
        path: PathBuf,
        record: MessageRecord,
        metadata_failures: usize,
    },
    /// Fields did not look like an email
    Skipped,
}

/// Process every eligible file under `root`, depth-first.
///
/// The file list is collected before anything is renamed, so renamed files
/// are never visited twice. Per-file failures are logged and counted; in
/// strict mode the first one aborts the walk.
pub fn process_tree(
    root: &Path,
    config: &WalkConfig,
    metadata: &dyn MetadataWriter,
) -> Result<WalkReport> {
    if !root.is_dir() {
        return Err(Error::Read {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a folder"),
        });
    }

    debug!(
        "walking folder {} requiring known extension: {}",
        root.display(),
        config.require_known_extension
    );

    let mut report = WalkReport::default();
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                error!("failed walking {}: {e}", root.display());
                report.failed += 1;
                if config.strict_mode {
                    return Err(e.into());
                }
            }
        }
    }

    let mut current_folder: Option<PathBuf> = None;

    for path in files {
        report.files_seen += 1;

        if config.require_known_extension && !FileKind::of(&path).is_known() {
            report.skipped += 1;
            continue;
        }

        let folder = path.parent().map(Path::to_path_buf);
        if folder != current_folder {
            if let Some(folder) = &folder {
                info!("processing folder {}", folder.display());
            }
            current_folder = folder;
        }
        info!("processing: {}", path.display());

        match process_file(&path, config, metadata) {
            Ok(FileOutcome::Renamed {
                metadata_failures, ..
            }) => {
                report.renamed += 1;
                report.metadata_failures += metadata_failures;
            }
            Ok(FileOutcome::Skipped) => report.skipped += 1,
            Err(e) => {
                error!("failed processing {}: {e}", path.display());
                report.failed += 1;
                if config.strict_mode && e.is_fatal_to_walk() {
                    return Err(e);
                }
            }
        }
    }

    info!("{report}");
    Ok(report)
}

/// Run the whole pipeline on one file.
///
/// Extraction and rename failures are returned. Metadata failures are logged
/// and only counted in the outcome.
pub fn process_file(
    path: &Path,
    config: &WalkConfig,
    metadata: &dyn MetadataWriter,
) -> Result<FileOutcome> {
    let record = extract(path)?;
    debug!("\t\t\tsubject: {}", record.subject);
    debug!("\t\t\tsent_date: {}", record.sent_date);

    if !config.require_known_extension && !is_plausible_email(&record) {
        debug!("not an email, leaving {} alone", path.display());
        return Ok(FileOutcome::Skipped);
    }

    let options = RenameOptions {
        keep_original_extension: config.require_known_extension,
    };
    let new_path = rename(path, &record.subject, options)?;

    let mut metadata_failures = 0;

    if let Err(e) = metadata.set_document_properties(&new_path, &record.document_properties()) {
        error!("failed updating file attributes for {}: {e}", new_path.display());
        metadata_failures += 1;
    }
    if let Err(e) = metadata.set_creation_time(&new_path, record.sent_at) {
        error!("failed changing creation date for {}: {e}", new_path.display());
        metadata_failures += 1;
    }

    Ok(FileOutcome::Renamed {
        path: new_path,
        record,
        metadata_failures,
    })
}
