//! Core types shared across the pipeline

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The four searchable fields extracted from one message file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Recipient(s) as written in the "To" header, possibly empty
    pub recipient: String,

    /// Sender as written in the "From" header
    pub sender: String,

    /// Decoded and sanitized subject, safe to use as a filename stem
    pub subject: String,

    /// Cleaned sent date, exactly as it was handed to the date parser
    pub sent_date: String,

    /// The absolute point in time `sent_date` denotes
    pub sent_at: DateTime<FixedOffset>,
}

impl MessageRecord {
    /// Document properties to attach to the renamed file
    #[must_use]
    pub fn document_properties(&self) -> DocumentProperties {
        DocumentProperties {
            author: self.sender.clone(),
            title: self.subject.clone(),
            comment: format!("TO:{}", self.recipient),
        }
    }
}

impl fmt::Display for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (from {} to {}, sent {})",
            self.subject, self.sender, self.recipient, self.sent_date
        )
    }
}

/// Whether the extracted fields look like they came from a real email.
///
/// Used when extension filtering is off, to avoid renaming arbitrary files.
#[must_use]
pub fn is_plausible_email(record: &MessageRecord) -> bool {
    record.recipient.chars().count() > 3
        && record.sender.chars().count() > 3
        && record.subject.chars().count() >= 3
        && record.sent_date.chars().count() > 8
}

/// Kind of message file, decided from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Eml,
    Calendar,
    Other,
}

impl FileKind {
    /// Classify a path by looking for `.ics` / `.eml` anywhere in its file name
    #[must_use]
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.contains(".ics") {
            Self::Calendar
        } else if name.contains(".eml") {
            Self::Eml
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Searchable document metadata written next to the rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub author: String,
    pub title: String,
    pub comment: String,
}

/// Counters accumulated over one tree walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkReport {
    /// Files found under the root
    pub files_seen: usize,

    /// Files extracted and renamed
    pub renamed: usize,

    /// Files not eligible (unknown extension or implausible fields)
    pub skipped: usize,

    /// Files whose extraction or rename failed
    pub failed: usize,

    /// Best-effort metadata writes that failed
    pub metadata_failures: usize,
}

impl fmt::Display for WalkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) seen, {} renamed, {} skipped, {} failed, {} metadata failure(s)",
            self.files_seen, self.renamed, self.skipped, self.failed, self.metadata_failures
        )
    }
}
