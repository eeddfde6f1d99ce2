//! Header extraction: turns one message file into a [`MessageRecord`]

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use mailparse::{MailHeader, MailHeaderMap};
use tracing::{debug, error, info, warn};

use crate::date::{clean_sent_date, parse_sent_date};
use crate::decode::{decode_file_text, header_bytes_to_text};
use crate::error::{Error, Result};
use crate::scan::{self, LineStrategy};
use crate::subject::{NO_SUBJECT, decode_subject};
use crate::types::{FileKind, MessageRecord};

const MAIL_SENDER_STRATEGIES: &[LineStrategy] = &[scan::sender_line];

const CALENDAR_SENDER_STRATEGIES: &[LineStrategy] = &[scan::sender_line, scan::calendar_organizer];

const MAIL_SUBJECT_STRATEGIES: &[LineStrategy] = &[scan::subject_line, scan::attachment_filename];

const CALENDAR_SUBJECT_STRATEGIES: &[LineStrategy] = &[
    scan::subject_line,
    scan::attachment_filename,
    scan::calendar_summary,
];

/// Extract recipient, sender, subject and sent date from a message file.
///
/// Recipient and subject always come back with a value (possibly a
/// placeholder). Sender and sent date are mandatory: when no strategy finds
/// them the call fails with [`Error::Header`].
pub fn extract(path: &Path) -> Result<MessageRecord> {
    let kind = FileKind::of(path);

    let bytes = std::fs::read(path).map_err(|source| {
        error!("failed loading email: {}", path.display());
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let text = decode_file_text(&bytes, kind).map_err(|source| {
        error!("failed decoding email: {}", path.display());
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let lines: Vec<&str> = text.lines().collect();

    let headers = match mailparse::parse_headers(&bytes) {
        Ok((headers, _)) => headers,
        Err(e) => {
            debug!("no structured headers in {}: {e}", path.display());
            Vec::new()
        }
    };

    let recipient = extract_recipient(path, &headers, &lines);
    let sender = extract_sender(path, kind, &headers, &lines)?;
    let subject = extract_subject(path, kind, &headers, &lines);
    let (sent_date, sent_at) = extract_sent_date(path, &headers, &lines)?;

    debug!("Parsed {}: {subject} from {sender} sent {sent_at}", path.display());

    Ok(MessageRecord {
        recipient,
        sender,
        subject,
        sent_date,
        sent_at,
    })
}

/// Structured read of a header, decoded and trimmed, `None` when blank
fn structured_value(headers: &[MailHeader], name: &str) -> Option<String> {
    headers
        .get_first_value(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn extract_recipient(path: &Path, headers: &[MailHeader], lines: &[&str]) -> String {
    structured_value(headers, "To")
        .or_else(|| scan::recipient_line(lines))
        .unwrap_or_else(|| {
            // The recipient is optional for desktop search
            info!("Cannot get TO: field from: {}", path.display());
            String::new()
        })
}

fn extract_sender(
    path: &Path,
    kind: FileKind,
    headers: &[MailHeader],
    lines: &[&str],
) -> Result<String> {
    let strategies = if kind == FileKind::Calendar {
        CALENDAR_SENDER_STRATEGIES
    } else {
        MAIL_SENDER_STRATEGIES
    };

    structured_value(headers, "From")
        .or_else(|| scan::first_match(lines, strategies))
        .ok_or_else(|| {
            error!("Cannot get FROM: field from: {}", path.display());
            Error::Header {
                path: path.to_path_buf(),
                field: "FROM",
            }
        })
}

fn extract_subject(path: &Path, kind: FileKind, headers: &[MailHeader], lines: &[&str]) -> String {
    let structured = headers
        .get_first_header("Subject")
        .map(|h| header_bytes_to_text(h.get_value_raw()))
        .filter(|s| !s.trim().is_empty());
    if let Some(raw) = &structured {
        debug!("read subject from message: {raw}");
    }

    let strategies = if kind == FileKind::Calendar {
        CALENDAR_SUBJECT_STRATEGIES
    } else {
        MAIL_SUBJECT_STRATEGIES
    };

    let raw = structured
        .or_else(|| {
            debug!("empty Subject header, scanning lines of {}", path.display());
            scan::first_match(lines, strategies)
        })
        .unwrap_or_else(|| {
            warn!("Cannot get SUBJECT: field from: {}", path.display());
            NO_SUBJECT.to_string()
        });

    decode_subject(&raw)
}

fn extract_sent_date(
    path: &Path,
    headers: &[MailHeader],
    lines: &[&str],
) -> Result<(String, DateTime<FixedOffset>)> {
    let missing = || {
        error!("Cannot get SENT DATE: field from: {}", path.display());
        Error::Header {
            path: path.to_path_buf(),
            field: "SENT DATE",
        }
    };

    let candidate = structured_value(headers, "Date")
        .or_else(|| {
            let property = scan::date_property(lines).unwrap_or_default();
            let received = scan::receive_header_date(lines).unwrap_or_default();
            debug!("sent date candidates: property {property:?}, header {received:?}");

            // The longer candidate usually carries more of the date
            let longer = if property.len() > received.len() {
                property
            } else {
                received
            };
            Some(longer).filter(|s| !s.trim().is_empty())
        })
        .ok_or_else(missing)?;

    let cleaned = clean_sent_date(&candidate);
    let sent_at = parse_sent_date(&cleaned).ok_or_else(missing)?;

    Ok((cleaned, sent_at))
}
