use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, Timelike};
use eml_searchable::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn write_message(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn q_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("={b:02X}")).collect()
}

#[test]
fn test_extract_simple_email() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "1.eml",
        b"From: John Doe <john@example.com>\r\n\
          To: recipient@example.com\r\n\
          Subject: Test Email\r\n\
          Date: Thu, 02 Jan 2025 12:00:00 +0000\r\n\
          \r\n\
          Hello, this is a test email.",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.sender, "John Doe <john@example.com>");
    assert_eq!(record.recipient, "recipient@example.com");
    assert_eq!(record.subject, "Test Email");
    assert_eq!(record.sent_date, "Thu, 02 Jan 2025 12:00:00 +0000");
    assert_eq!(
        record.sent_at.naive_utc(),
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    );
}

#[test]
fn test_extract_utf8_subject_strips_reply_prefix() {
    let record = extract(&fixture("e_acute.eml")).unwrap();

    assert_eq!(record.subject, "bonne année");
    assert_eq!(record.sender, "Claire Martin <claire@example.fr>");
    assert_eq!(record.sent_at.offset().local_minus_utc(), 3600);
}

#[test]
fn test_extract_strips_unsupported_timezone() {
    let record = extract(&fixture("sent_date_non_supported_tz.eml")).unwrap();

    assert_eq!(record.sent_date, "Fri, 15 Feb 2008 13:51:50");
    let local = record.sent_at.naive_local();
    assert_eq!(local.date(), NaiveDate::from_ymd_opt(2008, 2, 15).unwrap());
    assert_eq!((local.hour(), local.minute(), local.second()), (13, 51, 50));
}

#[test]
fn test_extract_date_from_receive_header() {
    let record = extract(&fixture("receive_header.eml")).unwrap();

    assert_eq!(record.sent_date, "Fri, 24 Aug 2001 09:53:36 +0100");
    assert_eq!(record.subject, "Lunch-");
}

#[test]
fn test_extract_date_from_outlook_sent_line() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "forwarded.eml",
        b"From: alice@example.com\r\n\
          To: bob@example.com\r\n\
          Subject: FW: budget\r\n\
          \r\n\
          -----Original Message-----\r\n\
          From: carol@example.com\r\n\
          Sent: Wednesday, February 02, 2005 2:02 PM\r\n\
          To: alice@example.com\r\n",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.subject, "budget");
    assert_eq!(record.sent_date, "Wednesday, February 02, 2005 2:02 PM");
    let local = record.sent_at.naive_local();
    assert_eq!(local.date(), NaiveDate::from_ymd_opt(2005, 2, 2).unwrap());
    assert_eq!(local.hour(), 14);
}

#[test]
fn test_extract_prefers_longer_date_candidate() {
    let dir = TempDir::new().unwrap();
    // Second line carries a short receive date, the body a fuller one
    let path = write_message(
        &dir,
        "both.eml",
        b"Received: by mx.example.com\r\n\
          \tid 42; Mon, 3 Mar 2003\r\n\
          From: alice@example.com\r\n\
          \r\n\
          Sent: Monday, March 03, 2003 10:15 AM\r\n",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.sent_date, "Monday, March 03, 2003 10:15 AM");
}

#[test]
fn test_extract_calendar_item() {
    let record = extract(&fixture("meeting.ics")).unwrap();

    assert_eq!(record.subject, "Réunion d'équipe");
    assert_eq!(record.sender, "mailto:alice@example.com");
    assert_eq!(record.recipient, "");
    assert_eq!(record.sent_date, "20200115T090000");
    let local = record.sent_at.naive_local();
    assert_eq!(local.date(), NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());
    assert_eq!(local.hour(), 9);
}

#[test]
fn test_extract_missing_recipient_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "no_to.eml",
        b"From: alice@example.com\r\n\
          Subject: Note to self\r\n\
          Date: Tue, 1 Jun 2010 08:00:00 +0200\r\n\
          \r\n\
          Remember the milk.",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.recipient, "");
}

#[test]
fn test_extract_recipient_from_raw_line() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "raw_to.eml",
        b"From: alice@example.com\r\n\
          Subject: Minutes\r\n\
          Date: Tue, 1 Jun 2010 08:00:00 +0200\r\n\
          \r\n\
          To: team@example.com\r\n",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.recipient, "team@example.com");
}

#[test]
fn test_extract_missing_sender_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "anonymous.eml",
        b"To: bob@example.com\r\n\
          Subject: Who am I\r\n\
          Date: Tue, 1 Jun 2010 08:00:00 +0200\r\n\
          \r\n\
          body",
    );

    let err = extract(&path).unwrap_err();

    assert!(matches!(err, Error::Header { field: "FROM", .. }));
}

#[test]
fn test_extract_missing_date_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "undated.eml",
        b"From: alice@example.com\r\n\
          To: bob@example.com\r\n\
          Subject: Timeless\r\n\
          \r\n\
          body",
    );

    let err = extract(&path).unwrap_err();

    assert!(matches!(err, Error::Header { field: "SENT DATE", .. }));
}

#[test]
fn test_extract_unparseable_date_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "garbled.eml",
        b"From: alice@example.com\r\n\
          Date: sometime last spring\r\n\
          \r\n\
          body",
    );

    let err = extract(&path).unwrap_err();

    assert!(matches!(err, Error::Header { field: "SENT DATE", .. }));
}

#[test]
fn test_extract_subject_falls_back_to_attachment_name() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "attachment.eml",
        b"From: alice@example.com\r\n\
          Subject:   \r\n\
          Date: Tue, 1 Jun 2010 08:00:00 +0200\r\n\
          Content-Type: multipart/mixed; boundary=\"b\"\r\n\
          \r\n\
          --b\r\n\
          Content-Disposition: attachment; filename=\"report.pdf\"\r\n\
          \r\n\
          data\r\n\
          --b--\r\n",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.subject, "report.pdf");
}

#[test]
fn test_extract_without_subject_uses_placeholder() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "plain.eml",
        b"From: alice@example.com\r\n\
          To: bob@example.com\r\n\
          Date: Tue, 1 Jun 2010 08:00:00 +0200\r\n\
          \r\n\
          nothing to see",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.subject, NO_SUBJECT);
    assert_eq!(record.subject, "No Subject");
}

#[test]
fn test_extract_calendar_without_summary_uses_placeholder() {
    let dir = TempDir::new().unwrap();
    let path = write_message(
        &dir,
        "empty.ics",
        b"BEGIN:VCALENDAR\r\n\
          BEGIN:VEVENT\r\n\
          ORGANIZER:mailto:alice@example.com\r\n\
          DTSTART:20200115T090000Z\r\n\
          END:VEVENT\r\n\
          END:VCALENDAR\r\n",
    );

    let record = extract(&path).unwrap();

    assert_eq!(record.subject, "No Subject");
    assert_eq!(record.sent_at.offset().local_minus_utc(), 0);
}

#[test]
fn test_extract_japanese_subject_declared_iso_2022_jp() {
    let original = "日本語の件名です";
    let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode(original);
    let mut raw = format!(
        "From: tanaka@example.jp\r\nSubject: =?ISO-2022-JP?Q?{}?=\r\nDate: Mon, 7 Jan 2019 09:30:00 +0900\r\n\r\nbody",
        q_encode(&sjis)
    )
    .into_bytes();
    raw.extend_from_slice(b"\r\n");

    let dir = TempDir::new().unwrap();
    let path = write_message(&dir, "jp.eml", &raw);

    let record = extract(&path).unwrap();

    assert_eq!(record.subject, original);
}

#[test]
fn test_extract_big5_subject() {
    let original = "[EXTERNAL]AVIS安維斯汽車租賃股份有限公司-電子發票證明聯開立通知_MK02836722";
    let (big5, _, _) = encoding_rs::BIG5.encode(original);
    let raw = format!(
        "From: avis@example.tw\r\nSubject: =?big5?B?{}?=\r\nDate: Mon, 7 Jan 2019 09:30:00 +0800\r\n\r\nbody\r\n",
        STANDARD.encode(&big5)
    );

    let dir = TempDir::new().unwrap();
    let path = write_message(&dir, "big5_subject.eml", raw.as_bytes());

    let record = extract(&path).unwrap();

    assert_eq!(record.subject, original);
}

#[test]
fn test_extract_unreadable_file() {
    let dir = TempDir::new().unwrap();
    let err = extract(&dir.path().join("missing.eml")).unwrap_err();

    assert!(matches!(err, Error::Read { .. }));
}

#[test]
fn test_extract_calendar_must_be_utf8() {
    let dir = TempDir::new().unwrap();
    let path = write_message(&dir, "latin1.ics", b"SUMMARY:R\xe9union\r\n");

    let err = extract(&path).unwrap_err();

    assert!(matches!(err, Error::Read { .. }));
}
