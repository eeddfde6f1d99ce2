//! Text decoding for message files and RFC 2047 encoded-words

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8, WINDOWS_1252};
use regex::Regex;
use tracing::{debug, warn};

use crate::types::FileKind;

/// Charset labels that Outlook puts on Japanese mail. The declared value is
/// unreliable, so all of them are decoded as CP932 (Windows-31J).
const JAPANESE_LABELS: &[&str] = &[
    "ISO-2022-JP",
    "ISO-2022-JP-1",
    "ISO-2022-JP-2",
    "ISO-2022-JP-3",
    "ISO-2022-JP-2004",
    "CP932",
    "WINDOWS-31J",
    "SHIFTJIS",
    "SHIFT_JIS",
    "SHIFT-JIS",
    "CP942",
    "SJIS",
    "UCS2",
    "SHIFT_JISX0213",
    "SHIFT_JISX0208",
];

static ENCODED_WORD_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"=\?([^?\s]+)\?([BbQq])\?([^?\s]*)\?=").unwrap()
});

/// Decode the bytes of a message file into text.
///
/// Calendar files must be UTF-8. Everything else goes through a single-byte
/// decoding that maps every byte to a character, so it never fails.
pub fn decode_file_text(bytes: &[u8], kind: FileKind) -> std::io::Result<String> {
    match kind {
        FileKind::Calendar => {
            let (text, had_errors) = UTF_8.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "calendar file is not valid UTF-8",
                ));
            }
            Ok(text.into_owned())
        }
        FileKind::Eml | FileKind::Other => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            Ok(text.into_owned())
        }
    }
}

/// Turn the raw bytes of a header value into text.
///
/// Unlabelled header text is taken as UTF-8 when it is valid, and falls back
/// to a single-byte charset when it is binary.
#[must_use]
pub fn header_bytes_to_text(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(raw);
            decoded.into_owned()
        }
    }
}

/// Resolve a MIME charset label, coercing Japanese legacy labels to CP932
#[must_use]
pub fn charset_for_label(label: &str) -> Option<&'static Encoding> {
    // RFC 2231 language suffix: "utf-8*en"
    let label = label.split('*').next().unwrap_or(label).trim();
    let upper = label.to_uppercase();

    if JAPANESE_LABELS.contains(&upper.as_str()) {
        debug!(charset = label, "coercing Japanese charset to CP932");
        return Some(SHIFT_JIS);
    }

    Encoding::for_label(label.as_bytes())
}

/// Decode every `=?charset?encoding?text?=` fragment in a header value.
///
/// Text between fragments is kept as is, except whitespace separating two
/// adjacent encoded fragments. Adjacent fragments in the same charset are
/// joined before decoding, so a character split across two of them survives.
/// A fragment that cannot be decoded is left untouched.
#[must_use]
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut pending: Option<(String, Vec<u8>)> = None;
    let mut last_end = 0;

    for cap in ENCODED_WORD_REGEX.captures_iter(input) {
        let Some(whole) = cap.get(0) else {
            continue;
        };
        let gap = &input[last_end..whole.start()];
        last_end = whole.end();

        let Some(bytes) = word_bytes(&cap[2], &cap[3]) else {
            flush_pending(&mut result, pending.take());
            result.push_str(gap);
            result.push_str(whole.as_str());
            continue;
        };

        let charset = &cap[1];
        let adjacent = pending.is_some() && gap.trim().is_empty();
        if let Some((label, buffer)) = pending.as_mut()
            && adjacent
            && same_charset(label, charset)
        {
            buffer.extend_from_slice(&bytes);
            continue;
        }

        flush_pending(&mut result, pending.replace((charset.to_string(), bytes)));
        if !adjacent {
            result.push_str(gap);
        }
    }

    flush_pending(&mut result, pending);
    result.push_str(&input[last_end..]);
    result
}

fn flush_pending(result: &mut String, pending: Option<(String, Vec<u8>)>) {
    if let Some((charset, bytes)) = pending {
        result.push_str(&decode_charset(&charset, &bytes));
    }
}

fn same_charset(a: &str, b: &str) -> bool {
    match (charset_for_label(a), charset_for_label(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.eq_ignore_ascii_case(b),
    }
}

/// Raw bytes carried by one fragment, `None` when its payload is malformed
fn word_bytes(encoding: &str, text: &str) -> Option<Vec<u8>> {
    if encoding.eq_ignore_ascii_case("b") {
        STANDARD
            .decode(text)
            .or_else(|_| STANDARD_NO_PAD.decode(text.trim_end_matches('=')))
            .ok()
    } else {
        Some(decode_q(text))
    }
}

/// Q-encoding: `_` is a space, `=XX` is a byte
fn decode_q(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b'=' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    result.push(byte);
                    i += 3;
                } else {
                    result.push(b'=');
                    i += 1;
                }
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    result
}

/// Decode bytes in the named charset. Undecodable sequences become U+FFFD
/// and are reported.
fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    let Some(encoding) = charset_for_label(charset) else {
        warn!(charset, "Unknown charset, falling back to UTF-8 lossy");
        return String::from_utf8_lossy(bytes).into_owned();
    };

    let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        warn!(
            charset,
            encoding = encoding.name(),
            "undecodable bytes in encoded-word, replaced with U+FFFD"
        );
    }
    decoded.into_owned()
}
