//! Subject decoding and filename sanitizing

use regex::Regex;

use crate::decode::decode_encoded_words;

/// Subject used when no strategy found anything
pub const NO_SUBJECT: &str = "No Subject";

/// Subject used when sanitizing left nothing behind
pub const EMPTY_SUBJECT: &str = "NoSubject";

/// Characters Windows refuses in file names, with their replacement
const RESERVED: [(char, char); 9] = [
    (':', '-'),
    ('/', '-'),
    ('\\', '-'),
    ('*', '-'),
    ('?', '-'),
    ('"', '\''),
    ('<', '-'),
    ('>', '-'),
    ('|', '-'),
];

/// Mis-encodings seen often enough to repair by hand
const REPAIRS: [(&str, &str); 1] = [("Ã©", "é")];

static LINE_BREAK_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[\r\n\t][\r\n\t ]*").unwrap());

/// Decode a raw subject header and sanitize it into a filename stem
#[must_use]
pub fn decode_subject(raw: &str) -> String {
    sanitize(&decode_encoded_words(raw))
}

/// Make a decoded subject safe to use as a file name.
///
/// The result never contains `: / \ * ? " < > |` nor any code point up to 31,
/// and is never empty.
#[must_use]
pub fn sanitize(subject: &str) -> String {
    let collapsed = LINE_BREAK_REGEX.replace_all(subject, " ");
    let stripped = strip_reply_prefixes(&collapsed);

    let mut cleaned: String = stripped
        .chars()
        .map(|c| {
            RESERVED
                .iter()
                .find(|(reserved, _)| *reserved == c)
                .map_or(c, |(_, replacement)| *replacement)
        })
        .collect();

    for (broken, fixed) in REPAIRS {
        cleaned = cleaned.replace(broken, fixed);
    }

    let cleaned: String = cleaned.chars().filter(|&c| u32::from(c) > 31).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        EMPTY_SUBJECT.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Remove leading reply and forward markers (`RE:`, `Re[2]:`, `FW:`, `Fwd:`)
#[must_use]
pub fn strip_reply_prefixes(subject: &str) -> String {
    let mut normalized = subject.trim_start();

    loop {
        if let Some(rest) = strip_prefix_ignore_case(normalized, "re:")
            .or_else(|| strip_prefix_ignore_case(normalized, "fwd:"))
            .or_else(|| strip_prefix_ignore_case(normalized, "fw:"))
        {
            normalized = rest.trim_start();
        } else if strip_prefix_ignore_case(normalized, "re[").is_some() {
            // Re[2]: format
            match normalized.find("]:") {
                Some(end) if normalized[3..end].parse::<u32>().is_ok() => {
                    normalized = normalized[end + 2..].trim_start();
                }
                _ => break,
            }
        } else {
            break;
        }
    }

    normalized.to_string()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}
