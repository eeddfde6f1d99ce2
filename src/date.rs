//! Sent-date cleaning and permissive parsing

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

/// Timezone annotations the parser cannot interpret, removed before parsing
const TZ_ANNOTATIONS: [&str; 3] = [" W. Europe Standard Time", " (GMT)", " \"GMT\""];

/// Day-of-week misspellings seen in the wild
const DOW_TYPOS: [(&str, &str); 1] = [("Wen", "Wed")];

const OFFSET_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%b %d %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %b %Y %I:%M:%S %p",
    "%d %b %Y %I:%M %p",
    "%d %b %Y %I:%M%p",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M%p",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%b %d %H:%M:%S %Y",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d", "%d %b %Y", "%b %d, %Y", "%m/%d/%Y"];

static LEADING_DOW_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap()
});

static TRAILING_COMMENT_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());

static ZONE_NAME_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)\s+(GMT|UTC|UT|Z|EST|EDT|CST|CDT|MST|MDT|PST|PDT|CET|CEST|BST|JST)$")
        .unwrap()
});

static UNKNOWN_ZONE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(\d)\s+([A-Za-z]{2,5})$").unwrap());

static COMPACT_UTC_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^(\d{8}T\d{6})Z$").unwrap());

static MULTI_SPACE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Normalize a raw sent-date string before parsing.
///
/// Removes line breaks and surrounding whitespace, known timezone annotations
/// and fixes day-of-week typos.
#[must_use]
pub fn clean_sent_date(raw: &str) -> String {
    let mut cleaned = raw.replace(['\r', '\n'], "").trim().to_string();

    for annotation in TZ_ANNOTATIONS {
        cleaned = cleaned.replace(annotation, "");
    }
    for (typo, fixed) in DOW_TYPOS {
        cleaned = cleaned.replace(typo, fixed);
    }

    cleaned.trim().to_string()
}

/// Parse a cleaned date string into an absolute timestamp.
///
/// Strings without an offset are taken as local time.
#[must_use]
pub fn parse_sent_date(cleaned: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }

    let normalized = normalize(trimmed);
    debug!(date = %normalized, "falling back to format list");

    if let Some(cap) = COMPACT_UTC_REGEX.captures(&normalized) {
        return NaiveDateTime::parse_from_str(&cap[1], "%Y%m%dT%H%M%S")
            .ok()
            .map(|ndt| Utc.from_utc_datetime(&ndt).fixed_offset());
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
                .map(local_to_fixed)
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
                .map(|date| local_to_fixed(date.and_time(chrono::NaiveTime::MIN)))
        })
        .or_else(|| {
            // Naive results come back in local time
            dateparser::parse(&normalized)
                .ok()
                .map(|utc| utc.with_timezone(&Local).fixed_offset())
        })
}

/// Strip what the format list cannot express: trailing comments, a leading
/// day of week, `at`, and zone names. Known zones become offsets, unknown
/// ones are dropped.
fn normalize(s: &str) -> String {
    let s = TRAILING_COMMENT_REGEX.replace(s, "");
    let s = LEADING_DOW_REGEX.replace(&s, "");
    let s = s.replace(" at ", " ");
    let s = ZONE_NAME_REGEX.replace(&s, |caps: &regex::Captures| {
        format!(" {}", zone_offset(&caps[1]))
    });
    let s = UNKNOWN_ZONE_REGEX.replace(&s, |caps: &regex::Captures| {
        let token = &caps[2];
        if token.eq_ignore_ascii_case("am") || token.eq_ignore_ascii_case("pm") {
            caps[0].to_string()
        } else {
            debug!(zone = token, "dropping unknown zone name");
            caps[1].to_string()
        }
    });
    MULTI_SPACE_REGEX.replace_all(s.trim(), " ").into_owned()
}

fn zone_offset(name: &str) -> &'static str {
    match name.to_uppercase().as_str() {
        "EST" | "CDT" => "-0500",
        "EDT" => "-0400",
        "CST" | "MDT" => "-0600",
        "MST" | "PDT" => "-0700",
        "PST" => "-0800",
        "CET" | "BST" => "+0100",
        "CEST" => "+0200",
        "JST" => "+0900",
        _ => "+0000",
    }
}

fn local_to_fixed(ndt: NaiveDateTime) -> DateTime<FixedOffset> {
    Local
        .from_local_datetime(&ndt)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&ndt))
        .fixed_offset()
}
