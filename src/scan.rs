//! Raw-line fallback strategies
//!
//! When a structured header read comes back empty, the extractor falls back
//! to scanning the decoded file line by line. Each strategy here is a pure
//! function over those lines; [`first_match`] tries a list of them in order.

use regex::Regex;

/// A single fallback strategy over the raw lines of a message file
pub type LineStrategy = fn(&[&str]) -> Option<String>;

const DAYS_OF_WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

static ATTACHMENT_FILENAME_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r#"filename="([^"]*)""#).unwrap());

/// Run strategies in order, returning the first non-empty result
#[must_use]
pub fn first_match(lines: &[&str], strategies: &[LineStrategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(lines))
}

/// Everything after the first colon of the first line containing one of
/// `needles`, skipping lines whose value is blank
#[must_use]
pub fn property_value(lines: &[&str], needles: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter(|line| needles.iter().any(|needle| line.contains(needle)))
        .filter_map(|line| line.split_once(':').map(|(_, value)| value.trim()))
        .find(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[must_use]
pub fn recipient_line(lines: &[&str]) -> Option<String> {
    property_value(lines, &["To:"])
}

#[must_use]
pub fn sender_line(lines: &[&str]) -> Option<String> {
    property_value(lines, &["From:"])
}

#[must_use]
pub fn subject_line(lines: &[&str]) -> Option<String> {
    property_value(lines, &["Subject:"])
}

/// The first `filename="..."` attachment token, used as a surrogate subject
#[must_use]
pub fn attachment_filename(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter_map(|line| ATTACHMENT_FILENAME_REGEX.captures(line))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|name| !name.is_empty())
}

/// The value of a calendar `SUMMARY` property
#[must_use]
pub fn calendar_summary(lines: &[&str]) -> Option<String> {
    property_value(lines, &["SUMMARY"])
}

/// The address of a calendar `ORGANIZER`, the closest thing a calendar item
/// has to a sender
#[must_use]
pub fn calendar_organizer(lines: &[&str]) -> Option<String> {
    property_value(lines, &["ORGANIZER"])
}

/// Date-like properties: mail `Date:`, Outlook `Sent: ` and calendar `DTSTART`
#[must_use]
pub fn date_property(lines: &[&str]) -> Option<String> {
    property_value(lines, &["Date:", "Sent: ", "DTSTART"])
}

/// Receive-header style date: the second line of the file, from its first
/// day-of-week token to the end of the line
#[must_use]
pub fn receive_header_date(lines: &[&str]) -> Option<String> {
    let second_line = lines.get(1)?;

    let start = DAYS_OF_WEEK
        .iter()
        .filter_map(|dow| second_line.find(dow))
        .min()?;

    Some(second_line[start..].trim_end().to_string())
}
