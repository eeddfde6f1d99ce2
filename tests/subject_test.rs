use eml_searchable::*;

const RESERVED: [char; 9] = [':', '/', '\\', '*', '?', '"', '<', '>', '|'];

fn assert_filename_safe(s: &str) {
    assert!(!s.is_empty());
    for c in s.chars() {
        assert!(!RESERVED.contains(&c), "{s:?} contains {c:?}");
        assert!(u32::from(c) > 31, "{s:?} contains control {:?}", c);
    }
}

// --- sanitize ---

#[test]
fn test_sanitize_never_leaves_reserved_or_control_chars() {
    let inputs = [
        "http://www.linkedin.com/share?viewLink=&sid=s799124597",
        "a\\b*c?d\"e<f>g|h:i/j",
        "tab\there\nnewline\r\nfolded",
        "\u{1}\u{2}\u{1f}bell\u{7}",
        "::::",
        "\"quoted\"",
        "RE: FW: Re[3]: deep",
        "",
        "   ",
        "\t\n",
        "Ã©tÃ©",
    ];

    for input in inputs {
        assert_filename_safe(&sanitize(input));
    }
}

#[test]
fn test_sanitize_url_subject() {
    assert_eq!(
        sanitize("http://www.linkedin.com/share?viewLink=&sid=s799124597"),
        "http---www.linkedin.com-share-viewLink=&sid=s799124597"
    );
}

#[test]
fn test_sanitize_quotes_become_apostrophes() {
    assert_eq!(sanitize("the \"big\" launch"), "the 'big' launch");
}

#[test]
fn test_sanitize_collapses_line_breaks() {
    assert_eq!(sanitize("Quarterly\r\n results\tfor Q3"), "Quarterly results for Q3");
}

#[test]
fn test_sanitize_repairs_e_acute() {
    assert_eq!(sanitize("bonne annÃ©e"), "bonne année");
}

#[test]
fn test_sanitize_drops_control_chars() {
    assert_eq!(sanitize("ab\u{1}c\u{1f}d"), "abcd");
}

#[test]
fn test_sanitize_empty_becomes_placeholder() {
    assert_eq!(sanitize(""), EMPTY_SUBJECT);
    assert_eq!(sanitize("\u{2}\u{3}"), "NoSubject");
    assert_eq!(sanitize("RE: "), "NoSubject");
}

#[test]
fn test_sanitize_keeps_placeholder_subject() {
    assert_eq!(sanitize(NO_SUBJECT), "No Subject");
}

// --- reply prefixes ---

#[test]
fn test_strip_reply_prefix() {
    assert_eq!(strip_reply_prefixes("RE: bonne année"), "bonne année");
    assert_eq!(strip_reply_prefixes("FW: budget"), "budget");
}

#[test]
fn test_strip_nested_prefixes() {
    assert_eq!(strip_reply_prefixes("Re: Fwd: re: Original"), "Original");
}

#[test]
fn test_strip_counted_reply_prefix() {
    assert_eq!(strip_reply_prefixes("Re[2]: Original"), "Original");
}

#[test]
fn test_strip_keeps_inner_markers() {
    assert_eq!(strip_reply_prefixes("Rules: RE: inside"), "Rules: RE: inside");
    assert_eq!(strip_reply_prefixes("Re[abc]: kept"), "Re[abc]: kept");
}

// --- encoded words ---

#[test]
fn test_decode_base64_word() {
    assert_eq!(
        decode_encoded_words("=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="),
        "Hola mundo"
    );
}

#[test]
fn test_decode_q_word() {
    assert_eq!(
        decode_encoded_words("=?ISO-8859-1?Q?bonne_ann=E9e?="),
        "bonne année"
    );
}

#[test]
fn test_decode_keeps_surrounding_text() {
    assert_eq!(
        decode_encoded_words("Re: =?utf-8?q?caf=C3=A9?= tomorrow"),
        "Re: café tomorrow"
    );
}

#[test]
fn test_decode_leaves_broken_word() {
    assert_eq!(decode_encoded_words("=?utf-8?B?%%%?="), "=?utf-8?B?%%%?=");
}

#[test]
fn test_decode_joins_character_split_across_words() {
    // "caf\xC3" + "\xA9 ok"
    assert_eq!(
        decode_encoded_words("=?UTF-8?B?Y2Fmww==?= =?UTF-8?B?qSBvaw==?="),
        "café ok"
    );
    assert_eq!(
        decode_encoded_words("=?utf-8?q?caf=C3?=\r\n =?UTF-8?Q?=A9_ok?="),
        "café ok"
    );
}

#[test]
fn test_decode_joins_split_cp932_character() {
    let original = "日本語";
    let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode(original);
    let q = |bytes: &[u8]| -> String { bytes.iter().map(|b| format!("={b:02X}")).collect() };
    let header = format!(
        "=?ISO-2022-JP?Q?{}?= =?Shift_JIS?Q?{}?=",
        q(&sjis[..3]),
        q(&sjis[3..])
    );

    assert_eq!(decode_encoded_words(&header), original);
}

#[test]
fn test_decode_keeps_replacement_for_truncated_character() {
    assert_eq!(decode_encoded_words("=?UTF-8?B?Y2Fmww==?="), "caf\u{fffd}");
}

#[test]
fn test_decode_different_charsets_decode_separately() {
    assert_eq!(
        decode_encoded_words("=?ISO-8859-1?Q?caf=E9?= =?UTF-8?Q?_cr=C3=A8me?="),
        "café crème"
    );
}

#[test]
fn test_decode_subject_end_to_end() {
    assert_eq!(
        decode_subject("RE: =?ISO-8859-1?Q?bonne_ann=E9e?="),
        "bonne année"
    );
}

#[test]
fn test_decode_plain_text_passthrough() {
    assert_eq!(decode_encoded_words("plain subject"), "plain subject");
}

// --- charsets ---

#[test]
fn test_japanese_labels_become_cp932() {
    for label in ["ISO-2022-JP", "iso-2022-jp-2", "Shift_JIS", "SJIS", "cp932", "UCS2"] {
        assert_eq!(charset_for_label(label), Some(encoding_rs::SHIFT_JIS), "{label}");
    }
}

#[test]
fn test_other_labels_resolve_normally() {
    assert_eq!(charset_for_label("utf-8"), Some(encoding_rs::UTF_8));
    assert_eq!(charset_for_label("big5"), Some(encoding_rs::BIG5));
    assert_eq!(charset_for_label("utf-8*en"), Some(encoding_rs::UTF_8));
    assert_eq!(charset_for_label("no-such-charset"), None);
}

#[test]
fn test_header_bytes_fall_back_to_single_byte() {
    assert_eq!(header_bytes_to_text("année".as_bytes()), "année");
    assert_eq!(header_bytes_to_text(b"ann\xe9e"), "année");
}

#[test]
fn test_decode_file_text_never_fails_for_mail() {
    let text = decode_file_text(b"Subject: \xff\xfe\x80", FileKind::Eml).unwrap();
    assert_eq!(text.chars().count(), 12);
}
