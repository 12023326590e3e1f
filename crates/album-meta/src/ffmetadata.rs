//! Codec for ffmpeg's metadata dump format (`-f ffmetadata`).
//!
//! The file starts with a fixed identifier line followed by `key=value` lines.
//! ffmpeg escapes `=`, `;`, `#`, `\` and newline with a backslash, and an
//! escaped newline continues the value on the next physical line.

use std::collections::BTreeMap;

/// First line of every ffmetadata file.
pub const HEADER: &str = ";FFMETADATA1";

/// Tags of one track, keyed by tag name.
pub type TagMap = BTreeMap<String, String>;

const ESCAPED: [char; 5] = ['=', ';', '#', '\\', '\n'];

/// Parse the global section of an ffmetadata dump.
///
/// Malformed lines (no `=`, empty key) are skipped. Parsing stops at the first
/// section header such as `[CHAPTER]` or `[STREAM]`.
pub fn parse(text: &str) -> TagMap {
    let mut tags = TagMap::new();
    for line in logical_lines(text) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line == HEADER {
            continue;
        }
        if line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            break;
        }
        let Some((key, value)) = split_entry(line) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        tags.insert(key, value);
    }
    tags
}

/// Serialize `key=value` pairs, in iteration order, behind the header line.
pub fn serialize<I, K, V>(entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::from(HEADER);
    out.push('\n');
    for (key, value) in entries {
        escape_into(&mut out, key.as_ref());
        out.push('=');
        escape_into(&mut out, value.as_ref());
        out.push('\n');
    }
    out
}

/// Serialize a whole tag map.
pub fn serialize_map(tags: &TagMap) -> String {
    serialize(tags.iter())
}

/// Split on newlines that are not escaped.
fn logical_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\n' => {
                lines.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Split a line at its first unescaped `=`, unescaping both halves.
fn split_entry(line: &str) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = line.chars();
    loop {
        match chars.next()? {
            '\\' => {
                if let Some(ch) = chars.next() {
                    key.push(ch);
                }
            }
            '=' => break,
            ch => key.push(ch),
        }
    }
    Some((key, unescape(chars.as_str())))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        if ESCAPED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> TagMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_skips_header_and_blank_lines() {
        let text = ";FFMETADATA1\nartist=Boards of Canada\n\nalbum=Geogaddi\ntrack=3\n";
        let tags = parse(text);
        assert_eq!(
            tags,
            map(&[
                ("artist", "Boards of Canada"),
                ("album", "Geogaddi"),
                ("track", "3")
            ])
        );
    }

    #[test]
    fn parse_splits_on_first_equals_only() {
        let tags = parse(";FFMETADATA1\ncomment=a=b=c\n");
        assert_eq!(tags.get("comment").map(String::as_str), Some("a=b=c"));
    }

    #[test]
    fn parse_ignores_malformed_lines() {
        let tags = parse(";FFMETADATA1\nno separator here\n=orphan value\ntitle=Ok\n");
        assert_eq!(tags, map(&[("title", "Ok")]));
    }

    #[test]
    fn parse_accepts_crlf_and_missing_trailing_newline() {
        let tags = parse(";FFMETADATA1\r\nartist=Low\r\ntitle=Words");
        assert_eq!(tags, map(&[("artist", "Low"), ("title", "Words")]));
    }

    #[test]
    fn parse_unescapes_special_characters() {
        let text = ";FFMETADATA1\ntitle=Who\\=What\\; Part \\#2\nlyrics=line one\\\nline two\n";
        let tags = parse(text);
        assert_eq!(tags.get("title").map(String::as_str), Some("Who=What; Part #2"));
        assert_eq!(
            tags.get("lyrics").map(String::as_str),
            Some("line one\nline two")
        );
    }

    #[test]
    fn parse_stops_at_first_section() {
        let text = ";FFMETADATA1\ntitle=Intro\n[CHAPTER]\nTIMEBASE=1/1000\nSTART=0\ntitle=Chapter 1\n";
        let tags = parse(text);
        assert_eq!(tags, map(&[("title", "Intro")]));
    }

    #[test]
    fn parse_skips_comments() {
        let tags = parse(";FFMETADATA1\n# generated\n;another\ngenre=Ambient\n");
        assert_eq!(tags, map(&[("genre", "Ambient")]));
    }

    #[test]
    fn serialize_writes_header_and_terminated_lines() {
        let text = serialize([("artist", "Low"), ("track", "01")]);
        assert_eq!(text, ";FFMETADATA1\nartist=Low\ntrack=01\n");
    }

    #[test]
    fn serialize_of_empty_map_is_header_only() {
        assert_eq!(serialize_map(&TagMap::new()), ";FFMETADATA1\n");
    }

    #[test]
    fn serialize_escapes_special_characters() {
        let text = serialize([("title", "a=b;c#d\\e")]);
        assert_eq!(text, ";FFMETADATA1\ntitle=a\\=b\\;c\\#d\\\\e\n");
    }

    #[test]
    fn parse_inverts_serialize() {
        let tags = map(&[
            ("album", "Music Has the Right to Children"),
            ("artist", "Boards of Canada"),
            ("date", "1998"),
            ("encoder", "Lavf60.3.100"),
            ("title", "Roygbiv"),
            ("track", "7/18"),
        ]);
        let text = serialize_map(&tags);
        assert_eq!(parse(&text), tags);
        assert_eq!(serialize_map(&parse(&text)), text);
    }

    #[test]
    fn escaped_values_survive_round_trip() {
        let tags = map(&[("title", "x=y; #1 \\ end"), ("lyrics", "one\ntwo")]);
        assert_eq!(parse(&serialize_map(&tags)), tags);
    }
}
