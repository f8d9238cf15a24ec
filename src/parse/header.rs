//! `@key: value` header records
//!
//! A Plaine & Easie record set looks like:
//!
//! ```text
//! @clef:G-2
//! @keysig:bBE
//! @timesig:3/4
//! @data:'4C8DE{FG}/2A4-/
//! @end:
//! ```
//!
//! Reading stops at the `end` record or at end of input. Unknown keys and
//! malformed lines are skipped without complaint.

use std::io::{self, BufRead};

/// Parsed header values; an empty string means the record was absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub clef: String,
    pub key: String,
    pub keysig: String,
    pub timesig: String,
    pub alttimesig: String,
    /// The incipit itself
    pub data: String,
}

impl Header {
    /// Read records from a buffered reader until `@end` or end of input
    ///
    /// Lines are read as bytes; invalid UTF-8 (e.g. a Latin-1 `@key`) is
    /// replaced rather than rejected.
    pub fn read_from<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut header = Header::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.strip_suffix('\n').unwrap_or(&line);
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !header.apply_line(line) {
                break;
            }
        }
        Ok(header)
    }

    /// Same as [`Header::read_from`] for in-memory text
    pub fn parse_str(text: &str) -> Self {
        let mut header = Header::default();
        for line in text.lines() {
            if !header.apply_line(line) {
                break;
            }
        }
        header
    }

    /// Apply one line; returns `false` once the `end` record is reached
    fn apply_line(&mut self, line: &str) -> bool {
        let (key, value) = at_record_key_value(line);
        match key.as_str() {
            "end" => return false,
            "clef" => self.clef = value,
            "key" => self.key = value,
            "keysig" => self.keysig = value,
            "timesig" => self.timesig = value,
            "alttimesig" => self.alttimesig = value,
            "data" => self.data = value,
            _ => {}
        }
        true
    }
}

/// Split an `@key: value` record
///
/// Accepted forms: `@key: value`, `@key:value`, `@key :value`, `@ key : value`.
/// Whitespace inside the key is dropped. A line without the leading `@` or
/// without the `:` separator yields an empty key and value.
pub fn at_record_key_value(line: &str) -> (String, String) {
    let rest = line.trim_start();
    let Some(rest) = rest.strip_prefix('@') else {
        return (String::new(), String::new());
    };
    let Some((raw_key, raw_value)) = rest.split_once(':') else {
        return (String::new(), String::new());
    };

    let key: String = raw_key.chars().filter(|c| !c.is_whitespace()).collect();
    (key, trim_value(raw_value))
}

/// Trim surrounding whitespace; a single stray character left after a
/// trailing whitespace run is dropped together with the run
fn trim_value(raw: &str) -> String {
    let value = raw.trim();
    let bytes = value.as_bytes();
    let len = bytes.len();
    if len >= 3 && bytes[len - 2].is_ascii_whitespace() {
        return value[..len - 1].trim_end().to_string();
    }
    value.to_string()
}
