use core::fmt;
use std::collections::BTreeMap;

use crate::request::HeadError;

/// Request headers keyed by lowercased field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a field, folding repeated names into one comma separated value.
    pub fn append(&mut self, k: &str, v: &str) {
        self.0
            .entry(k.to_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(v);
            })
            .or_insert_with(|| v.to_string());
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k.to_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses one header line (line ending already stripped).
    ///
    /// Returns `None` for the blank line that terminates the head.
    pub fn parse_line(line: &str) -> Result<Option<(String, String)>, HeadError> {
        let raw_header = line.trim();
        if raw_header.is_empty() {
            return Ok(None);
        }
        let Some((field_name, field_value)) = raw_header.split_once(':') else {
            return Err(HeadError::Malformed(format!("no ':' in header line: {raw_header}")));
        };
        if field_name.trim_end() != field_name {
            return Err(HeadError::Malformed(format!(
                "field name included invalid whitespace: '{raw_header}'"
            )));
        }
        if !is_token(field_name) {
            return Err(HeadError::Malformed(format!(
                "invalid characters in field name: '{field_name}'"
            )));
        }
        Ok(Some((field_name.to_lowercase(), field_value.trim().to_string())))
    }
}

/// RFC 9110 `token`: what field names and methods are made of.
pub(crate) fn is_token(s: &str) -> bool {
    const SPECIAL: [char; 15] = [
        '!', '#', '$', '%', '&', '\'', '*', '+', '-', '.', '^', '_', '`', '|', '~',
    ];
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || SPECIAL.contains(&c))
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (k, v) in self.iter() {
            write!(f, "{k}: {v}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_lines() {
        let test_data = [
            "Host: localhost:7001",
            "       Host : localhost:7001       ", // invalid space
            "  Content-Type:   text/plain",
            "HÂ©st: localhost:7001", // invalid character
            "Host localhost:7001",   // missing ':'
            "",
            "X-Empty:",
        ];
        let expected = [
            Some(("host", "localhost:7001")),
            None, // err placeholder
            Some(("content-type", "text/plain")),
            None, // err placeholder
            None, // err placeholder
            None,
            Some(("x-empty", "")),
        ];

        for (i, line) in test_data.iter().enumerate() {
            let result = Headers::parse_line(line);
            if [1, 3, 4].contains(&i) {
                assert!(matches!(result, Err(HeadError::Malformed(_))), "line {i}: {result:?}");
            } else {
                let parsed = result.unwrap();
                let parsed = parsed.as_ref().map(|(k, v)| (k.as_str(), v.as_str()));
                assert_eq!(expected[i], parsed, "line {i}");
            }
        }
    }

    #[test]
    fn repeated_fields_are_folded() {
        let mut headers = Headers::new();
        headers.append("Set-Person", "lane-loves-go");
        headers.append("set-person", "prime-loves-zig");
        headers.append("SET-PERSON", "tj-loves-ocaml");
        headers.append("Host", "localhost");

        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("Set-Person").map(String::as_str),
            Some("lane-loves-go, prime-loves-zig, tj-loves-ocaml")
        );
        assert_eq!(
            headers.to_string(),
            "host: localhost\r\nset-person: lane-loves-go, prime-loves-zig, tj-loves-ocaml\r\n"
        );
    }
}
