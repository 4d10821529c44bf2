// Attribute value escaping for service messages

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// How attribute values are made safe inside `'...'` delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// TeamCity's documented `|` escape sequences
    #[default]
    TeamCity,
    /// Apostrophe replaced with a double quote, nothing else touched.
    /// Lossy, kept for consumers that grew up on it.
    Legacy,
}

impl std::str::FromStr for EscapeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teamcity" => Ok(Self::TeamCity),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!(
                "unknown escape mode '{}' (expected teamcity or legacy)",
                other
            )),
        }
    }
}

impl std::fmt::Display for EscapeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TeamCity => f.write_str("teamcity"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// A value already in wire form. Never escaped a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped(String);

impl Escaped {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Escaped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute value as handed to the encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Raw(String),
    Escaped(Escaped),
}

impl AttrValue {
    /// Wire form of the value under `mode`
    pub fn escape(&self, mode: EscapeMode) -> Escaped {
        match self {
            AttrValue::Raw(raw) => escape(mode, raw),
            AttrValue::Escaped(escaped) => escaped.clone(),
        }
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Raw(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Raw(value.to_string())
    }
}

impl From<Escaped> for AttrValue {
    fn from(value: Escaped) -> Self {
        AttrValue::Escaped(value)
    }
}

/// Escape a raw value in a single pass
pub fn escape(mode: EscapeMode, raw: &str) -> Escaped {
    match mode {
        EscapeMode::Legacy => Escaped(raw.replace('\'', "\"")),
        EscapeMode::TeamCity => {
            let mut out = String::with_capacity(raw.len());
            for ch in raw.chars() {
                match ch {
                    '|' => out.push_str("||"),
                    '\'' => out.push_str("|'"),
                    '\n' => out.push_str("|n"),
                    '\r' => out.push_str("|r"),
                    '[' => out.push_str("|["),
                    ']' => out.push_str("|]"),
                    '\u{0085}' => out.push_str("|x"),
                    '\u{2028}' => out.push_str("|l"),
                    '\u{2029}' => out.push_str("|p"),
                    '\t' => out.push('\t'),
                    c if c.is_control() => {
                        let _ = write!(out, "|0x{:04x}", c as u32);
                    }
                    c => out.push(c),
                }
            }
            Escaped(out)
        }
    }
}

/// Reverse of [`escape`] for the TeamCity mode.
///
/// Returns `None` on a dangling or unknown escape sequence. Legacy values
/// cannot be reversed and come back unchanged.
pub fn unescape(mode: EscapeMode, value: &str) -> Option<String> {
    if mode == EscapeMode::Legacy {
        return Some(value.to_string());
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '|' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            '|' => out.push('|'),
            '\'' => out.push('\''),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            '[' => out.push('['),
            ']' => out.push(']'),
            'x' => out.push('\u{0085}'),
            'l' => out.push('\u{2028}'),
            'p' => out.push('\u{2029}'),
            '0' => {
                if chars.next()? != 'x' {
                    return None;
                }
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}
