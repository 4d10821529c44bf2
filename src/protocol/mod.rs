// Protocol module - TeamCity service message encoding
//
// Wire grammar: `##teamcity[<kind> <k1>='<v1>' <k2>='<v2>' ...]` plus a newline.

pub mod escape;

pub use escape::{AttrValue, EscapeMode, Escaped, escape, unescape};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::event::CanonicalEvent;

/// Literal prefix of every service message
pub const MARKER: &str = "##teamcity[";

/// Timestamp layout TeamCity accepts on the `timestamp` attribute
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Which message kind carries `StdOut` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdOutStyle {
    /// `testStdOut name='..' out='..'`
    #[default]
    TestStdOut,
    /// `message name='..' text='..'`, shown out-of-band in the build log
    Message,
}

impl std::str::FromStr for StdOutStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test_std_out" | "testStdOut" => Ok(Self::TestStdOut),
            "message" => Ok(Self::Message),
            other => Err(format!(
                "unknown stdout style '{}' (expected testStdOut or message)",
                other
            )),
        }
    }
}

/// One service message before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    kind: &'static str,
    attributes: Vec<(&'static str, AttrValue)>,
}

impl ServiceMessage {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    /// Append an attribute; order of calls is the order on the wire
    pub fn attr(mut self, key: &'static str, value: impl Into<AttrValue>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    /// Append an attribute only when a value is present
    pub fn attr_opt(self, key: &'static str, value: Option<impl Into<AttrValue>>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn attributes(&self) -> &[(&'static str, AttrValue)] {
        &self.attributes
    }

    /// Map a canonical event onto its message kind and attributes
    pub fn from_event(event: &CanonicalEvent, stdout_style: StdOutStyle) -> Self {
        match event {
            CanonicalEvent::SuiteStarted {
                name,
                location_hint,
            } => Self::new("testSuiteStarted")
                .attr("name", name.as_str())
                .attr_opt("locationHint", location_hint.as_deref()),
            CanonicalEvent::SuiteFinished {
                name,
                location_hint,
            } => Self::new("testSuiteFinished")
                .attr("name", name.as_str())
                .attr_opt("locationHint", location_hint.as_deref()),
            CanonicalEvent::TestStarted {
                name,
                location_hint,
                capture_output,
            } => Self::new("testStarted")
                .attr("name", name.as_str())
                .attr_opt("locationHint", location_hint.as_deref())
                .attr_opt("captureStandardOutput", capture_output.then_some("true")),
            CanonicalEvent::TestFinished { name } => {
                Self::new("testFinished").attr("name", name.as_str())
            }
            CanonicalEvent::TestFailed { name, message } => Self::new("testFailed")
                .attr("name", name.as_str())
                .attr_opt("message", message.as_deref()),
            CanonicalEvent::TestIgnored { name } => {
                Self::new("testIgnored").attr("name", name.as_str())
            }
            CanonicalEvent::StdOut { name, text } => match stdout_style {
                StdOutStyle::TestStdOut => Self::new("testStdOut")
                    .attr("name", name.as_str())
                    .attr("out", text.as_str()),
                StdOutStyle::Message => Self::new("message")
                    .attr("name", name.as_str())
                    .attr("text", text.as_str()),
            },
            CanonicalEvent::StdErr { name, text } => Self::new("testStdErr")
                .attr("name", name.as_str())
                .attr("out", text.as_str()),
        }
    }
}

/// Encoder settings, fixed for the lifetime of one encoder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    pub escape: EscapeMode,
    /// Emit `\n` before every marker
    pub leading_newline: bool,
    pub stdout_style: StdOutStyle,
    /// Appended as `flowId` after the supplied attributes
    pub flow_id: Option<String>,
    /// Append a `timestamp` attribute after the supplied attributes
    pub timestamps: bool,
}

/// Renders canonical events to wire lines
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Render one canonical event as one newline-terminated line
    pub fn encode(&self, event: &CanonicalEvent) -> String {
        self.render(&ServiceMessage::from_event(event, self.options.stdout_style))
    }

    /// Render a prepared message, attributes in the order supplied
    pub fn render(&self, message: &ServiceMessage) -> String {
        let mut line = String::new();
        if self.options.leading_newline {
            line.push('\n');
        }
        line.push_str(MARKER);
        line.push_str(message.kind());

        for (key, value) in message.attributes() {
            push_attr(&mut line, key, value.escape(self.options.escape).as_str());
        }

        if let Some(flow_id) = &self.options.flow_id {
            push_attr(
                &mut line,
                "flowId",
                escape(self.options.escape, flow_id).as_str(),
            );
        }

        if self.options.timestamps {
            let now = Local::now().format(TIMESTAMP_FORMAT).to_string();
            push_attr(&mut line, "timestamp", &now);
        }

        line.push_str("]\n");
        line
    }
}

fn push_attr(line: &mut String, key: &str, value: &str) {
    line.push(' ');
    line.push_str(key);
    line.push_str("='");
    line.push_str(value);
    line.push('\'');
}

/// A service message read back from the wire, values unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl ParsedMessage {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse one wire line, with or without a leading newline.
///
/// Returns `None` when the line is not a well-formed service message.
pub fn parse_line(line: &str, mode: EscapeMode) -> Option<ParsedMessage> {
    let body = line
        .trim_start_matches(['\n', '\r'])
        .trim_end_matches(['\n', '\r'])
        .strip_prefix(MARKER)?;

    let kind_end = body.find([' ', ']'])?;
    let kind = &body[..kind_end];
    if kind.is_empty() {
        return None;
    }

    let mut rest = &body[kind_end..];
    let mut attributes = Vec::new();
    loop {
        rest = rest.trim_start_matches(' ');
        if rest == "]" {
            break;
        }
        let eq = rest.find("='")?;
        let key = &rest[..eq];
        if key.is_empty() || key.contains(' ') {
            return None;
        }
        let value_start = eq + 2;
        let value_len = closing_quote(&rest[value_start..], mode)?;
        let raw = &rest[value_start..value_start + value_len];
        attributes.push((key.to_string(), unescape(mode, raw)?));
        rest = &rest[value_start + value_len + 1..];
    }

    Some(ParsedMessage {
        kind: kind.to_string(),
        attributes,
    })
}

/// Byte offset of the apostrophe closing a value
fn closing_quote(value: &str, mode: EscapeMode) -> Option<usize> {
    let mut iter = value.char_indices();
    while let Some((idx, ch)) = iter.next() {
        match ch {
            '|' if mode == EscapeMode::TeamCity => {
                iter.next()?;
            }
            '\'' => return Some(idx),
            _ => {}
        }
    }
    None
}
