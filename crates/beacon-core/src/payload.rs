//! Payload building for tracking requests.
//!
//! A tracking payload is an ordered set of named parameters rendered either
//! as a `?`-prefixed percent-encoded query string (the GET wire format, and
//! the inner strings of the batched POST envelope) or as a single JSON
//! object (the single-request POST wire format).

use crate::vars::CustomVariables;
use std::fmt::Write as _;

/// HTTP method preference for delivering tracking requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

/// Output format of a [`PayloadBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFormat {
    /// `?`-prefixed, `&`-joined `key=value` pairs with percent-encoded values.
    Url,
    /// A single JSON object `{"key":value, ...}`.
    Json,
}

/// Ordered accumulation of tracking parameters.
///
/// Parameters render in insertion order. String values are percent-encoded
/// in URL format and JSON-escaped in JSON format; numeric values are written
/// verbatim in both.
#[derive(Debug)]
pub struct PayloadBuilder {
    format: QueryFormat,
    buf: String,
    items: usize,
}

impl PayloadBuilder {
    pub fn new(format: QueryFormat) -> Self {
        Self {
            format,
            buf: String::new(),
            items: 0,
        }
    }

    fn prefix(&mut self) {
        let sep = match (self.format, self.items) {
            (QueryFormat::Url, 0) => "?",
            (QueryFormat::Url, _) => "&",
            (QueryFormat::Json, 0) => "{",
            (QueryFormat::Json, _) => ",",
        };
        self.buf.push_str(sep);
        self.items += 1;
    }

    fn name(&mut self, name: &str) {
        match self.format {
            QueryFormat::Url => {
                self.buf.push_str(name);
                self.buf.push('=');
            }
            QueryFormat::Json => {
                self.buf.push('"');
                self.buf.push_str(name);
                self.buf.push_str("\":");
            }
        }
    }

    /// Append a string parameter.
    pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
        self.prefix();
        self.name(name);
        match self.format {
            QueryFormat::Url => {
                for piece in url::form_urlencoded::byte_serialize(value.as_bytes()) {
                    self.buf.push_str(piece);
                }
            }
            QueryFormat::Json => {
                // serde_json renders the surrounding quotes and all escapes
                let encoded =
                    serde_json::to_string(value).expect("string serialization is infallible");
                self.buf.push_str(&encoded);
            }
        }
        self
    }

    /// Append an integer parameter.
    pub fn integer(&mut self, name: &str, value: i64) -> &mut Self {
        self.prefix();
        self.name(name);
        let _ = write!(self.buf, "{value}");
        self
    }

    /// Append a float parameter.
    pub fn float(&mut self, name: &str, value: f64) -> &mut Self {
        self.prefix();
        self.name(name);
        let _ = write!(self.buf, "{value}");
        self
    }

    /// Append a custom variable set.
    ///
    /// The set renders as `{"1":["name","value"],...}` with 1-based slot
    /// numbers; in URL format the whole JSON fragment is percent-encoded.
    pub fn variables(&mut self, name: &str, vars: &CustomVariables) -> &mut Self {
        let mut json = String::from("{");
        for (n, (slot, var)) in vars.entries().enumerate() {
            if n > 0 {
                json.push(',');
            }
            let _ = write!(
                json,
                "\"{slot}\":[{},{}]",
                serde_json::to_string(&var.name).expect("string serialization is infallible"),
                serde_json::to_string(&var.value).expect("string serialization is infallible"),
            );
        }
        json.push('}');

        self.prefix();
        self.name(name);
        match self.format {
            QueryFormat::Url => {
                for piece in url::form_urlencoded::byte_serialize(json.as_bytes()) {
                    self.buf.push_str(piece);
                }
            }
            QueryFormat::Json => self.buf.push_str(&json),
        }
        self
    }

    /// Number of parameters appended so far.
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Render the accumulated payload.
    pub fn finish(self) -> String {
        match self.format {
            QueryFormat::Url => self.buf,
            QueryFormat::Json if self.items == 0 => "{}".to_string(),
            QueryFormat::Json => {
                let mut buf = self.buf;
                buf.push('}');
                buf
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_format_renders_query_string() {
        let mut b = PayloadBuilder::new(QueryFormat::Url);
        b.integer("idsite", 7)
            .string("url", "https://example.org/a b")
            .integer("rec", 1);
        assert_eq!(
            b.finish(),
            "?idsite=7&url=https%3A%2F%2Fexample.org%2Fa+b&rec=1"
        );
    }

    #[test]
    fn json_format_renders_object() {
        let mut b = PayloadBuilder::new(QueryFormat::Json);
        b.integer("idsite", 7)
            .string("action_name", "Help / \"Feedback\"")
            .float("revenue", 12.5);
        assert_eq!(
            b.finish(),
            "{\"idsite\":7,\"action_name\":\"Help / \\\"Feedback\\\"\",\"revenue\":12.5}"
        );
    }

    #[test]
    fn empty_json_payload_renders_braces() {
        assert_eq!(PayloadBuilder::new(QueryFormat::Json).finish(), "{}");
        assert_eq!(PayloadBuilder::new(QueryFormat::Url).finish(), "");
    }

    #[test]
    fn variables_render_one_based_slots() {
        let mut vars = CustomVariables::new();
        vars.set_at(1, "browser", "firefox");
        vars.set_at(3, "plan", "pro");

        let mut b = PayloadBuilder::new(QueryFormat::Json);
        b.variables("_cvar", &vars);
        assert_eq!(
            b.finish(),
            "{\"_cvar\":{\"1\":[\"browser\",\"firefox\"],\"3\":[\"plan\",\"pro\"]}}"
        );
    }

    #[test]
    fn variables_are_percent_encoded_in_url_format() {
        let mut vars = CustomVariables::new();
        vars.set("k", "v");

        let mut b = PayloadBuilder::new(QueryFormat::Url);
        b.variables("cvar", &vars);
        assert_eq!(b.finish(), "?cvar=%7B%221%22%3A%5B%22k%22%2C%22v%22%5D%7D");
    }

    #[test]
    fn default_method_is_post() {
        assert_eq!(Method::default(), Method::Post);
    }
}
