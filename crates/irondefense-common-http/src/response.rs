//! Response classification.
//!
//! IronAPI answers with JSON, but a proxy between the connector and the
//! API will happily answer with an HTML error page, and some endpoints
//! answer a bare 200. The `Content-Type` header decides which branch
//! applies; the HTML branch is always an error regardless of status.

use crate::client::HttpResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Shown when an HTML error page has no extractable text.
pub const UNPARSEABLE_HTML: &str = "Cannot parse error details";

static HIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("valid regex"));
static BREAKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|title|head|center|pre|table)\s*>").expect("valid regex")
});
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Response classification errors. The display strings are what an
/// analyst sees as the action failure message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error("Unable to parse JSON response. Error: {message}")]
    InvalidJson { message: String },

    #[error("Error from server. Status Code: {status} Data from server: {body}")]
    Server { status: u16, body: String },

    #[error("Status Code: {status}. Data from server:\n{text}\n")]
    Html { status: u16, text: String },

    #[error("Empty response and no information in the header")]
    Empty { status: u16 },

    #[error("Can't process response from server. Status Code: {status} Data from server: {body}")]
    Unprocessable { status: u16, body: String },
}

impl ResponseError {
    /// Status code of the response that caused the error, if it was parsed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidJson { .. } => None,
            Self::Server { status, .. }
            | Self::Html { status, .. }
            | Self::Empty { status }
            | Self::Unprocessable { status, .. } => Some(*status),
        }
    }
}

/// Classify a response into a JSON payload or an error.
pub fn classify_response(response: &HttpResponse) -> Result<Value, ResponseError> {
    let content_type = response.content_type.to_ascii_lowercase();

    if content_type.contains("json") {
        let value: Value =
            serde_json::from_str(&response.body).map_err(|e| ResponseError::InvalidJson {
                message: e.to_string(),
            })?;
        if (200..399).contains(&response.status) {
            return Ok(value);
        }
        return Err(ResponseError::Server {
            status: response.status,
            body: response.body.clone(),
        });
    }

    if content_type.contains("html") {
        let text = html_to_text(&response.body).unwrap_or_else(|| UNPARSEABLE_HTML.to_string());
        return Err(ResponseError::Html {
            status: response.status,
            text,
        });
    }

    if response.body.is_empty() {
        if response.status == 200 {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        return Err(ResponseError::Empty {
            status: response.status,
        });
    }

    Err(ResponseError::Unprocessable {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Extract the visible text of an HTML page, one non-blank line per line.
///
/// Returns `None` when nothing readable is left.
pub fn html_to_text(html: &str) -> Option<String> {
    let text = HIDDEN.replace_all(html, "");
    let text = BREAKS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = decode_entities(&text);

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
