//! Compact header encoding for persisted responses
//!
//! The shared cache stores status and failure metadata in a single bounded
//! text column, formatted like the HTTP headers the poll endpoint emits:
//!
//! ```text
//! Task-Status=error;Task-Error-Type=std::io::error::Error;Task-Error-Message=disk full
//! ```
//!
//! Values escape `%`, `;` and `=` as `%25`, `%3B` and `%3D`. When the encoded
//! form would exceed [`MAX_ENCODED_HEADERS_LEN`] the error type and then the
//! error message are truncated on a character boundary.

use super::errors::{CacheError, CacheResult};
use crate::constants::{headers, MAX_ENCODED_HEADERS_LEN};
use crate::task::{TaskFailure, TaskStatus};

const PAIR_SEPARATOR: char = ';';
const KEY_VALUE_SEPARATOR: char = '=';

/// Status and failure metadata recovered from an encoded header string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHeaders {
    pub status: TaskStatus,
    pub failure: Option<TaskFailure>,
}

/// Encode a status and optional failure into the persisted header form
///
/// The result is never longer than [`MAX_ENCODED_HEADERS_LEN`] bytes.
pub fn encode(status: TaskStatus, failure: Option<&TaskFailure>) -> String {
    let mut encoded = format!("{}={}", headers::TASK_STATUS, status.as_str());

    if let Some(failure) = failure {
        let type_key = format!("{PAIR_SEPARATOR}{}=", headers::TASK_ERROR_TYPE);
        let message_key = format!("{PAIR_SEPARATOR}{}=", headers::TASK_ERROR_MESSAGE);

        let type_budget = MAX_ENCODED_HEADERS_LEN
            .saturating_sub(encoded.len() + type_key.len() + message_key.len());
        encoded.push_str(&type_key);
        encoded.push_str(&escape_within(&failure.error_type, type_budget));

        let message_budget =
            MAX_ENCODED_HEADERS_LEN.saturating_sub(encoded.len() + message_key.len());
        encoded.push_str(&message_key);
        encoded.push_str(&escape_within(&failure.error_message, message_budget));
    }

    encoded
}

/// Decode the persisted header form
///
/// Unknown keys are ignored. A missing or unrecognized status is reported as
/// [`CacheError::Corrupted`] against `handle`.
pub fn decode(encoded: &str, handle: &str) -> CacheResult<DecodedHeaders> {
    let mut status = None;
    let mut error_type = None;
    let mut error_message = None;

    for pair in encoded.split(PAIR_SEPARATOR).filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once(KEY_VALUE_SEPARATOR) else {
            continue;
        };
        let value = unescape(value);
        match key {
            headers::TASK_STATUS => {
                status = Some(value.parse::<TaskStatus>().map_err(|reason| {
                    CacheError::Corrupted {
                        handle: handle.to_string(),
                        reason,
                    }
                })?);
            }
            headers::TASK_ERROR_TYPE => error_type = Some(value),
            headers::TASK_ERROR_MESSAGE => error_message = Some(value),
            _ => {}
        }
    }

    let status = status.ok_or_else(|| CacheError::Corrupted {
        handle: handle.to_string(),
        reason: format!("missing {} in stored headers", headers::TASK_STATUS),
    })?;

    let failure = status.is_failure().then(|| {
        TaskFailure::new(
            error_type.unwrap_or_default(),
            error_message.unwrap_or_default(),
        )
    });

    Ok(DecodedHeaders { status, failure })
}

/// Escape a header value
pub fn escape(value: &str) -> String {
    escape_within(value, usize::MAX)
}

/// Escape as much of `value` as fits in `budget` bytes, never splitting a
/// character or an escape sequence
fn escape_within(value: &str, budget: usize) -> String {
    let mut escaped = String::with_capacity(value.len().min(budget));
    let mut buf = [0u8; 4];

    for ch in value.chars() {
        let piece: &str = match ch {
            '%' => "%25",
            ';' => "%3B",
            '=' => "%3D",
            other => other.encode_utf8(&mut buf),
        };
        if escaped.len() + piece.len() > budget {
            break;
        }
        escaped.push_str(piece);
    }

    escaped
}

/// Reverse [`escape`]; unrecognized sequences are kept verbatim
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(..3) {
            Some(seq) if seq.eq_ignore_ascii_case("%25") => Some('%'),
            Some(seq) if seq.eq_ignore_ascii_case("%3B") => Some(';'),
            Some(seq) if seq.eq_ignore_ascii_case("%3D") => Some('='),
            _ => None,
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out
}
