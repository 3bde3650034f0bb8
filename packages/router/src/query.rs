//! Query string codec with type inference.
//!
//! Values decode to booleans, integers or strings. Encoding is the inverse for the values a url
//! can carry, so `{date: 20160101, staff: 2}` survives a trip through the address bar.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::route::{is_integer_literal, ParamValue, Query};

/// The characters `encodeURIComponent` escapes, plus `'`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Decode a query string (with or without its leading `?`).
///
/// Entries that do not contain exactly one `=` are skipped. A value that is not valid
/// percent-encoded UTF-8 decodes to an empty string; the entry is kept.
///
/// ```rust
/// # use distributed_router::{query, ParamValue};
/// let query = query::decode("date=20160101&staff=2&all=true&name=Joe+Bloggs");
/// assert_eq!(query["date"], ParamValue::Int(20160101));
/// assert_eq!(query["all"], ParamValue::Bool(true));
/// assert_eq!(query["name"], ParamValue::from("Joe Bloggs"));
/// ```
#[must_use]
pub fn decode(text: &str) -> Query {
    let text = text.strip_prefix('?').unwrap_or(text).replace('+', " ");

    let mut query = Query::new();
    for entry in text.split('&') {
        let mut parts = entry.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };

        let key = percent_decode_str(key).decode_utf8_lossy().into_owned();
        let value = match decode_component(value) {
            Some(value) => infer(value),
            None => ParamValue::Str(String::new()),
        };
        query.insert(key, value);
    }
    query
}

/// Encode a query mapping, in insertion order, without the leading `?`.
///
/// `?`, `#`, `/` and `'` are always escaped so the result can be dropped into any url.
///
/// ```rust
/// # use distributed_router::{query, ParamValue, Query};
/// let mut q = Query::new();
/// q.insert("firstname".into(), ParamValue::from("Joe"));
/// q.insert("path".into(), ParamValue::from("a/b?c"));
/// q.insert("blank".into(), ParamValue::from(""));
/// assert_eq!(query::encode(&q), "firstname=Joe&path=a%2Fb%3Fc&blank=");
/// ```
#[must_use]
pub fn encode(query: &Query) -> String {
    query
        .iter()
        .map(|(key, value)| {
            let key = utf8_percent_encode(key, COMPONENT);
            if value.is_empty() {
                format!("{key}=")
            } else {
                let value = value.to_string();
                format!("{key}={}", utf8_percent_encode(&value, COMPONENT))
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Strict percent-decoding: every `%` must start a two digit hex escape and the bytes must be
/// UTF-8.
fn decode_component(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    percent_decode_str(text)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn infer(value: String) -> ParamValue {
    match value.as_str() {
        "true" => ParamValue::Bool(true),
        "false" => ParamValue::Bool(false),
        text if is_integer_literal(text) => ParamValue::integer_or_text(text),
        _ => ParamValue::Str(value),
    }
}
