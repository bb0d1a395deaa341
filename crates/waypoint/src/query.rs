//! Query string encoding shared by outbound requests and inbound callbacks.
//!
//! Values are percent-encoded per RFC 3986 and decoded the same way. Unlike
//! `application/x-www-form-urlencoded`, a literal `+` is never treated as a space.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::collections::HashMap;

/// Everything but RFC 3986 unreserved characters is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Encodes `pairs` as `key=value` items joined by `&`, in iteration order.
pub fn encode<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.extend(utf8_percent_encode(key, COMPONENT));
        out.push('=');
        out.extend(utf8_percent_encode(value, COMPONENT));
    }
    out
}

/// Decodes a query string into a flat map.
///
/// The last value wins for repeated keys. Items without a `=` carry no value and are skipped,
/// `key=` yields an empty value. Items whose key or value does not decode to UTF-8 are skipped.
pub fn decode(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|item| item.split_once('='))
        .filter_map(|(key, value)| Some((decode_component(key)?, decode_component(value)?)))
        .collect()
}

fn decode_component(s: &str) -> Option<String> {
    percent_decode_str(s).decode_utf8().ok().map(|s| s.into_owned())
}
