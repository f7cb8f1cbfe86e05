//! URL-encoded form encoder.
//!
//! # Responsibilities
//! - Parse the inbound body as `application/x-www-form-urlencoded`
//! - Rebuild the field set (multi-valued keys preserved)
//! - Apply the form interceptor and re-encode
//!
//! # Design Decisions
//! - Only POST/PUT/PATCH bodies with a form content type are parsed;
//!   anything else yields an empty field set
//! - Strict decoding: bad percent escapes and `;` separators are errors
//! - Field bytes are carried as-is; nothing is forced through UTF-8
//! - Encoding is sorted by key; values keep their encounter order

use std::collections::btree_map::{self, BTreeMap};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use percent_encoding::percent_decode;
use url::form_urlencoded::byte_serialize;

use crate::encoder::limits::{read_to_limit, Limited};
use crate::encoder::{media_type, EncodedBody};
use crate::error::{ForwardError, ForwardResult};
use crate::proxy::options::EffectiveOptions;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form fields: key → values, keys kept sorted. Keys and values are raw
/// bytes, so bodies that are not UTF-8 survive a re-encode unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<Vec<u8>, Vec<Vec<u8>>>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to `key`.
    pub fn add(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values of `key` with `value`.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// First value of `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.0.get(key.as_ref()).and_then(|v| v.first()).map(Vec::as_slice)
    }

    /// First value of `key`, if it is valid UTF-8.
    pub fn get_str(&self, key: impl AsRef<[u8]>) -> Option<&str> {
        self.get(key).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn get_all(&self, key: impl AsRef<[u8]>) -> &[Vec<u8>] {
        self.0.get(key.as_ref()).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<Vec<Vec<u8>>> {
        self.0.remove(key.as_ref())
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.0.contains_key(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Vec<u8>, Vec<Vec<u8>>> {
        self.0.iter()
    }

    /// Parse a url-encoded body.
    pub fn parse(input: &[u8]) -> ForwardResult<Self> {
        let mut form = Self::new();
        for segment in input.split(|b| *b == b'&') {
            if segment.is_empty() {
                continue;
            }
            validate_segment(segment)?;

            let (key, value) = match segment.iter().position(|b| *b == b'=') {
                Some(eq) => (&segment[..eq], &segment[eq + 1..]),
                None => (segment, &b""[..]),
            };
            form.add(unescape(key), unescape(value));
        }
        Ok(form)
    }

    /// Encode as `k=v&k=v`, sorted by key.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, values) in &self.0 {
            for value in values {
                if !out.is_empty() {
                    out.push('&');
                }
                out.extend(byte_serialize(key));
                out.push('=');
                out.extend(byte_serialize(value));
            }
        }
        out
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (key, value) in iter {
            form.add(key, value);
        }
        form
    }
}

impl IntoIterator for FormValues {
    type Item = (Vec<u8>, Vec<Vec<u8>>);
    type IntoIter = btree_map::IntoIter<Vec<u8>, Vec<Vec<u8>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Decode `+` and `%XX` escapes into raw bytes.
fn unescape(input: &[u8]) -> Vec<u8> {
    let plus_as_space: Vec<u8> = input
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&plus_as_space).collect()
}

fn validate_segment(segment: &[u8]) -> ForwardResult<()> {
    if segment.contains(&b';') {
        return Err(ForwardError::Parse("invalid semicolon separator in form body".to_string()));
    }

    let mut i = 0;
    while i < segment.len() {
        if segment[i] == b'%' {
            let escape = segment.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                let end = (i + 3).min(segment.len());
                return Err(ForwardError::Parse(format!(
                    "invalid URL escape \"{}\"",
                    String::from_utf8_lossy(&segment[i..end])
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn parses_body(method: &Method, headers: &HeaderMap) -> bool {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| media_type(ct) == FORM_CONTENT_TYPE)
}

pub async fn encode(
    method: &Method,
    headers: &HeaderMap,
    body: Body,
    options: &EffectiveOptions,
) -> ForwardResult<EncodedBody> {
    let parsed = if parses_body(method, headers) {
        match read_to_limit(body, options.max_form_size).await? {
            Limited::Complete(bytes) => FormValues::parse(&bytes)?,
            Limited::Exceeded => {
                return Err(ForwardError::Parse(format!(
                    "form body larger than {} bytes",
                    options.max_form_size
                )))
            }
        }
    } else {
        FormValues::new()
    };

    let mut form = FormValues::new();
    for (key, values) in parsed {
        for value in values {
            form.add(key.clone(), value);
        }
    }
    let form = options.interceptors.apply_request_form(form);

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(FORM_CONTENT_TYPE));

    let encoded = form.encode();
    tracing::debug!(fields = form.len(), bytes = encoded.len(), "Re-encoded form body");
    Ok(EncodedBody::new(Body::from(encoded), content_type))
}
