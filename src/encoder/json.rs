//! JSON decode/re-encode shared by the Raw encoder and the response renderer.

use std::io::Read;

use serde_json::Value;

use crate::error::{ForwardError, ForwardResult};

/// Content type of every re-encoded JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Decode exactly one JSON value from `reader`. Bytes after the first value are ignored.
pub fn decode_first<R: Read>(reader: R) -> ForwardResult<Value> {
    let mut values = serde_json::Deserializer::from_reader(reader).into_iter::<Value>();
    match values.next() {
        Some(value) => Ok(value?),
        None => Err(ForwardError::Decode("unexpected end of JSON input".to_string())),
    }
}

/// Encode `value` followed by a newline.
pub fn encode_line(value: &Value) -> ForwardResult<Vec<u8>> {
    let mut buf = serde_json::to_vec(value)?;
    buf.push(b'\n');
    Ok(buf)
}
