//! Raw encoder: streamed passthrough, or JSON rewrite when a request JSON
//! interceptor is configured.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};

use crate::encoder::json::{self, JSON_CONTENT_TYPE};
use crate::encoder::limits::read_to_end;
use crate::encoder::EncodedBody;
use crate::error::ForwardResult;
use crate::proxy::options::EffectiveOptions;

const OCTET_STREAM: &str = "application/octet-stream";

pub async fn encode(
    headers: &HeaderMap,
    body: Body,
    options: &EffectiveOptions,
) -> ForwardResult<EncodedBody> {
    if options.interceptors.request_json.is_some() {
        let bytes = read_to_end(body).await?;
        let value = json::decode_first(bytes.as_ref())?;
        let value = options.interceptors.apply_request_json(value);
        let buf = json::encode_line(&value)?;

        tracing::debug!(bytes = buf.len(), "Rewrote JSON request body");
        return Ok(EncodedBody::new(Body::from(buf), HeaderValue::from_static(JSON_CONTENT_TYPE)));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(OCTET_STREAM));

    Ok(EncodedBody::new(body, content_type))
}
