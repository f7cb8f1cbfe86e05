//! Response rendering.
//!
//! # Responsibilities
//! - Copy allow-listed upstream headers to the client response
//! - Commit the upstream status code
//! - Rewrite a JSON body through the response interceptor, or stream the
//!   upstream body through untouched
//!
//! # Design Decisions
//! - Header transfer happens strictly before the status is committed
//! - The JSON path buffers the whole body; the passthrough path never does
//! - Errors after the status is committed are still returned, but the client
//!   has already seen the upstream status

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response};
use flate2::read::GzDecoder;

use crate::encoder::json::{decode_first, encode_line, JSON_CONTENT_TYPE};
use crate::encoder::limits::read_to_end;
use crate::error::ForwardResult;
use crate::http::sink::ResponseSink;
use crate::proxy::options::EffectiveOptions;

/// Write an upstream response into `sink`.
pub async fn render<S>(
    response: Response<Body>,
    sink: &mut S,
    options: &EffectiveOptions,
) -> ForwardResult<()>
where
    S: ResponseSink + ?Sized,
{
    let (parts, body) = response.into_parts();

    transfer_headers(&parts.headers, sink.headers_mut(), options);
    sink.write_status(parts.status);

    if options.interceptors.response_json.is_some() {
        return render_json(&parts.headers, body, sink, options).await;
    }

    let out = sink.headers_mut();
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    out.insert(header::CONTENT_TYPE, content_type);
    if let Some(length) = parts.headers.get(header::CONTENT_LENGTH).filter(|v| !v.is_empty()) {
        out.insert(header::CONTENT_LENGTH, length.clone());
    }
    if let Some(encoding) = parts.headers.get(header::CONTENT_ENCODING) {
        out.insert(header::CONTENT_ENCODING, encoding.clone());
    }

    tracing::debug!(status = %parts.status, "Streaming upstream body");
    sink.write_body(body).await
}

/// Append every value of each allow-listed header.
fn transfer_headers(upstream: &HeaderMap, out: &mut HeaderMap, options: &EffectiveOptions) {
    for name in &options.transfer_response_headers {
        for value in upstream.get_all(name) {
            out.append(name.clone(), value.clone());
        }
    }
}

async fn render_json<S>(
    upstream: &HeaderMap,
    body: Body,
    sink: &mut S,
    options: &EffectiveOptions,
) -> ForwardResult<()>
where
    S: ResponseSink + ?Sized,
{
    let gzipped = upstream
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"));

    let bytes = read_to_end(body).await?;
    let value = if gzipped {
        decode_first(GzDecoder::new(bytes.as_ref()))?
    } else {
        decode_first(bytes.as_ref())?
    };

    let rewritten = encode_line(&options.interceptors.apply_response_json(value))?;

    let out = sink.headers_mut();
    out.remove(header::CONTENT_ENCODING);
    out.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    out.insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));

    tracing::debug!(gzipped, bytes = rewritten.len(), "Rewrote upstream JSON body");
    sink.write_body(Body::from(rewritten)).await
}
