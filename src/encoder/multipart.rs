//! Multipart form encoder.
//!
//! # Responsibilities
//! - Parse the inbound `multipart/form-data` body under `max_upload_size`
//! - Copy scalar field bytes verbatim and stream file parts into a fresh writer
//! - Let the multipart interceptor append parts before the body is finalized
//!
//! # Design Decisions
//! - Each inbound part is a scoped resource: it is read to the end and
//!   dropped before the next part is requested
//! - Any failure aborts the whole encode; nothing partial leaves this module
//! - Interceptor errors are logged, not propagated

use std::io::Write;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use multer::{Constraints, Field, Multipart, SizeLimit};

use crate::encoder::limits::check_declared_length;
use crate::encoder::multipart_writer::MultipartWriter;
use crate::encoder::{media_type, EncodedBody};
use crate::error::{ForwardError, ForwardResult};
use crate::proxy::options::EffectiveOptions;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

pub async fn encode(
    headers: &HeaderMap,
    body: Body,
    options: &EffectiveOptions,
) -> ForwardResult<EncodedBody> {
    let limit = options.max_upload_size;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| media_type(ct) == MULTIPART_FORM_DATA)
        .ok_or_else(|| ForwardError::Parse("request Content-Type isn't multipart/form-data".to_string()))?;
    let boundary = multer::parse_boundary(content_type).map_err(map_multer_error)?;

    check_declared_length(headers, limit)?;

    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(limit));
    let mut multipart = Multipart::with_constraints(body.into_data_stream(), boundary, constraints);
    let mut writer = MultipartWriter::new();
    let mut parts = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(map_multer_error)? {
        let Some(name) = field.name().filter(|n| !n.is_empty()).map(str::to_owned) else {
            continue;
        };

        match field.file_name().filter(|f| !f.is_empty()).map(str::to_owned) {
            Some(file_name) => copy_file(&mut writer, &name, &file_name, field).await?,
            None => {
                let value = field.bytes().await.map_err(map_multer_error)?;
                writer.create_form_field(&name)?.write_all(&value)?;
            }
        }
        parts += 1;
    }

    if let Some(hook) = &options.interceptors.request_multipart {
        if let Err(error) = hook(&mut writer) {
            tracing::warn!(error = %error, "Multipart interceptor failed; error not propagated");
        }
    }

    let content_type = HeaderValue::from_str(&writer.form_data_content_type())
        .map_err(|e| ForwardError::InvalidHeader(e.to_string()))?;
    let body = writer.finish();

    tracing::debug!(parts, bytes = body.len(), "Re-encoded multipart body");
    Ok(EncodedBody::new(Body::from(body), content_type))
}

/// Stream one uploaded file into a new file part. The inbound field is
/// released when this returns, on success or error.
async fn copy_file(
    writer: &mut MultipartWriter,
    name: &str,
    file_name: &str,
    mut field: Field<'static>,
) -> ForwardResult<()> {
    let mut part = writer.create_form_file(name, file_name)?;
    while let Some(chunk) = field.chunk().await.map_err(map_multer_error)? {
        part.write_all(&chunk)?;
    }
    Ok(())
}

fn map_multer_error(err: multer::Error) -> ForwardError {
    match err {
        multer::Error::StreamSizeExceeded { limit } | multer::Error::FieldSizeExceeded { limit, .. } => {
            ForwardError::SizeLimit { limit }
        }
        multer::Error::StreamReadFailed(source) => ForwardError::io(source),
        other => ForwardError::Parse(other.to_string()),
    }
}
