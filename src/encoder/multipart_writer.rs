//! Multipart form writer.
//!
//! Builds a `multipart/form-data` body in memory. Parts are appended in
//! call order; `finish` writes the closing delimiter.

use std::fmt::Write as _;
use std::io;

use axum::body::Bytes;
use rand::RngCore;

const BOUNDARY_SPECIALS: &str = "'()+_,-./:=? ";
const QUOTED_BOUNDARY_CHARS: &str = "()<>@,;:\\\"/[]?= ";

/// Writer for a multipart form body.
#[derive(Debug)]
pub struct MultipartWriter {
    buf: Vec<u8>,
    boundary: String,
    has_parts: bool,
}

/// Body of the part most recently created on a [`MultipartWriter`].
#[derive(Debug)]
pub struct Part<'a> {
    buf: &'a mut Vec<u8>,
}

impl io::Write for Part<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartWriter {
    /// Create a writer with a random boundary.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            boundary: random_boundary(),
            has_parts: false,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Override the boundary. Only allowed before the first part is written.
    pub fn set_boundary(&mut self, boundary: &str) -> io::Result<()> {
        if self.has_parts {
            return Err(invalid_input("cannot change boundary after a part was written"));
        }
        let valid_chars = boundary
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || BOUNDARY_SPECIALS.contains(c));
        if boundary.is_empty() || boundary.len() > 70 || boundary.ends_with(' ') || !valid_chars {
            return Err(invalid_input("invalid multipart boundary"));
        }
        self.boundary = boundary.to_string();
        Ok(())
    }

    /// `Content-Type` header value for the body this writer produces.
    pub fn form_data_content_type(&self) -> String {
        if self.boundary.chars().any(|c| QUOTED_BOUNDARY_CHARS.contains(c)) {
            format!("multipart/form-data; boundary=\"{}\"", self.boundary)
        } else {
            format!("multipart/form-data; boundary={}", self.boundary)
        }
    }

    /// Start a new part with the given headers and return its body writer.
    pub fn create_part(&mut self, headers: &[(&str, &str)]) -> io::Result<Part<'_>> {
        for (name, value) in headers {
            if name.is_empty() || has_line_break(name) || has_line_break(value) {
                return Err(invalid_input("invalid part header"));
            }
        }

        let mut head = String::new();
        if self.has_parts {
            head.push_str("\r\n");
        }
        let _ = write!(head, "--{}\r\n", self.boundary);
        for (name, value) in headers {
            let _ = write!(head, "{}: {}\r\n", name, value);
        }
        head.push_str("\r\n");

        self.buf.extend_from_slice(head.as_bytes());
        self.has_parts = true;
        Ok(Part { buf: &mut self.buf })
    }

    /// Start a file part for form field `field`.
    pub fn create_form_file(&mut self, field: &str, file_name: &str) -> io::Result<Part<'_>> {
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(field),
            escape_quotes(file_name)
        );
        self.create_part(&[
            ("Content-Disposition", disposition.as_str()),
            ("Content-Type", "application/octet-stream"),
        ])
    }

    /// Start a plain (non-file) part for form field `field`.
    pub fn create_form_field(&mut self, field: &str) -> io::Result<Part<'_>> {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(field));
        self.create_part(&[("Content-Disposition", disposition.as_str())])
    }

    pub fn write_field(&mut self, field: &str, value: &str) -> io::Result<()> {
        let mut part = self.create_form_field(field)?;
        io::Write::write_all(&mut part, value.as_bytes())
    }

    /// Write the closing delimiter and return the encoded body.
    pub fn finish(mut self) -> Bytes {
        let closing = format!("\r\n--{}--\r\n", self.boundary);
        self.buf.extend_from_slice(closing.as_bytes());
        Bytes::from(self.buf)
    }
}

fn random_boundary() -> String {
    let mut bytes = [0u8; 30];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(60), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}

fn invalid_input(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}
