//! `multipart/form-data` bodies.
//!
//! # Example
//!
//! ```
//! use ether_core::{Form, FormFile};
//!
//! let form = Form::new()
//!     .text("hello", "hi")
//!     .file("file1", FormFile::new("a.jpeg", vec![0xFF, 0xD8], "image/jpeg"));
//!
//! assert!(form.content_type().starts_with("multipart/form-data; boundary=Boundary-"));
//! let (_content_type, body) = form.into_body();
//! assert!(body.ends_with(b"--"));
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// A file attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    file_name: String,
    data: Bytes,
    mime_type: String,
}

impl FormFile {
    /// A file with an explicit MIME type.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        data: impl Into<Bytes>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// A file whose MIME type is guessed from the file name extension.
    #[must_use]
    pub fn guessed(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name);
        Self::new(file_name, data, mime_type)
    }

    /// File name sent in `Content-Disposition`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File contents.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// MIME type sent in the part's `Content-Type`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Value of a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text value.
    Text(String),
    /// File upload.
    File(FormFile),
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<FormFile> for FormValue {
    fn from(file: FormFile) -> Self {
        Self::File(file)
    }
}

/// A `multipart/form-data` form: field names mapped to [`FormValue`]s.
///
/// Field names are unique; setting a field twice replaces the first value.
/// Fields are written in insertion order, though servers must not rely on it.
#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<(String, FormValue)>,
    boundary: String,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Empty form with a random `Boundary-<uuid>` boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(format!("Boundary-{}", Uuid::new_v4().hyphenated()))
    }

    /// Empty form with a fixed boundary.
    ///
    /// The boundary must not appear in any field data.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Set a field, builder style.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a text field, builder style.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(name, FormValue::Text(value.into()))
    }

    /// Set a file field, builder style.
    #[must_use]
    pub fn file(self, name: impl Into<String>, file: FormFile) -> Self {
        self.field(name, FormValue::File(file))
    }

    /// Set a field, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Option<FormValue> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when the form has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Boundary token.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` header value: `multipart/form-data; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Consume into `(content type, body)`.
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        (self.content_type(), self.to_bytes())
    }

    /// Serialize the form body.
    ///
    /// The closing delimiter `--<boundary>--` is not followed by a CRLF.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();

        for (name, value) in &self.fields {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");
            buf.put_slice(b"Content-Disposition: form-data; name=\"");
            buf.put_slice(name.as_bytes());
            buf.put_slice(b"\"");

            match value {
                FormValue::Text(text) => {
                    buf.put_slice(b"\r\n\r\n");
                    buf.put_slice(text.as_bytes());
                }
                FormValue::File(file) => {
                    buf.put_slice(b"; filename=\"");
                    buf.put_slice(file.file_name.as_bytes());
                    buf.put_slice(b"\"\r\nContent-Type: ");
                    buf.put_slice(file.mime_type.as_bytes());
                    buf.put_slice(b"\r\n\r\n");
                    buf.put_slice(&file.data);
                }
            }
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--");

        buf.freeze()
    }
}
