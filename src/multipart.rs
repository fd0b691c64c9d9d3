//! In-memory `multipart/form-data` encoding.
//!
//! reqwest's `multipart::Form` turns into a streaming body that can only be
//! sent once. Uploads must survive a retry, so forms are encoded up front
//! into a single buffer and sent as a buffered [`Body`](crate::Body).

use bytes::{BufMut, Bytes, BytesMut};

pub(crate) struct Form {
    boundary: String,
    buf: BytesMut,
}

impl Form {
    pub(crate) fn new() -> Self {
        Self::with_boundary(format!("langdock-{}", uuid::Uuid::new_v4().simple()))
    }

    fn with_boundary(boundary: String) -> Self {
        Self {
            boundary,
            buf: BytesMut::new(),
        }
    }

    pub(crate) fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
        self.open_part();
        self.buf.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape(name),
                escape(file_name)
            )
            .as_bytes(),
        );
        self.buf
            .put_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        self.buf.put_slice(content);
        self.buf.put_slice(b"\r\n");
        self
    }

    pub(crate) fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.buf.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape(name)
            )
            .as_bytes(),
        );
        self.buf.put_slice(value.as_bytes());
        self.buf.put_slice(b"\r\n");
        self
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub(crate) fn finish(mut self) -> Bytes {
        self.buf
            .put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buf.freeze()
    }

    fn open_part(&mut self) {
        self.buf
            .put_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}
