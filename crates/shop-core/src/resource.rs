//! # Downloadable Resources
//!
//! The shop sells exactly one static file. Every resource index a grant
//! covers resolves to it.

use serde::Serialize;

/// A static downloadable file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Filename offered in the `Content-Disposition` header
    pub filename: &'static str,

    /// MIME type
    pub content_type: &'static str,

    /// File contents
    #[serde(skip)]
    pub body: &'static [u8],
}

impl Resource {
    /// `Content-Disposition` header value for an attachment download
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Size of the file in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the file is empty
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// PDF header stub served to every valid grant
pub const DEMO_PDF: Resource = Resource {
    filename: "demo.pdf",
    content_type: "application/pdf",
    body: b"%PDF-1.4\n%\xc4\xe5\xf2\xe5\xeb\xa7\xf3\xa0\xd0\xc4\xc6\n1 0 obj\n",
};
