use std::fmt::{self, Debug, Display, Formatter};
use std::path::PathBuf;

use derive_more::Display;

/// A set of errors that can occur while collecting a multipart form.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// The multipart decoder rejected the stream, or the underlying transport
    /// failed while it was being read.
    #[display(fmt = "failed to decode multipart stream: {}", _0)]
    Decode(multer::Error),

    /// The request carries no `Content-Type` header, or it is not valid text.
    #[display(fmt = "Content-Type header is missing")]
    MissingContentType,

    /// The `Content-Type` header is not `multipart/form-data`.
    #[display(fmt = "Content-Type is not multipart/form-data")]
    NoMultipart,

    /// Failed to convert the `Content-Type` to [`mime::Mime`] type.
    #[display(fmt = "Failed to convert Content-Type to `mime::Mime` type: {}", _0)]
    DecodeContentType(mime::FromStrError),

    /// No boundary found in `Content-Type` header.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    NoBoundary,

    /// More scalar fields arrived than
    /// [`max_fields`](crate::FormConfig::max_fields) allows.
    #[display(fmt = "too many fields received, the limit is {}", limit)]
    TooManyFields { limit: usize },

    /// The scalar field values together exceeded
    /// [`max_fields_size`](crate::FormConfig::max_fields_size).
    #[display(fmt = "fields exceeded the maximum size limit: {} bytes", limit)]
    FieldsSizeExceeded { limit: u64 },

    /// The uploaded files together exceeded
    /// [`max_file_size`](crate::FormConfig::max_file_size).
    #[display(
        fmt = "file '{}' exceeded the maximum upload size limit: {} bytes",
        field_name,
        limit
    )]
    FileSizeExceeded { limit: u64, field_name: String },

    /// The configured encoding label names no known charset.
    #[display(fmt = "unknown field encoding: {}", _0)]
    UnknownEncoding(String),

    /// Writing an uploaded part to its temporary file failed.
    #[display(fmt = "failed to write temporary file {}: {}", "path.display()", cause)]
    WriteTempFile { path: PathBuf, cause: std::io::Error },

    /// The event source stopped before signalling either completion or failure.
    #[display(fmt = "form events ended before the decoder finished")]
    EventsUnterminated,

    /// The configuration object holds an unknown key or a value of the wrong type.
    #[cfg(feature = "json")]
    #[display(fmt = "invalid form configuration: {}", _0)]
    InvalidConfig(serde_json::Error),
}

impl From<multer::Error> for Error {
    fn from(err: multer::Error) -> Self {
        Error::Decode(err)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
