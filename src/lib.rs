//! A `multipart/form-data` adapter for async request handlers.
//!
//! [`FormAdapter`] decodes an incoming multipart body with [`multer`], stores
//! uploaded files in temporary storage and hands the next handler two ordered
//! lists: the scalar fields and the uploaded files. On failure the next handler
//! receives the error instead and every temporary file collected so far is
//! removed.
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use form_adapter::{FormAdapter, FormConfig};
//! use futures_util::stream::once;
//! use std::convert::Infallible;
//!
//! # async fn run() {
//! let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
//! let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
//!
//! let adapter = FormAdapter::with_config(FormConfig::new().encoding("utf-8"));
//! let outcome = adapter.parse_stream(stream, "X-BOUNDARY").await.unwrap();
//!
//! assert_eq!(outcome.fields[0].name, "my_text_field");
//! assert_eq!(outcome.fields[0].value, "abcd");
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(run());
//! ```

pub use adapter::{FormAdapter, Next};
pub use config::FormConfig;
pub use decoder::{FormEvent, FormEvents, IncomingForm};
pub use error::Error;
pub use file::FileHandle;
pub use form::{FieldEntry, FileEntry, ParseOutcome};
pub use state::aggregate;

mod adapter;
mod config;
mod constants;
mod decoder;
mod error;
mod file;
mod form;
mod helpers;
mod state;

/// A Result type often returned from methods that can have `form-adapter` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header to extract the boundary value.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    multer::parse_boundary(content_type).map_err(|err| match err {
        multer::Error::NoMultipart => crate::Error::NoMultipart,
        multer::Error::NoBoundary => crate::Error::NoBoundary,
        multer::Error::DecodeContentType(err) => crate::Error::DecodeContentType(err),
        err => crate::Error::Decode(err),
    })
}
