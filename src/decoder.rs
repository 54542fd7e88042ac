use crate::config::FormConfig;
use crate::{constants, helpers, Error, FileHandle};
use bytes::{Bytes, BytesMut};
use encoding_rs::Encoding;
use futures_util::stream::{self, Stream};
use multer::{Constraints, Field, Multipart, SizeLimit};
use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// One step of a decoded multipart stream.
#[derive(Debug)]
pub enum FormEvent {
    /// A scalar field, decoded to text.
    Field { name: String, value: String },
    /// A file part, completely written to temporary storage.
    File { name: String, file: FileHandle },
    /// Decoding failed. No event follows.
    Error(Error),
    /// The stream was decoded completely. No event follows.
    End,
}

/// Decodes `multipart/form-data` into [`FormEvent`]s, storing file parts in
/// temporary files.
///
/// A fresh instance starts from the defaults listed on [`FormConfig`] and
/// takes overrides through [`configure`](IncomingForm::configure).
///
/// # Examples
///
/// ```
/// use form_adapter::{FormConfig, IncomingForm};
/// use bytes::Bytes;
/// use std::convert::Infallible;
/// use futures_util::stream::{once, StreamExt};
///
/// # async fn run() {
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
/// let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
///
/// let mut form = IncomingForm::new();
/// form.configure(&FormConfig::new().encoding("utf-8"));
/// let mut events = form.parse(stream, "X-BOUNDARY");
///
/// while let Some(event) = events.next().await {
///     println!("Event: {:?}", event);
/// }
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
#[derive(Debug, Clone)]
pub struct IncomingForm {
    encoding: String,
    upload_dir: PathBuf,
    keep_extensions: bool,
    max_fields: usize,
    max_fields_size: u64,
    max_file_size: u64,
    max_total_size: Option<u64>,
    allowed_fields: Option<Vec<String>>,
}

impl IncomingForm {
    /// Creates a decoder with the default settings.
    pub fn new() -> IncomingForm {
        IncomingForm::default()
    }

    /// Applies every key set in `config` onto this decoder.
    pub fn configure(&mut self, config: &FormConfig) {
        if let Some(encoding) = &config.encoding {
            self.encoding = encoding.clone();
        }
        if let Some(upload_dir) = &config.upload_dir {
            self.upload_dir = upload_dir.clone();
        }
        if let Some(keep_extensions) = config.keep_extensions {
            self.keep_extensions = keep_extensions;
        }
        if let Some(max_fields) = config.max_fields {
            self.max_fields = max_fields;
        }
        if let Some(max_fields_size) = config.max_fields_size {
            self.max_fields_size = max_fields_size;
        }
        if let Some(max_file_size) = config.max_file_size {
            self.max_file_size = max_file_size;
        }
        if let Some(max_total_size) = config.max_total_size {
            self.max_total_size = Some(max_total_size);
        }
        if let Some(allowed_fields) = &config.allowed_fields {
            self.allowed_fields = Some(allowed_fields.clone());
        }
    }

    /// The charset label used for fields whose part names no charset.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// The directory in which uploaded files are stored.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Whether temporary files keep the uploaded file's extension.
    pub fn keep_extensions(&self) -> bool {
        self.keep_extensions
    }

    /// The maximum number of scalar fields, `0` for unlimited.
    pub fn max_fields(&self) -> usize {
        self.max_fields
    }

    /// The size limit of all scalar field values together.
    pub fn max_fields_size(&self) -> u64 {
        self.max_fields_size
    }

    /// The size limit of all uploaded files together.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// The size limit of the whole stream, if any.
    pub fn max_total_size(&self) -> Option<u64> {
        self.max_total_size
    }

    /// The accepted field names, `None` when every name is accepted.
    pub fn allowed_fields(&self) -> Option<&[String]> {
        self.allowed_fields.as_deref()
    }

    /// Starts decoding the given [`Bytes`] stream with the boundary.
    ///
    /// Nothing is read until the returned [`FormEvents`] is polled.
    pub fn parse<'r, S, O, E, B>(self, stream: S, boundary: B) -> FormEvents<'r>
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
        B: Into<String>,
    {
        let multipart = Multipart::with_constraints(stream, boundary, self.constraints());

        let decoding = Decoding {
            multipart,
            form: self,
            fields_count: 0,
            fields_size: 0,
            files_size: 0,
        };

        let events = stream::unfold(Some(decoding), |decoding| async move {
            let mut decoding = decoding?;

            match decoding.next_event().await {
                Ok(Some(event)) => Some((event, Some(decoding))),
                Ok(None) => Some((FormEvent::End, None)),
                Err(err) => Some((FormEvent::Error(err), None)),
            }
        });

        FormEvents {
            inner: Box::pin(events),
        }
    }

    fn constraints(&self) -> Constraints {
        let mut constraints = Constraints::new();

        if let Some(limit) = self.max_total_size {
            constraints = constraints.size_limit(SizeLimit::new().whole_stream(limit));
        }

        if let Some(allowed_fields) = &self.allowed_fields {
            constraints = constraints.allowed_fields(allowed_fields.clone());
        }

        constraints
    }
}

impl Default for IncomingForm {
    fn default() -> Self {
        IncomingForm {
            encoding: constants::DEFAULT_ENCODING.to_owned(),
            upload_dir: std::env::temp_dir(),
            keep_extensions: false,
            max_fields: constants::DEFAULT_MAX_FIELDS,
            max_fields_size: constants::DEFAULT_MAX_FIELDS_SIZE,
            max_file_size: constants::DEFAULT_MAX_FILE_SIZE,
            max_total_size: None,
            allowed_fields: None,
        }
    }
}

/// The [`FormEvent`] stream of a single multipart body.
///
/// It ends right after yielding either [`FormEvent::End`] or [`FormEvent::Error`].
pub struct FormEvents<'r> {
    inner: Pin<Box<dyn Stream<Item = FormEvent> + Send + 'r>>,
}

impl<'r> Stream for FormEvents<'r> {
    type Item = FormEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<'r> Debug for FormEvents<'r> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEvents").finish()
    }
}

struct Decoding<'r> {
    multipart: Multipart<'r>,
    form: IncomingForm,
    fields_count: usize,
    fields_size: u64,
    files_size: u64,
}

impl<'r> Decoding<'r> {
    async fn next_event(&mut self) -> crate::Result<Option<FormEvent>> {
        let field = match self.multipart.next_field().await? {
            Some(field) => field,
            None => return Ok(None),
        };

        let name = field.name().unwrap_or_default().to_owned();

        let file_name = field.file_name().map(|file_name| helpers::base_name(file_name).to_owned());

        match file_name {
            Some(file_name) => self.receive_file(name, file_name, field).await.map(Some),
            None => self.receive_field(name, field).await.map(Some),
        }
    }

    async fn receive_field(&mut self, name: String, mut field: Field<'r>) -> crate::Result<FormEvent> {
        self.fields_count += 1;
        if self.form.max_fields > 0 && self.fields_count > self.form.max_fields {
            return Err(Error::TooManyFields {
                limit: self.form.max_fields,
            });
        }

        let label = field
            .content_type()
            .and_then(|ct| ct.get_param(mime::CHARSET))
            .map(|charset| charset.as_str().to_owned())
            .unwrap_or_else(|| self.form.encoding.clone());
        let encoding = Encoding::for_label(label.as_bytes()).ok_or(Error::UnknownEncoding(label))?;

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            self.fields_size += chunk.len() as u64;
            if self.fields_size > self.form.max_fields_size {
                return Err(Error::FieldsSizeExceeded {
                    limit: self.form.max_fields_size,
                });
            }
            buf.extend_from_slice(&chunk);
        }

        let (value, _, _) = encoding.decode(&buf);

        Ok(FormEvent::Field {
            name,
            value: value.into_owned(),
        })
    }

    async fn receive_file(&mut self, name: String, file_name: String, mut field: Field<'r>) -> crate::Result<FormEvent> {
        let content_type = field.content_type().cloned();
        let path = helpers::upload_path(&self.form.upload_dir, &file_name, self.form.keep_extensions);

        let mut file = File::create(&path).await.map_err(|cause| Error::WriteTempFile {
            path: path.clone(),
            cause,
        })?;
        let upload = helpers::UploadGuard::new(path.clone());

        let written = self.write_file(&mut file, &mut field, &name, &path).await;
        drop(file);

        match written {
            Ok(size) => {
                let path = upload.keep();

                #[cfg(feature = "log")]
                log::trace!("Stored upload '{}' ({} bytes) at {}", name, size, path.display());

                Ok(FormEvent::File {
                    name,
                    file: FileHandle::new(path, Some(file_name), content_type, size),
                })
            }
            Err(err) => {
                upload.remove().await;
                Err(err)
            }
        }
    }

    async fn write_file(&mut self, file: &mut File, field: &mut Field<'r>, name: &str, path: &Path) -> crate::Result<u64> {
        let write_err = |cause| Error::WriteTempFile {
            path: path.to_owned(),
            cause,
        };

        let mut size = 0;
        while let Some(chunk) = field.chunk().await? {
            self.files_size += chunk.len() as u64;
            if self.files_size > self.form.max_file_size {
                return Err(Error::FileSizeExceeded {
                    limit: self.form.max_file_size,
                    field_name: name.to_owned(),
                });
            }

            file.write_all(&chunk).await.map_err(write_err)?;
            size += chunk.len() as u64;
        }

        file.flush().await.map_err(write_err)?;

        Ok(size)
    }
}
