use std::path::PathBuf;

/// Settings applied onto the [`IncomingForm`](crate::IncomingForm) decoder of
/// every request.
///
/// Every key is optional. A key left unset keeps the decoder's own default, a
/// set key overwrites it.
///
/// # Examples
///
/// ```
/// use form_adapter::FormConfig;
///
/// let config = FormConfig::new()
///     .encoding("utf-8")
///     .keep_extensions(true)
///     .max_file_size(10 * 1024 * 1024)
///     .allowed_fields(vec!["title", "attachment"]);
///
/// assert_eq!(config.encoding.as_deref(), Some("utf-8"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "json",
    derive(serde::Deserialize),
    serde(deny_unknown_fields, rename_all = "camelCase")
)]
pub struct FormConfig {
    /// Charset label used for field values whose part names no charset.
    pub encoding: Option<String>,
    /// Directory in which uploaded files are stored.
    pub upload_dir: Option<PathBuf>,
    /// Whether the temporary file keeps the extension of the uploaded file name.
    pub keep_extensions: Option<bool>,
    /// Maximum number of scalar fields, `0` means unlimited.
    pub max_fields: Option<usize>,
    /// Maximum number of bytes of all scalar field values together.
    pub max_fields_size: Option<u64>,
    /// Maximum number of bytes of all uploaded files together.
    pub max_file_size: Option<u64>,
    /// Maximum number of bytes of the whole multipart stream.
    pub max_total_size: Option<u64>,
    /// Field names that are accepted, any other name fails the form.
    pub allowed_fields: Option<Vec<String>>,
}

impl FormConfig {
    /// Creates an empty configuration which leaves every decoder default in place.
    pub fn new() -> FormConfig {
        FormConfig::default()
    }

    /// Reads a configuration from a JSON object such as
    /// `{"uploadDir": "/tmp/forms", "maxFileSize": 1048576}`.
    ///
    /// Unknown keys are rejected.
    ///
    /// # Optional
    ///
    /// This requires the optional `json` feature to be enabled.
    #[cfg(feature = "json")]
    pub fn from_json(value: serde_json::Value) -> crate::Result<FormConfig> {
        serde_json::from_value(value).map_err(crate::Error::InvalidConfig)
    }

    /// Sets the charset label for field values, e.g. `"utf-8"` or `"iso-8859-1"`.
    pub fn encoding<E: Into<String>>(mut self, encoding: E) -> FormConfig {
        self.encoding = Some(encoding.into());
        self
    }

    /// Sets the directory in which uploaded files are stored.
    pub fn upload_dir<P: Into<PathBuf>>(mut self, dir: P) -> FormConfig {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Keeps the uploaded file's extension on its temporary file.
    pub fn keep_extensions(mut self, keep: bool) -> FormConfig {
        self.keep_extensions = Some(keep);
        self
    }

    /// Sets the maximum number of scalar fields, `0` for unlimited.
    pub fn max_fields(mut self, limit: usize) -> FormConfig {
        self.max_fields = Some(limit);
        self
    }

    /// Sets the size limit of all scalar field values together.
    pub fn max_fields_size(mut self, limit: u64) -> FormConfig {
        self.max_fields_size = Some(limit);
        self
    }

    /// Sets the size limit of all uploaded files together.
    pub fn max_file_size(mut self, limit: u64) -> FormConfig {
        self.max_file_size = Some(limit);
        self
    }

    /// Sets the size limit of the whole stream.
    pub fn max_total_size(mut self, limit: u64) -> FormConfig {
        self.max_total_size = Some(limit);
        self
    }

    /// Accepts only the given field names.
    pub fn allowed_fields<N: Into<String>>(mut self, names: Vec<N>) -> FormConfig {
        self.allowed_fields = Some(names.into_iter().map(|name| name.into()).collect());
        self
    }
}
