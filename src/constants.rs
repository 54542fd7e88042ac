pub(crate) const DEFAULT_ENCODING: &str = "utf-8";

pub(crate) const DEFAULT_MAX_FIELDS: usize = 1000;
pub(crate) const DEFAULT_MAX_FIELDS_SIZE: u64 = 20 * 1024 * 1024;
pub(crate) const DEFAULT_MAX_FILE_SIZE: u64 = 200 * 1024 * 1024;

pub(crate) const UPLOAD_FILE_PREFIX: &str = "upload_";
