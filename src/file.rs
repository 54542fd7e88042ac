use std::path::{Path, PathBuf};

/// An uploaded file, already written and closed in temporary storage.
///
/// The handle only describes the file. Dropping it leaves the file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHandle {
    path: PathBuf,
    file_name: Option<String>,
    content_type: Option<mime::Mime>,
    size: u64,
}

impl FileHandle {
    pub(crate) fn new(path: PathBuf, file_name: Option<String>, content_type: Option<mime::Mime>, size: u64) -> Self {
        FileHandle {
            path,
            file_name,
            content_type,
            size,
        }
    }

    /// The location of the temporary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name the client sent in the `Content-Disposition` header,
    /// without any directory components.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The `Content-Type` the client sent for this part.
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.content_type.as_ref()
    }

    /// Number of bytes written to the temporary file.
    pub fn size(&self) -> u64 {
        self.size
    }
}
