use crate::FileHandle;

/// A scalar form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub value: String,
}

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub file: FileHandle,
}

/// The collected form, in the order the parts arrived.
///
/// A name may occur more than once in either list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub fields: Vec<FieldEntry>,
    pub files: Vec<FileEntry>,
}

impl ParseOutcome {
    /// Returns the value of the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Returns the first file uploaded under the given name.
    pub fn file(&self, name: &str) -> Option<&FileHandle> {
        self.files.iter().find(|entry| entry.name == name).map(|entry| &entry.file)
    }
}
