use crate::{helpers, Error, FieldEntry, FileEntry, FormEvent, ParseOutcome};
use futures_util::stream::{Stream, StreamExt};
use std::mem;

#[derive(Debug)]
pub(crate) struct ParseState {
    pub(crate) stage: Stage,
    pub(crate) fields: Vec<FieldEntry>,
    pub(crate) files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Parsing,
    Errored,
    Ended,
}

impl ParseState {
    pub(crate) fn new() -> ParseState {
        ParseState {
            stage: Stage::Parsing,
            fields: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Applies one event. Returns the form's result on the event that ends
    /// parsing and `None` otherwise, including for every event after the end.
    pub(crate) async fn react(&mut self, event: FormEvent) -> Option<crate::Result<ParseOutcome>> {
        if self.stage != Stage::Parsing {
            return None;
        }

        match event {
            FormEvent::Field { name, value } => {
                self.fields.push(FieldEntry { name, value });
                None
            }
            FormEvent::File { name, file } => {
                self.files.push(FileEntry { name, file });
                None
            }
            FormEvent::Error(err) => Some(Err(self.fail(err).await)),
            FormEvent::End => Some(Ok(self.finish())),
        }
    }

    pub(crate) async fn fail(&mut self, err: Error) -> Error {
        self.stage = Stage::Errored;
        self.fields.clear();

        for entry in mem::take(&mut self.files) {
            helpers::remove_upload(entry.file.path()).await;
        }

        err
    }

    fn finish(&mut self) -> ParseOutcome {
        self.stage = Stage::Ended;

        ParseOutcome {
            fields: mem::take(&mut self.fields),
            files: mem::take(&mut self.files),
        }
    }
}

// A request future dropped mid-parse never reaches `fail`, so its uploads go here.
impl Drop for ParseState {
    fn drop(&mut self) {
        for entry in self.files.drain(..) {
            helpers::remove_upload_blocking(entry.file.path());
        }
    }
}

/// Collects a stream of [`FormEvent`]s into a [`ParseOutcome`].
///
/// Resolves on the first [`FormEvent::End`] or [`FormEvent::Error`]; the rest
/// of the stream is not polled. On error, and when the stream runs out before
/// either event, the temporary files of all collected file parts are removed.
pub async fn aggregate<S>(events: S) -> crate::Result<ParseOutcome>
where
    S: Stream<Item = FormEvent>,
{
    futures_util::pin_mut!(events);

    let mut state = ParseState::new();

    while let Some(event) = events.next().await {
        if let Some(result) = state.react(event).await {
            return result;
        }
    }

    Err(state.fail(Error::EventsUnterminated).await)
}
