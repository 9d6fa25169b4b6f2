use crate::handler_index::{HandlerIndex, INVOKE_METHOD};

/// Pulls a one-line summary out of a handler's doc comment.
pub struct SummaryExtractor<'a> {
    index: &'a HandlerIndex,
}

impl<'a> SummaryExtractor<'a> {
    pub fn new(index: &'a HandlerIndex) -> Self {
        Self { index }
    }

    /// First meaningful line of the doc comment on `controller::method`.
    ///
    /// An empty or unknown `method` falls back to the invoke method. Returns `None` when
    /// the owner is unknown or its comment has no usable line.
    pub fn extract_summary(&self, controller: &str, method: &str) -> Option<String> {
        let methods = self.index.owner(controller)?;

        let doc = match methods.get(method).filter(|_| !method.is_empty()) {
            Some(doc) => doc,
            None => methods.get(INVOKE_METHOD)?,
        };

        first_summary_line(doc)
    }
}

/// First line that is neither blank nor an `@` annotation, trimmed of comment markers.
pub fn first_summary_line(doc: &str) -> Option<String> {
    doc.lines()
        .map(|line| line.trim_matches(|c| matches!(c, '/' | '*' | '\t' | ' ')))
        .find(|line| !line.is_empty() && !line.starts_with('@'))
        .map(str::to_string)
}
