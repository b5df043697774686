use {
    crate::RequestId,
    std::{io, path::PathBuf},
};

/// Problems found while parsing or validating a history.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("malformed history record {0:?}")]
    Malformed(String),

    #[error("line {line_number}: malformed history record {line:?}")]
    MalformedLine { line_number: usize, line: String },

    #[error("request {0} was invoked more than once")]
    DuplicateInvoke(RequestId),

    #[error("request {0} has more than one response")]
    DuplicateResponse(RequestId),

    #[error("request {0} has a response but no preceding invoke")]
    ResponseWithoutInvoke(RequestId),

    #[error("response to request {0} disagrees with its invoke on client or operation")]
    MismatchedResponse(RequestId),
}

/// Failure to write a history to its destination.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DumpError {
    #[error("unable to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to write history: {0}")]
    Write(#[from] io::Error),

    #[cfg(feature = "serde")]
    #[error("unable to encode history record: {0}")]
    Encode(#[from] serde_json::Error),
}
