//! Purpose: Crate-wide error value shared by the mirror and protocol layers.
//! Exports: `Error`, `ErrorKind`, `ApiResult`.
//! Role: Lets callers tell "my input was invalid" apart from "the service failed".
//! Invariants: Every error carries a kind; context fields are optional and additive.
//! Invariants: Parse errors keep the offending document; operation failures keep the status.
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::core::entity::TransactionId;
use crate::core::status::Status;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    QueryFailure,
    Parse,
    OperationFailure,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::QueryFailure => "query failure",
            ErrorKind::Parse => "parse error",
            ErrorKind::OperationFailure => "operation failure",
            ErrorKind::Internal => "internal error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    path: Option<String>,
    document: Option<String>,
    status: Option<Status>,
    transaction_id: Option<TransactionId>,
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            path: None,
            document: None,
            status: None,
            transaction_id: None,
            source: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument).with_message(message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_transaction_id(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        if let Some(transaction_id) = &self.transaction_id {
            write!(f, " (transaction: {transaction_id})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use crate::core::status::Status;
    use std::error::Error as StdError;

    #[test]
    fn display_includes_context() {
        let err = Error::new(ErrorKind::OperationFailure)
            .with_message("topic create failed")
            .with_status(Status::InvalidSignature);
        assert_eq!(
            err.to_string(),
            "operation failure: topic create failed (status: INVALID_SIGNATURE)"
        );
    }

    #[test]
    fn source_survives_clone() {
        let cause = std::io::Error::other("connection reset");
        let err = Error::new(ErrorKind::QueryFailure)
            .with_path("/api/v1/accounts/0.0.2")
            .with_source(cause);
        let cloned = err.clone();
        let source = cloned.source().expect("source");
        assert_eq!(source.to_string(), "connection reset");
        assert_eq!(cloned.path(), Some("/api/v1/accounts/0.0.2"));
    }

    #[test]
    fn invalid_argument_shorthand_sets_kind() {
        let err = Error::invalid_argument("serial must be positive");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), Some("serial must be positive"));
    }
}
