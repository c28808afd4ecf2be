//! Purpose: Ledger file operations.
//! Exports: `FileInfo` and the file create/append/update/delete/contents/info requests and results.
//! Role: Factories default the file keys to the operator key.
//! Invariants: Create contents are at most 2048 bytes; append chunks at most 4096 bytes.
use bytes::Bytes;
use time::OffsetDateTime;

use crate::config::Operator;
use crate::core::entity::{FileId, TransactionId};
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;
use crate::core::status::Status;
use crate::protocol::network::{LedgerQuery, QueryResponse, TransactionBody};
use crate::protocol::options::{
    KeySource, MAX_FILE_APPEND_BYTES, MAX_FILE_CREATE_BYTES, QueryOptions, TransactionOptions,
    check_max_len, check_memo, check_not_empty,
};
use crate::protocol::request::{
    Operation, OperationKind, Outcome, Request, required, unexpected_response,
};

/// File metadata as a consensus node reports it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileInfo {
    pub file_id: FileId,
    pub size: u64,
    pub expiration_time: Option<OffsetDateTime>,
    pub deleted: bool,
    pub keys: Vec<PublicKey>,
    pub memo: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileCreateRequest {
    contents: Bytes,
    keys: Vec<KeySource>,
    memo: Option<String>,
    expiration_time: Option<OffsetDateTime>,
    options: TransactionOptions,
}

impl FileCreateRequest {
    /// A file owned by the operator key.
    pub fn of(contents: impl Into<Bytes>) -> ApiResult<Self> {
        Self::build(contents.into(), vec![KeySource::Operator], None)
    }

    pub fn of_keys(contents: impl Into<Bytes>, keys: Vec<PublicKey>) -> ApiResult<Self> {
        if keys.is_empty() {
            return Err(Error::invalid_argument("file keys must not be empty"));
        }
        Self::build(contents.into(), keys.into_iter().map(KeySource::Key).collect(), None)
    }

    pub fn of_keys_and_memo(
        contents: impl Into<Bytes>,
        keys: Vec<PublicKey>,
        memo: impl Into<String>,
    ) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "file memo")?;
        let mut request = Self::of_keys(contents, keys)?;
        request.memo = Some(memo);
        Ok(request)
    }

    fn build(contents: Bytes, keys: Vec<KeySource>, memo: Option<String>) -> ApiResult<Self> {
        check_max_len(contents.len(), MAX_FILE_CREATE_BYTES, "file contents")?;
        Ok(Self {
            contents,
            keys,
            memo,
            expiration_time: None,
            options: TransactionOptions::default(),
        })
    }

    pub fn with_expiration_time(mut self, expiration_time: OffsetDateTime) -> Self {
        self.expiration_time = Some(expiration_time);
        self
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn keys(&self) -> &[KeySource] {
        &self.keys
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub file_id: FileId,
}

impl Request for FileCreateRequest {
    type Output = FileCreateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::FileCreate
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::FileCreate {
                contents: self.contents.clone(),
                keys: self.keys.iter().filter_map(|key| key.resolve(operator)).collect(),
                memo: self.memo.clone(),
                expiration_time: self.expiration_time,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::FileCreate;
        let receipt = outcome.into_receipt(kind)?;
        Ok(FileCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            file_id: required(receipt.file_id, &receipt, kind, "file id")?,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileAppendRequest {
    file_id: FileId,
    contents: Bytes,
    options: TransactionOptions,
}

impl FileAppendRequest {
    pub fn of(file_id: FileId, contents: impl Into<Bytes>) -> ApiResult<Self> {
        let contents = contents.into();
        check_not_empty(contents.len(), "appended contents")?;
        check_max_len(contents.len(), MAX_FILE_APPEND_BYTES, "appended contents")?;
        Ok(Self {
            file_id,
            contents,
            options: TransactionOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileAppendResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for FileAppendRequest {
    type Output = FileAppendResult;

    fn kind(&self) -> OperationKind {
        OperationKind::FileAppend
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::FileAppend {
                file_id: self.file_id,
                contents: self.contents.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::FileAppend)?;
        Ok(FileAppendResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileUpdateRequest {
    file_id: FileId,
    contents: Option<Bytes>,
    memo: Option<String>,
    expiration_time: Option<OffsetDateTime>,
    options: TransactionOptions,
}

impl FileUpdateRequest {
    /// Replaces the whole contents.
    pub fn of_contents(file_id: FileId, contents: impl Into<Bytes>) -> ApiResult<Self> {
        let contents = contents.into();
        check_max_len(contents.len(), MAX_FILE_CREATE_BYTES, "file contents")?;
        Ok(Self {
            contents: Some(contents),
            ..Self::empty(file_id)
        })
    }

    pub fn of_memo(file_id: FileId, memo: impl Into<String>) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "file memo")?;
        Ok(Self {
            memo: Some(memo),
            ..Self::empty(file_id)
        })
    }

    pub fn of_expiration_time(file_id: FileId, expiration_time: OffsetDateTime) -> Self {
        Self {
            expiration_time: Some(expiration_time),
            ..Self::empty(file_id)
        }
    }

    fn empty(file_id: FileId) -> Self {
        Self {
            file_id,
            contents: None,
            memo: None,
            expiration_time: None,
            options: TransactionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileUpdateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for FileUpdateRequest {
    type Output = FileUpdateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::FileUpdate
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::FileUpdate {
                file_id: self.file_id,
                contents: self.contents.clone(),
                memo: self.memo.clone(),
                expiration_time: self.expiration_time,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::FileUpdate)?;
        Ok(FileUpdateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileDeleteRequest {
    file_id: FileId,
    options: TransactionOptions,
}

impl FileDeleteRequest {
    pub fn of(file_id: FileId) -> Self {
        Self {
            file_id,
            options: TransactionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for FileDeleteRequest {
    type Output = FileDeleteResult;

    fn kind(&self) -> OperationKind {
        OperationKind::FileDelete
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::FileDelete {
                file_id: self.file_id,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::FileDelete)?;
        Ok(FileDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileContentsRequest {
    file_id: FileId,
    options: QueryOptions,
}

impl FileContentsRequest {
    pub fn of(file_id: FileId) -> Self {
        Self {
            file_id,
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileContentsResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub contents: Bytes,
}

impl Request for FileContentsRequest {
    type Output = FileContentsResult;

    fn kind(&self) -> OperationKind {
        OperationKind::FileContents
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Query {
            query: LedgerQuery::FileContents {
                file_id: self.file_id,
            },
            options: self.options,
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::FileContents;
        match outcome.into_response(kind)? {
            (transaction_id, QueryResponse::FileContents(contents)) => Ok(FileContentsResult {
                transaction_id,
                status: Status::Ok,
                contents,
            }),
            (_, other) => Err(unexpected_response(kind, &other)),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileInfoRequest {
    file_id: FileId,
    options: QueryOptions,
}

impl FileInfoRequest {
    pub fn of(file_id: FileId) -> Self {
        Self {
            file_id,
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileInfoResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub info: FileInfo,
}

impl Request for FileInfoRequest {
    type Output = FileInfoResult;

    fn kind(&self) -> OperationKind {
        OperationKind::FileInfo
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Query {
            query: LedgerQuery::FileInfo {
                file_id: self.file_id,
            },
            options: self.options,
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::FileInfo;
        match outcome.into_response(kind)? {
            (transaction_id, QueryResponse::FileInfo(info)) => Ok(FileInfoResult {
                transaction_id,
                status: Status::Ok,
                info,
            }),
            (_, other) => Err(unexpected_response(kind, &other)),
        }
    }
}
