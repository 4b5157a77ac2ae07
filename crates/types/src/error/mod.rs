// Path: crates/types/src/error/mod.rs
//! Core error types for the medical record ledger.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The provided key material is malformed or invalid for the specified algorithm.
    #[error("Invalid cryptographic key: {0}")]
    InvalidKey(String),
    /// A hash digest had an unexpected length.
    #[error("Invalid hash length: expected {expected}, got {got}")]
    InvalidHashLength {
        /// The expected length in bytes.
        expected: usize,
        /// The actual length in bytes.
        got: usize,
    },
    /// Authenticated decryption failed: wrong key or tampered ciphertext.
    #[error("Decryption failed (wrong key or corrupted ciphertext)")]
    DecryptionFailed,
    /// A generic failure in an underlying cryptographic library.
    #[error("Cryptographic operation failed: {0}")]
    OperationFailed(String),
    /// An input to a cryptographic operation was invalid.
    #[error("Invalid input for operation: {0}")]
    InvalidInput(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "CRYPTO_INVALID_KEY",
            Self::InvalidHashLength { .. } => "CRYPTO_INVALID_HASH_LENGTH",
            Self::DecryptionFailed => "CRYPTO_DECRYPTION_FAILED",
            Self::OperationFailed(_) => "CRYPTO_OPERATION_FAILED",
            Self::InvalidInput(_) => "CRYPTO_INVALID_INPUT",
        }
    }
}

impl From<dcrypt::Error> for CryptoError {
    fn from(e: dcrypt::Error) -> Self {
        CryptoError::OperationFailed(e.to_string())
    }
}

/// Errors related to the hash-linked ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The fingerprint backend failed while hashing a block.
    #[error("Failed to fingerprint block {index}: {source}")]
    Fingerprint {
        /// Index of the block being hashed.
        index: u64,
        /// The underlying failure.
        #[source]
        source: CryptoError,
    },
    /// A bounded mining search ran out of attempts.
    #[error("Mining gave up after {attempts} attempts at difficulty {difficulty}")]
    MiningExhausted {
        /// Number of nonces tried.
        attempts: u64,
        /// The difficulty being searched for.
        difficulty: u32,
    },
    /// Reading or writing the block journal failed.
    #[error("Journal I/O error: {0}")]
    Journal(#[from] std::io::Error),
    /// The journal decoded but does not form a valid chain.
    #[error("Corrupt journal: {0}")]
    CorruptJournal(String),
}

impl ErrorCode for LedgerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Fingerprint { .. } => "LEDGER_FINGERPRINT_FAILED",
            Self::MiningExhausted { .. } => "LEDGER_MINING_EXHAUSTED",
            Self::Journal(_) => "LEDGER_JOURNAL_IO",
            Self::CorruptJournal(_) => "LEDGER_CORRUPT_JOURNAL",
        }
    }
}

/// Errors raised by the document store.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The access-control check failed for the requester.
    #[error("Access denied: {0}")]
    AccessDenied(String),
    /// The document id is unknown.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// Encryption or decryption of the payload failed.
    #[error("Document crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl ErrorCode for DocumentError {
    fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "DOCUMENT_ACCESS_DENIED",
            Self::NotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::Crypto(_) => "DOCUMENT_CRYPTO_ERROR",
        }
    }
}

/// Rejections of malformed input at the core boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),
    /// An emergency grant duration outside the permitted range.
    #[error("Invalid emergency duration: {minutes} minutes (allowed 1..={max})")]
    InvalidDuration {
        /// The requested duration.
        minutes: u64,
        /// The configured maximum.
        max: u64,
    },
    /// An upload exceeded the configured size limit.
    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected upload.
        size: u64,
        /// The configured limit.
        limit: u64,
    },
    /// The declared file size does not match the payload.
    #[error("Declared file size {declared} does not match payload length {actual}")]
    SizeMismatch {
        /// The size the caller declared.
        declared: u64,
        /// The length of the bytes received.
        actual: u64,
    },
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyField(_) => "VALIDATION_EMPTY_FIELD",
            Self::InvalidDuration { .. } => "VALIDATION_INVALID_DURATION",
            Self::FileTooLarge { .. } => "VALIDATION_FILE_TOO_LARGE",
            Self::SizeMismatch { .. } => "VALIDATION_SIZE_MISMATCH",
            Self::Config(_) => "VALIDATION_CONFIG",
        }
    }
}

/// Errors raised when ending an emergency grant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrantError {
    /// The grant id is unknown.
    #[error("Emergency grant not found: {0}")]
    NotFound(String),
    /// The grant belongs to another doctor.
    #[error("Emergency grant {grant_id} is not held by {doctor_id}")]
    NotHolder {
        /// The grant in question.
        grant_id: String,
        /// The doctor who attempted the change.
        doctor_id: String,
    },
    /// The grant already expired or was ended.
    #[error("Emergency grant {0} is no longer active")]
    Inactive(String),
}

impl ErrorCode for GrantError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "GRANT_NOT_FOUND",
            Self::NotHolder { .. } => "GRANT_NOT_HOLDER",
            Self::Inactive(_) => "GRANT_INACTIVE",
        }
    }
}

/// The facade-level union of every error the core can surface.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// A document store failure.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Rejected input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A grant lifecycle failure.
    #[error(transparent)]
    Grant(#[from] GrantError),
    /// A record read was refused by access control.
    #[error("Access denied: {0}")]
    AccessDenied(String),
    /// A background mining task did not complete.
    #[error("Mining task failed: {0}")]
    Worker(String),
}

impl ErrorCode for ServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.code(),
            Self::Document(e) => e.code(),
            Self::Validation(e) => e.code(),
            Self::Grant(e) => e.code(),
            Self::AccessDenied(_) => "SERVICE_ACCESS_DENIED",
            Self::Worker(_) => "SERVICE_WORKER_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_forwards_inner_codes() {
        let err: ServiceError = DocumentError::NotFound("doc-1".into()).into();
        assert_eq!(err.code(), "DOCUMENT_NOT_FOUND");
        let err: ServiceError = ValidationError::EmptyField("reason").into();
        assert_eq!(err.code(), "VALIDATION_EMPTY_FIELD");
        assert_eq!(err.to_string(), "Field 'reason' must not be empty");
    }

    #[test]
    fn document_error_wraps_crypto() {
        let err: DocumentError = CryptoError::DecryptionFailed.into();
        assert_eq!(err.code(), "DOCUMENT_CRYPTO_ERROR");
    }
}
