use thiserror::Error;

use crate::data::{BlobKey, QuorumID};

/// Errors related to encoding parameter derivation and validation.
///
/// Validation failures are permanent for the blob that triggered them: the
/// batcher marks the blob failed instead of retrying.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParamsError {
    #[error("requested encoding parameters overflow")]
    ParameterOverflow,

    #[error("encoding parameters must be powers of two, got chunk_length {chunk_length} and num_chunks {num_chunks}")]
    NotPowerOfTwo { chunk_length: u64, num_chunks: u64 },

    #[error("the {num_evaluations} requested evaluations do not fit the SRS of order {srs_order}")]
    ExceedsSrsOrder {
        num_evaluations: u64,
        srs_order: u64,
    },

    #[error("{num_evaluations} evaluations cannot carry a blob of {blob_length} symbols")]
    InsufficientEvaluations {
        num_evaluations: u64,
        blob_length: u64,
    },
}

/// Errors related to operator chunk assignment.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AssignmentError {
    #[error("no operator state for quorum {0}")]
    QuorumNotFound(QuorumID),

    #[error("quorum has no registered operators")]
    NoOperators,

    #[error("quorum has zero total stake")]
    ZeroTotalStake,

    #[error("quorum threshold {quorum_threshold} must exceed the adversary threshold {adversary_threshold}")]
    InvalidThresholds {
        quorum_threshold: u8,
        adversary_threshold: u8,
    },

    #[error("quantization factor must be greater than zero")]
    InvalidQuantization,

    #[error("assignment arithmetic overflow")]
    ParameterOverflow,
}

/// Errors surfaced by the chain-state client.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ChainError {
    #[error("chain state unavailable: {0}")]
    Unavailable(String),

    #[error("no operator state for quorum {0} at block {1}")]
    MissingQuorum(QuorumID, u64),
}

/// Errors surfaced by the blob store.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BlobStoreError {
    #[error("blob {0} not found")]
    NotFound(BlobKey),

    #[error("blob store backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by an encoder client.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EncodeError {
    /// The request's cancellation token fired before the encoder finished.
    #[error("encoding request was cancelled")]
    Cancelled,

    #[error("encoding request timed out")]
    Timeout,

    #[error("encoder rejected the request: {0}")]
    InvalidParams(String),

    #[error("encoder failure: {0}")]
    Encoder(String),
}

/// Errors related to Merkle tree construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MerkleError {
    #[error("cannot build a merkle tree with no leaves")]
    NoLeaves,
}

/// Errors related to header serialization and batch-root computation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum HeaderError {
    #[error("header serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),
}
