//! The dispersal batcher's encoding pipeline.
//!
//! [streamer::EncodingStreamer] continuously pulls pending blobs from the
//! blob store, derives per-quorum encoding parameters from the operator
//! state at a fixed reference block, dispatches bounded-concurrency encode
//! requests, and collects the results in [store::EncodedBlobStore] until
//! [streamer::EncodingStreamer::create_batch] drains them into a
//! Merkle-committed [batch::Batch]. [notifier::EncodedSizeNotifier] gives
//! the caller an edge-triggered signal when enough encoded bytes have
//! accumulated to make a batch worthwhile.

pub mod batch;
pub mod notifier;
pub mod store;
pub mod streamer;
pub mod test_utils;
pub mod worker_pool;

use thiserror::Error;

use eigenda_core::errors::{
    AssignmentError, BlobStoreError, ChainError, EncodeError, HeaderError, ParamsError,
};

/// Errors surfaced by the encoding streamer.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StreamerError {
    /// Distinguished "nothing to batch" outcome: the store held no results
    /// for the current reference block. The caller simply retries on its
    /// next interval.
    #[error("no encoded results")]
    NoEncodedResults,

    #[error("encoding queue limit must be greater than zero")]
    InvalidQueueLimit,

    #[error("assignment range {start}..{end} exceeds the {len} encoded chunks")]
    AssignmentOutOfRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error(transparent)]
    BlobStore(#[from] BlobStoreError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Header(#[from] HeaderError),
}
