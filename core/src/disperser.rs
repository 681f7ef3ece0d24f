use std::collections::HashMap;

use async_trait::async_trait;

use crate::data::{Blob, BlobCommitments, BlobKey, BlobMetadata, BlobStatus, Chunk};
use crate::errors::{BlobStoreError, EncodeError};
use crate::params::EncodingParams;

/// Read/update access to the dispersal blob store. The batcher pulls
/// pending metadata, fetches payloads for the blobs it is about to encode,
/// and marks blobs failed when their parameters can never validate.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_blob_metadata_by_status(
        &self,
        status: BlobStatus,
    ) -> Result<Vec<BlobMetadata>, BlobStoreError>;

    async fn get_blobs_by_metadata(
        &self,
        metadatas: &[BlobMetadata],
    ) -> Result<HashMap<BlobKey, Blob>, BlobStoreError>;

    async fn mark_blob_failed(&self, blob_key: &BlobKey) -> Result<(), BlobStoreError>;
}

/// An erasure-coding backend: given blob bytes and encoding parameters,
/// produces the commitments and the ordered chunk list.
///
/// Implementations must stop work promptly when the calling future is
/// dropped; the batcher cancels outstanding requests collectively whenever
/// it seals a batch.
#[async_trait]
pub trait EncoderClient: Send + Sync {
    async fn encode_blob(
        &self,
        data: &[u8],
        params: EncodingParams,
    ) -> Result<(BlobCommitments, Vec<Chunk>), EncodeError>;
}
