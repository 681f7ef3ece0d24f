//! In-memory doubles for the interfaces the streamer consumes, usable by
//! this crate's tests and by downstream harnesses.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ark_bn254::{Fr, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_std::Zero;
use async_trait::async_trait;
use sha3::{Digest, Keccak256};

use eigenda_core::chain::{IndexedChainState, OperatorInfo, OperatorState};
use eigenda_core::data::{
    Blob, BlobCommitments, BlobKey, BlobMetadata, BlobStatus, Chunk, OperatorID, QuorumID,
    SecurityParam,
};
use eigenda_core::disperser::{BlobStore, EncoderClient};
use eigenda_core::errors::{BlobStoreError, ChainError, EncodeError};
use eigenda_core::params::EncodingParams;
use eigenda_primitives::blob::Blob as PaddedBlob;
use eigenda_primitives::consts::BYTES_PER_FIELD_ELEMENT;
use eigenda_primitives::fft::FftSettings;

/// Operator identity used by the mock chain: zero bytes with the operator
/// ordinal in the last position.
pub fn operator_id(ordinal: u8) -> OperatorID {
    let mut bytes = [0u8; 32];
    bytes[31] = ordinal;
    OperatorID::new(bytes)
}

pub fn security_param(quorum_id: QuorumID) -> SecurityParam {
    SecurityParam {
        quorum_id,
        adversary_threshold: 40,
        quorum_threshold: 80,
        quorum_rate: 1000,
    }
}

struct StoredBlob {
    blob: Blob,
    metadata: BlobMetadata,
    status: BlobStatus,
}

/// Blob store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryBlobStore {
    inner: Mutex<HashMap<BlobKey, StoredBlob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a blob in [BlobStatus::Processing] and returns its key.
    pub fn put_blob(
        &self,
        data: &[u8],
        security_params: Vec<SecurityParam>,
        requested_at: u64,
    ) -> BlobKey {
        let blob_key = BlobKey::from_blob_data(data, requested_at);
        let metadata = BlobMetadata {
            blob_key,
            blob_size: data.len() as u64,
            requested_at,
            security_params: security_params.clone(),
        };
        self.inner.lock().unwrap().insert(
            blob_key,
            StoredBlob {
                blob: Blob {
                    data: data.to_vec(),
                    security_params,
                },
                metadata,
                status: BlobStatus::Processing,
            },
        );
        blob_key
    }

    pub fn status(&self, blob_key: &BlobKey) -> Option<BlobStatus> {
        self.inner
            .lock()
            .unwrap()
            .get(blob_key)
            .map(|stored| stored.status)
    }

    pub fn set_status(&self, blob_key: &BlobKey, status: BlobStatus) {
        if let Some(stored) = self.inner.lock().unwrap().get_mut(blob_key) {
            stored.status = status;
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get_blob_metadata_by_status(
        &self,
        status: BlobStatus,
    ) -> Result<Vec<BlobMetadata>, BlobStoreError> {
        let inner = self.inner.lock().unwrap();
        let mut metadatas: Vec<BlobMetadata> = inner
            .values()
            .filter(|stored| stored.status == status)
            .map(|stored| stored.metadata.clone())
            .collect();
        metadatas.sort_by_key(|metadata| (metadata.requested_at, metadata.blob_key));
        Ok(metadatas)
    }

    async fn get_blobs_by_metadata(
        &self,
        metadatas: &[BlobMetadata],
    ) -> Result<HashMap<BlobKey, Blob>, BlobStoreError> {
        let inner = self.inner.lock().unwrap();
        let mut blobs = HashMap::with_capacity(metadatas.len());
        for metadata in metadatas {
            let stored = inner
                .get(&metadata.blob_key)
                .ok_or(BlobStoreError::NotFound(metadata.blob_key))?;
            blobs.insert(metadata.blob_key, stored.blob.clone());
        }
        Ok(blobs)
    }

    async fn mark_blob_failed(&self, blob_key: &BlobKey) -> Result<(), BlobStoreError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .get_mut(blob_key)
            .ok_or(BlobStoreError::NotFound(*blob_key))?;
        stored.status = BlobStatus::Failed;
        Ok(())
    }
}

/// Chain state with a programmable block number and a fixed operator set of
/// equal stakes across the configured quorums.
pub struct MockChainState {
    block_number: AtomicU64,
    operators: BTreeMap<QuorumID, BTreeMap<OperatorID, OperatorInfo>>,
}

impl MockChainState {
    pub fn new(num_operators: usize, quorum_ids: &[QuorumID]) -> Self {
        let per_quorum: BTreeMap<OperatorID, OperatorInfo> = (0..num_operators)
            .map(|i| (operator_id(i as u8), OperatorInfo { stake: 100 }))
            .collect();
        let operators = quorum_ids
            .iter()
            .map(|&quorum_id| (quorum_id, per_quorum.clone()))
            .collect();
        MockChainState {
            block_number: AtomicU64::new(0),
            operators,
        }
    }

    pub fn set_block_number(&self, block_number: u64) {
        self.block_number.store(block_number, Ordering::SeqCst);
    }
}

#[async_trait]
impl IndexedChainState for MockChainState {
    async fn get_current_block_number(&self) -> Result<u64, ChainError> {
        Ok(self.block_number.load(Ordering::SeqCst))
    }

    async fn get_indexed_operator_state(
        &self,
        block_number: u64,
        quorum_ids: &[QuorumID],
    ) -> Result<OperatorState, ChainError> {
        let mut operators = BTreeMap::new();
        for &quorum_id in quorum_ids {
            let quorum = self
                .operators
                .get(&quorum_id)
                .ok_or(ChainError::MissingQuorum(quorum_id, block_number))?;
            operators.insert(quorum_id, quorum.clone());
        }
        Ok(OperatorState {
            operators,
            block_number,
        })
    }
}

fn hash_to_point(data: &[u8], domain: &[u8]) -> G1Affine {
    let mut hasher = Keccak256::new();
    hasher.update(domain);
    hasher.update(data);
    let digest: [u8; 32] = hasher.finalize().into();
    let scalar = Fr::from_be_bytes_mod_order(&digest);
    (G1Affine::generator() * scalar).into_affine()
}

/// Encoder that actually erasure-codes the blob through the primitives FFT
/// and manufactures content-derived commitments, so results are
/// deterministic without an SRS on disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicEncoder;

#[async_trait]
impl EncoderClient for DeterministicEncoder {
    async fn encode_blob(
        &self,
        data: &[u8],
        params: EncodingParams,
    ) -> Result<(BlobCommitments, Vec<Chunk>), EncodeError> {
        let blob = PaddedBlob::from_raw_data(data);
        let poly = blob
            .to_polynomial_coeff_form()
            .map_err(|err| EncodeError::Encoder(err.to_string()))?;

        let width = params.num_evaluations() as usize;
        if poly.len() > width {
            return Err(EncodeError::InvalidParams(format!(
                "blob needs {} coefficients but the domain has {width}",
                poly.len()
            )));
        }
        let fs = FftSettings::from_width(width)
            .map_err(|err| EncodeError::Encoder(err.to_string()))?;
        let mut coeffs = poly.coeffs().to_vec();
        coeffs.resize(width, Fr::zero());
        let evals = fs
            .fft(&coeffs, false)
            .map_err(|err| EncodeError::Encoder(err.to_string()))?;

        let chunks = evals
            .chunks(params.chunk_length as usize)
            .map(|coeffs| Chunk {
                coeffs: coeffs.to_vec(),
                proof: G1Affine::generator(),
            })
            .collect();

        let commitments = BlobCommitments {
            commitment: hash_to_point(data, b"commitment"),
            length_proof: hash_to_point(data, b"length"),
            length: (poly.len_underlying_blob_bytes() / BYTES_PER_FIELD_ELEMENT) as u64,
        };
        Ok((commitments, chunks))
    }
}

/// Wraps an encoder with a fixed delay, for exercising timeouts and
/// cancellation.
pub struct DelayedEncoder<E> {
    inner: E,
    delay: Duration,
}

impl<E> DelayedEncoder<E> {
    pub fn new(inner: E, delay: Duration) -> Self {
        DelayedEncoder { inner, delay }
    }
}

#[async_trait]
impl<E: EncoderClient> EncoderClient for DelayedEncoder<E> {
    async fn encode_blob(
        &self,
        data: &[u8],
        params: EncodingParams,
    ) -> Result<(BlobCommitments, Vec<Chunk>), EncodeError> {
        tokio::time::sleep(self.delay).await;
        self.inner.encode_blob(data, params).await
    }
}

/// Wraps an encoder and delays the calls whose zero-based ordinal is
/// listed, leaving every other call untouched. Used to pin one request in
/// flight while others complete.
pub struct SlowCallsEncoder<E> {
    inner: E,
    slow_calls: Vec<usize>,
    delay: Duration,
    counter: AtomicUsize,
}

impl<E> SlowCallsEncoder<E> {
    pub fn new(inner: E, slow_calls: Vec<usize>, delay: Duration) -> Self {
        SlowCallsEncoder {
            inner,
            slow_calls,
            delay,
            counter: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<E: EncoderClient> EncoderClient for SlowCallsEncoder<E> {
    async fn encode_blob(
        &self,
        data: &[u8],
        params: EncodingParams,
    ) -> Result<(BlobCommitments, Vec<Chunk>), EncodeError> {
        let call = self.counter.fetch_add(1, Ordering::SeqCst);
        if self.slow_calls.contains(&call) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.encode_blob(data, params).await
    }
}

/// Wraps an encoder and fails the calls whose zero-based ordinal is listed,
/// for exercising partial-quorum outcomes.
pub struct FailingEncoder<E> {
    inner: E,
    fail_calls: Vec<usize>,
    counter: AtomicUsize,
}

impl<E> FailingEncoder<E> {
    pub fn new(inner: E, fail_calls: Vec<usize>) -> Self {
        FailingEncoder {
            inner,
            fail_calls,
            counter: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<E: EncoderClient> EncoderClient for FailingEncoder<E> {
    async fn encode_blob(
        &self,
        data: &[u8],
        params: EncodingParams,
    ) -> Result<(BlobCommitments, Vec<Chunk>), EncodeError> {
        let call = self.counter.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls.contains(&call) {
            return Err(EncodeError::Encoder("injected encoder failure".into()));
        }
        self.inner.encode_blob(data, params).await
    }
}
