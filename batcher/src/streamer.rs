use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use eigenda_core::assignment::AssignmentCoordinator;
use eigenda_core::chain::IndexedChainState;
use eigenda_core::data::{Blob, BlobKey, BlobMetadata, BlobStatus, Chunk, OperatorID, QuorumID};
use eigenda_core::disperser::{BlobStore, EncoderClient};
use eigenda_core::errors::EncodeError;
use eigenda_core::header::{BatchHeader, BlobHeader, BlobQuorumInfo};
use eigenda_core::params::{blob_length_symbols, EncodingParams};

use crate::batch::{Batch, BatchMetadata, BlobMessage, EncodedBlob, QuorumInfo};
use crate::notifier::EncodedSizeNotifier;
use crate::store::{EncodedBlobStore, EncodingResult, EncodingResultOrStatus};
use crate::worker_pool::WorkerPool;
use crate::StreamerError;

/// Chunks per operator before stake weighting.
pub const QUANTIZATION_FACTOR: u64 = 1;

/// Chunk bundles of one blob, grouped per operator and per quorum, before
/// the blob header is attached.
type EncodedBlobBundles = BTreeMap<OperatorID, BTreeMap<QuorumID, Vec<Chunk>>>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamerConfig {
    /// Order of the SRS the encoder backend holds; encoding parameters are
    /// validated against it before a request is dispatched.
    pub srs_order: u64,
    /// Timeout applied to each individual encoding request.
    pub encoding_request_timeout: Duration,
    /// Maximum number of encoding requests that may be queued in the
    /// worker pool.
    pub encoding_queue_limit: usize,
    /// Number of workers encoding concurrently.
    pub pool_size: usize,
    /// Cadence of the requester tick.
    pub encoding_interval: Duration,
}

/// State guarded by the streamer lock: the reference block the current
/// iteration encodes against, and the cancel handles of every in-flight
/// encode context.
struct StreamerState {
    reference_block_number: u64,
    encoding_cancel_tokens: Vec<CancellationToken>,
}

struct PendingRequest {
    blob_quorum_info: BlobQuorumInfo,
    params: EncodingParams,
}

/// The continuously running encoding pipeline of the dispersal batcher.
///
/// A requester task ticks every [StreamerConfig::encoding_interval],
/// pulling processing blobs, deduplicating against outstanding work, and
/// dispatching encode jobs through a bounded worker pool. A single ingester
/// task serially folds completed results into the [EncodedBlobStore] and
/// arms the size notifier. [EncodingStreamer::create_batch] drains the
/// store into a Merkle-committed batch, cancelling whatever is still in
/// flight.
pub struct EncodingStreamer {
    config: StreamerConfig,
    pub encoded_blob_store: EncodedBlobStore,
    state: RwLock<StreamerState>,
    pool: WorkerPool,
    notifier: Arc<EncodedSizeNotifier>,

    blob_store: Arc<dyn BlobStore>,
    chain_state: Arc<dyn IndexedChainState>,
    encoder_client: Arc<dyn EncoderClient>,
    assignment_coordinator: Arc<dyn AssignmentCoordinator>,
}

impl EncodingStreamer {
    pub fn new(
        config: StreamerConfig,
        blob_store: Arc<dyn BlobStore>,
        chain_state: Arc<dyn IndexedChainState>,
        encoder_client: Arc<dyn EncoderClient>,
        assignment_coordinator: Arc<dyn AssignmentCoordinator>,
        notifier: Arc<EncodedSizeNotifier>,
    ) -> Result<Self, StreamerError> {
        if config.encoding_queue_limit == 0 {
            return Err(StreamerError::InvalidQueueLimit);
        }
        let pool = WorkerPool::new(config.pool_size);
        Ok(EncodingStreamer {
            config,
            encoded_blob_store: EncodedBlobStore::new(),
            state: RwLock::new(StreamerState {
                reference_block_number: 0,
                encoding_cancel_tokens: Vec::new(),
            }),
            pool,
            notifier,
            blob_store,
            chain_state,
            encoder_client,
            assignment_coordinator,
        })
    }

    /// Spawns the requester and ingester tasks. Both terminate when
    /// `cancel` fires.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) {
        let (encoder_tx, mut encoder_rx) = mpsc::unbounded_channel::<EncodingResultOrStatus>();

        // ingester: serially folds encode outcomes into the store
        let streamer = Arc::clone(self);
        let ingester_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ingester_cancel.cancelled() => break,
                    response = encoder_rx.recv() => {
                        let Some(response) = response else { break };
                        if let Err(err) = streamer.process_encoded_blobs(response) {
                            // cancelled requests are an expected outcome of
                            // batch creation, not an encode failure
                            if !matches!(err, StreamerError::Encode(EncodeError::Cancelled)) {
                                error!("error processing encoded blobs: {err}");
                            }
                        }
                    }
                }
            }
        });

        // requester: ticks the encode dispatch
        let streamer = Arc::clone(self);
        tokio::spawn(async move {
            let interval = streamer.config.encoding_interval;
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = streamer.request_encoding(&encoder_tx, &cancel).await {
                            error!("error requesting encoding: {err}");
                        }
                    }
                }
            }
        });
    }

    /// One requester tick: pull processing blobs, dedup, resolve operator
    /// assignments at the reference block, and dispatch encode jobs.
    pub async fn request_encoding(
        &self,
        encoder_tx: &mpsc::UnboundedSender<EncodingResultOrStatus>,
        lifetime: &CancellationToken,
    ) -> Result<(), StreamerError> {
        let metadatas = self
            .blob_store
            .get_blob_metadata_by_status(BlobStatus::Processing)
            .await?;
        if metadatas.is_empty() {
            debug!("no new metadatas to encode");
            return Ok(());
        }

        let mut reference_block_number = self.state.read().await.reference_block_number;
        if reference_block_number == 0 {
            // adopt the current block for this iteration; it stays fixed
            // until the next batch is created
            let block_number = self.chain_state.get_current_block_number().await?;
            self.state.write().await.reference_block_number = block_number;
            reference_block_number = block_number;
        }

        let metadatas = self.dedup_requests(metadatas, reference_block_number);
        if metadatas.is_empty() {
            debug!("no new metadatas to encode");
            return Ok(());
        }

        let waiting_queue_size = self.pool.waiting_queue_size();
        let capacity = self
            .config
            .encoding_queue_limit
            .saturating_sub(waiting_queue_size);
        if capacity == 0 {
            warn!(
                waiting_queue_size,
                encoding_queue_limit = self.config.encoding_queue_limit,
                "worker pool queue is full, skipping this round of encoding requests"
            );
            return Ok(());
        }
        let metadatas: Vec<BlobMetadata> = metadatas.into_iter().take(capacity).collect();
        debug!(
            num_metadata = metadatas.len(),
            reference_block_number, "new metadatas to encode"
        );

        let batch_metadata = self
            .get_batch_metadata(&metadatas, reference_block_number)
            .await?;

        let blobs = self.blob_store.get_blobs_by_metadata(&metadatas).await?;

        for metadata in &metadatas {
            let Some(blob) = blobs.get(&metadata.blob_key) else {
                warn!(blob_key = %metadata.blob_key, "blob data missing from store, skipping");
                continue;
            };
            self.request_encoding_for_blob(
                metadata,
                blob,
                &batch_metadata,
                reference_block_number,
                encoder_tx,
                lifetime,
            )
            .await;
        }

        Ok(())
    }

    /// Keeps a metadata only if at least one of its quorums has no
    /// outstanding request at this reference block.
    fn dedup_requests(
        &self,
        metadatas: Vec<BlobMetadata>,
        reference_block_number: u64,
    ) -> Vec<BlobMetadata> {
        metadatas
            .into_iter()
            .filter(|metadata| {
                !metadata.security_params.iter().all(|quorum| {
                    self.encoded_blob_store.has_encoding_requested(
                        metadata.blob_key,
                        quorum.quorum_id,
                        reference_block_number,
                    )
                })
            })
            .collect()
    }

    async fn request_encoding_for_blob(
        &self,
        metadata: &BlobMetadata,
        blob: &Blob,
        batch_metadata: &BatchMetadata,
        reference_block_number: u64,
        encoder_tx: &mpsc::UnboundedSender<EncodingResultOrStatus>,
        lifetime: &CancellationToken,
    ) {
        let blob_key = metadata.blob_key;

        // validate the encoding parameters for each quorum first
        let mut pending = Vec::with_capacity(metadata.security_params.len());
        for quorum in &metadata.security_params {
            if self.encoded_blob_store.has_encoding_requested(
                blob_key,
                quorum.quorum_id,
                reference_block_number,
            ) {
                continue;
            }
            let Some(quorum_info) = batch_metadata.quorum_infos.get(&quorum.quorum_id) else {
                warn!(
                    blob_key = %blob_key,
                    quorum_id = quorum.quorum_id,
                    "no assignment info for quorum, skipping"
                );
                continue;
            };

            let blob_length = blob_length_symbols(metadata.blob_size);
            let num_operators = quorum_info.assignments.len();
            let chunk_length = match self.assignment_coordinator.get_minimum_chunk_length(
                num_operators,
                blob_length,
                quorum_info.quantization_factor,
                quorum.quorum_threshold,
                quorum.adversary_threshold,
            ) {
                Ok(chunk_length) => chunk_length,
                Err(err) => {
                    // request parameters are checked before blobs enter the
                    // store, so this indicates a bad quorum configuration
                    error!(blob_key = %blob_key, "invalid request parameters: {err}");
                    continue;
                }
            };
            let params = match EncodingParams::from_mins(
                chunk_length,
                quorum_info.info.total_chunks as u64,
            ) {
                Ok(params) => params,
                Err(err) => {
                    error!(blob_key = %blob_key, "error getting encoding params: {err}");
                    continue;
                }
            };
            if let Err(err) = params.validate(blob_length, self.config.srs_order) {
                error!(blob_key = %blob_key, "invalid encoding params: {err}");
                // the blob can never validate; fail it instead of retrying
                if let Err(err) = self.blob_store.mark_blob_failed(&blob_key).await {
                    error!(blob_key = %blob_key, "error marking blob failed: {err}");
                }
                return;
            }

            pending.push(PendingRequest {
                blob_quorum_info: BlobQuorumInfo {
                    security_param: *quorum,
                    quantization_factor: quorum_info.quantization_factor,
                    encoded_blob_length: params.chunk_length
                        * quorum_info.quantization_factor
                        * num_operators as u64,
                },
                params,
            });
        }

        // dispatch the encode jobs
        for request in pending {
            let quorum_id = request.blob_quorum_info.security_param.quorum_id;

            // each request gets its own cancel handle, child of the
            // streamer lifetime: batch creation cancels them collectively,
            // because an encoding is only valid for its reference block
            let token = lifetime.child_token();
            self.state
                .write()
                .await
                .encoding_cancel_tokens
                .push(token.clone());

            self.encoded_blob_store
                .put_encoding_request(blob_key, quorum_id, reference_block_number);

            let encoder_client = Arc::clone(&self.encoder_client);
            let encoder_tx = encoder_tx.clone();
            let data = blob.data.clone();
            let metadata = metadata.clone();
            let assignments = batch_metadata.quorum_infos[&quorum_id].assignments.clone();
            let timeout = self.config.encoding_request_timeout;
            let params = request.params;
            let blob_quorum_info = request.blob_quorum_info;

            self.pool.submit(async move {
                let outcome = tokio::select! {
                    _ = token.cancelled() => Err(EncodeError::Cancelled),
                    encoded = tokio::time::timeout(
                        timeout,
                        encoder_client.encode_blob(&data, params),
                    ) => match encoded {
                        Ok(result) => result,
                        Err(_) => Err(EncodeError::Timeout),
                    },
                };
                let message = match outcome {
                    Ok((commitments, chunks)) => {
                        EncodingResultOrStatus::Success(EncodingResult {
                            metadata,
                            reference_block_number,
                            blob_quorum_info,
                            commitments,
                            chunks,
                            assignments,
                        })
                    }
                    Err(error) => EncodingResultOrStatus::Failure {
                        blob_key,
                        quorum_id,
                        error,
                    },
                };
                let _ = encoder_tx.send(message);
            });
        }
    }

    /// Folds one encode outcome into the store. Runs serially on the
    /// ingester task, so the notifier state transitions are race-free.
    pub fn process_encoded_blobs(
        &self,
        response: EncodingResultOrStatus,
    ) -> Result<(), StreamerError> {
        match response {
            EncodingResultOrStatus::Failure {
                blob_key,
                quorum_id,
                error,
            } => {
                self.encoded_blob_store
                    .delete_encoding_request(blob_key, quorum_id);
                Err(StreamerError::Encode(error))
            }
            EncodingResultOrStatus::Success(result) => {
                self.encoded_blob_store.put_encoding_result(result);
                let encoded_size = self.encoded_blob_store.get_encoded_result_size();
                if self.notifier.maybe_notify(encoded_size) {
                    info!(encoded_size, "encoded size threshold reached");
                }
                Ok(())
            }
        }
    }

    /// Seals the current iteration into a batch: cancels in-flight encodes,
    /// drains the store for the held reference block, groups chunks into
    /// per-operator bundles, and commits to the blob headers with a Merkle
    /// root.
    ///
    /// Meant to be called from a single driver at an interval exceeding the
    /// per-blob encoding latency. Returns
    /// [StreamerError::NoEncodedResults] when there is nothing to batch.
    pub async fn create_batch(&self) -> Result<Batch, StreamerError> {
        let mut state = self.state.write().await;

        // whatever is still in flight targets a reference block this batch
        // retires; cancel it all and let the next tick re-request
        if !state.encoding_cancel_tokens.is_empty() {
            info!(
                count = state.encoding_cancel_tokens.len(),
                "canceling outstanding encoding requests"
            );
            for token in state.encoding_cancel_tokens.drain(..) {
                token.cancel();
            }
        }

        if state.reference_block_number == 0 {
            // no requests happened since the last batch; still evict
            // results that can never be batched
            match self.chain_state.get_current_block_number().await {
                Ok(block_number) => {
                    let _ = self
                        .encoded_blob_store
                        .get_new_and_delete_stale_encoding_results(block_number);
                }
                Err(err) => {
                    error!("failed to get current block number, will not clean up the encoded blob store: {err}");
                }
            }
            return Err(StreamerError::NoEncodedResults);
        }
        let reference_block_number = state.reference_block_number;

        let mut encoded_results = self
            .encoded_blob_store
            .get_new_and_delete_stale_encoding_results(reference_block_number);

        // the store has been drained for this cycle; re-arm the notifier
        self.notifier.reset();

        info!(
            num_results = encoded_results.len(),
            reference_block_number, "creating a batch"
        );
        if encoded_results.is_empty() {
            return Err(StreamerError::NoEncodedResults);
        }

        // fixed order up front so every derived slice is deterministic
        encoded_results.sort_by_key(|result| (result.blob_key(), result.quorum_id()));

        let mut metadata_by_key: HashMap<BlobKey, BlobMetadata> = HashMap::new();
        let mut commitments_by_key = HashMap::new();
        let mut blob_quorums: HashMap<BlobKey, Vec<BlobQuorumInfo>> = HashMap::new();
        let mut bundles_by_key: HashMap<BlobKey, EncodedBlobBundles> = HashMap::new();

        for result in &encoded_results {
            // one result per (blob, quorum); multiple quorums of one blob
            // merge into the same per-operator map
            let blob_key = result.blob_key();
            metadata_by_key
                .entry(blob_key)
                .or_insert_with(|| result.metadata.clone());
            commitments_by_key
                .entry(blob_key)
                .or_insert(result.commitments);
            blob_quorums
                .entry(blob_key)
                .or_default()
                .push(result.blob_quorum_info);

            let operator_bundles = bundles_by_key.entry(blob_key).or_default();
            for (operator_id, assignment) in &result.assignments {
                let start = assignment.start_index;
                let end = start + assignment.num_chunks;
                let chunks =
                    result
                        .chunks
                        .get(start..end)
                        .ok_or(StreamerError::AssignmentOutOfRange {
                            start,
                            end,
                            len: result.chunks.len(),
                        })?;
                operator_bundles
                    .entry(*operator_id)
                    .or_default()
                    .entry(result.quorum_id())
                    .or_default()
                    .extend_from_slice(chunks);
            }
        }

        // a blob missing any of its requested quorums cannot be confirmed;
        // drop it from the batch and let the next tick re-encode it.
        // collect first, then delete, so the map is never mutated while
        // iterated.
        let mut incomplete = Vec::new();
        for (blob_key, metadata) in &metadata_by_key {
            let present: HashSet<QuorumID> = blob_quorums[blob_key]
                .iter()
                .map(|info| info.security_param.quorum_id)
                .collect();
            if metadata
                .security_params
                .iter()
                .any(|quorum| !present.contains(&quorum.quorum_id))
            {
                incomplete.push(*blob_key);
            }
        }
        for blob_key in incomplete {
            debug!(blob_key = %blob_key, "blob missing quorum results, deferring to next batch");
            metadata_by_key.remove(&blob_key);
        }

        if metadata_by_key.is_empty() {
            return Err(StreamerError::NoEncodedResults);
        }

        // materialize index-aligned slices in blob-key order
        let mut blob_keys: Vec<BlobKey> = metadata_by_key.keys().copied().collect();
        blob_keys.sort();

        let mut encoded_blobs = Vec::with_capacity(blob_keys.len());
        let mut blob_headers = Vec::with_capacity(blob_keys.len());
        let mut blob_metadata = Vec::with_capacity(blob_keys.len());
        for blob_key in &blob_keys {
            let header = BlobHeader {
                commitments: commitments_by_key[blob_key],
                quorum_infos: blob_quorums.remove(blob_key).unwrap_or_default(),
            };
            let encoded_blob: EncodedBlob = bundles_by_key
                .remove(blob_key)
                .unwrap_or_default()
                .into_iter()
                .map(|(operator_id, bundles)| {
                    (
                        operator_id,
                        BlobMessage {
                            blob_header: header.clone(),
                            bundles,
                        },
                    )
                })
                .collect();
            encoded_blobs.push(encoded_blob);
            blob_headers.push(header);
            blob_metadata.push(metadata_by_key.remove(blob_key).expect("key collected above"));
        }

        // refresh the aggregated operator state for the batch consumers
        let batch_metadata = self
            .get_batch_metadata(&blob_metadata, reference_block_number)
            .await?;

        let mut batch_header = BatchHeader::new(reference_block_number);
        let merkle_tree = batch_header.set_batch_root(&blob_headers)?;

        // the next iteration starts from a fresh block
        state.reference_block_number = 0;

        Ok(Batch {
            encoded_blobs,
            blob_headers,
            blob_metadata,
            batch_header,
            batch_metadata,
            merkle_tree,
        })
    }

    /// Resolves the operator state at `block_number` and derives the chunk
    /// assignment of every quorum the metadatas reference.
    async fn get_batch_metadata(
        &self,
        metadatas: &[BlobMetadata],
        block_number: u64,
    ) -> Result<BatchMetadata, StreamerError> {
        let quorum_ids: BTreeSet<QuorumID> = metadatas
            .iter()
            .flat_map(|metadata| metadata.security_params.iter().map(|q| q.quorum_id))
            .collect();
        let quorum_ids: Vec<QuorumID> = quorum_ids.into_iter().collect();

        let operator_state = self
            .chain_state
            .get_indexed_operator_state(block_number, &quorum_ids)
            .await?;

        let mut quorum_infos = BTreeMap::new();
        for quorum_id in quorum_ids {
            let (assignments, info) = self.assignment_coordinator.get_assignments(
                &operator_state,
                quorum_id,
                QUANTIZATION_FACTOR,
            )?;
            quorum_infos.insert(
                quorum_id,
                QuorumInfo {
                    assignments,
                    info,
                    quantization_factor: QUANTIZATION_FACTOR,
                },
            );
        }

        Ok(BatchMetadata {
            quorum_infos,
            operator_state,
        })
    }

    /// Reference block the current iteration encodes against; zero when
    /// unset.
    pub async fn reference_block_number(&self) -> u64 {
        self.state.read().await.reference_block_number
    }

    /// Number of in-flight encode cancel handles.
    pub async fn num_pending_cancellations(&self) -> usize {
        self.state.read().await.encoding_cancel_tokens.len()
    }
}
