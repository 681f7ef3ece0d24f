use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{OperatorID, QuorumID};
use crate::errors::ChainError;

/// Registration data of one operator within a quorum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub stake: u128,
}

/// Snapshot of the operator sets at one block. Operator maps are ordered by
/// operator ID so chunk assignment is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorState {
    pub operators: BTreeMap<QuorumID, BTreeMap<OperatorID, OperatorInfo>>,
    pub block_number: u64,
}

impl OperatorState {
    pub fn total_stake(&self, quorum_id: QuorumID) -> Option<u128> {
        self.operators
            .get(&quorum_id)
            .map(|ops| ops.values().map(|op| op.stake).sum())
    }
}

/// Read access to the indexed view of on-chain operator registrations. The
/// batcher resolves one state per reference block and derives every
/// assignment in a batch from that single snapshot.
#[async_trait]
pub trait IndexedChainState: Send + Sync {
    async fn get_current_block_number(&self) -> Result<u64, ChainError>;

    async fn get_indexed_operator_state(
        &self,
        block_number: u64,
        quorum_ids: &[QuorumID],
    ) -> Result<OperatorState, ChainError>;
}
