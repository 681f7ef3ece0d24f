use std::collections::BTreeMap;

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::chain::OperatorState;
use crate::data::{OperatorID, QuorumID};
use crate::errors::AssignmentError;

/// A contiguous `[start_index, start_index + num_chunks)` slice of the
/// chunk domain allocated to one operator within one quorum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub start_index: usize,
    pub num_chunks: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    pub total_chunks: usize,
}

/// Maps operator stakes to chunk ranges and derives the chunk length a blob
/// needs for a given quorum configuration.
pub trait AssignmentCoordinator: Send + Sync {
    fn get_assignments(
        &self,
        state: &OperatorState,
        quorum_id: QuorumID,
        quantization_factor: u64,
    ) -> Result<(BTreeMap<OperatorID, Assignment>, AssignmentInfo), AssignmentError>;

    fn get_minimum_chunk_length(
        &self,
        num_operators: usize,
        blob_length_symbols: u64,
        quantization_factor: u64,
        quorum_threshold: u8,
        adversary_threshold: u8,
    ) -> Result<u64, AssignmentError>;
}

/// Stake-proportional assignment: the chunk domain holds
/// `num_operators × quantization_factor` chunks, each operator receives
/// `ceil(stake_share × domain)` of them, laid out contiguously in operator-ID
/// order.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdAssignmentCoordinator;

impl AssignmentCoordinator for StdAssignmentCoordinator {
    fn get_assignments(
        &self,
        state: &OperatorState,
        quorum_id: QuorumID,
        quantization_factor: u64,
    ) -> Result<(BTreeMap<OperatorID, Assignment>, AssignmentInfo), AssignmentError> {
        if quantization_factor == 0 {
            return Err(AssignmentError::InvalidQuantization);
        }
        let operators = state
            .operators
            .get(&quorum_id)
            .ok_or(AssignmentError::QuorumNotFound(quorum_id))?;
        if operators.is_empty() {
            return Err(AssignmentError::NoOperators);
        }
        let total_stake: u128 = operators.values().map(|op| op.stake).sum();
        if total_stake == 0 {
            return Err(AssignmentError::ZeroTotalStake);
        }

        let chunk_domain = operators.len() as u128 * quantization_factor as u128;
        let mut assignments = BTreeMap::new();
        let mut next_index = 0usize;
        for (operator_id, info) in operators {
            let num_chunks = (info.stake * chunk_domain)
                .div_ceil(total_stake)
                .to_usize()
                .ok_or(AssignmentError::ParameterOverflow)?;
            assignments.insert(
                *operator_id,
                Assignment {
                    start_index: next_index,
                    num_chunks,
                },
            );
            next_index += num_chunks;
        }

        Ok((
            assignments,
            AssignmentInfo {
                total_chunks: next_index,
            },
        ))
    }

    fn get_minimum_chunk_length(
        &self,
        num_operators: usize,
        blob_length_symbols: u64,
        quantization_factor: u64,
        quorum_threshold: u8,
        adversary_threshold: u8,
    ) -> Result<u64, AssignmentError> {
        if quorum_threshold <= adversary_threshold {
            return Err(AssignmentError::InvalidThresholds {
                quorum_threshold,
                adversary_threshold,
            });
        }
        if num_operators == 0 {
            return Err(AssignmentError::NoOperators);
        }
        if quantization_factor == 0 {
            return Err(AssignmentError::InvalidQuantization);
        }

        // The quorum must hold enough evaluations that any subset clearing
        // the threshold gap can reconstruct the blob.
        let threshold_gap = (quorum_threshold - adversary_threshold) as u64;
        let encoded_length = (blob_length_symbols * 100).div_ceil(threshold_gap);
        let chunk_domain = num_operators as u64 * quantization_factor;
        let chunk_length = encoded_length.div_ceil(chunk_domain).max(1);
        chunk_length
            .checked_next_power_of_two()
            .ok_or(AssignmentError::ParameterOverflow)
    }
}
