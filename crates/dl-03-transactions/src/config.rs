//! Configuration types for transaction logic.

use crate::domain::{FeeChange, FeeSchedule, FeeTable};
use serde::Deserialize;
use shared_types::{BlockId, PublicKey};

/// Transaction logic configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionConfig {
    /// Id of the genesis block; its transactions skip balance checks.
    pub genesis_block_id: Option<BlockId>,

    /// Generator of the genesis block; may not send outside it.
    pub genesis_public_key: Option<PublicKey>,

    /// Fees from height 1.
    pub fees: FeeTable,

    /// Later fee tables by height.
    pub fee_changes: Vec<FeeChange>,
}

impl TransactionConfig {
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.fees, self.fee_changes.clone())
    }
}
