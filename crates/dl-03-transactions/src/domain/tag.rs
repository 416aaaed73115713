use shared_types::{AccountDiff, BlockId};

/// Block and round a confirmed change belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockTag {
    pub block_id: BlockId,
    pub round: u64,
}

impl BlockTag {
    /// Attach the tag to `diff`.
    pub fn apply(self, diff: AccountDiff) -> AccountDiff {
        diff.in_block(self.block_id, self.round)
    }
}
