//! Header-sync launch strategy capability (§9 Design Notes).
//!
//! This sits *above* the backfill engine — deciding whether the chain
//! starts syncing from genesis or from a checkpoint is the header-sync
//! launch strategy's job, and that is explicitly out of scope for this
//! crate (§1). It is modeled here only because §9 calls out its shape as a
//! two-variant capability interface rather than an inheritance hierarchy;
//! nothing in `backfill` calls into it.

use backfill_types::Hash;

/// How the embedding client decided to start chain sync.
#[async_trait::async_trait]
pub trait ChainLaunchStrategy: Send + Sync {
    /// Runs whatever setup the strategy needs before sync can start (e.g.
    /// fetching and verifying a checkpoint block).
    async fn fulfill_prerequisites(&self) -> Result<(), LaunchError>;

    /// The parent hash of the genesis block, needed to validate the first
    /// header batch regardless of where sync actually starts.
    fn get_genesis_parent_hash(&self) -> Hash;

    /// The block number sync should resume from.
    fn get_starting_block_number(&self) -> u64;
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to fulfill launch prerequisites: {0}")]
    PrerequisitesFailed(String),
}

/// Starts from the genesis block.
#[derive(Debug)]
pub struct FromGenesis {
    genesis_parent_hash: Hash,
}

impl FromGenesis {
    pub fn new(genesis_parent_hash: Hash) -> Self {
        Self { genesis_parent_hash }
    }
}

#[async_trait::async_trait]
impl ChainLaunchStrategy for FromGenesis {
    async fn fulfill_prerequisites(&self) -> Result<(), LaunchError> {
        Ok(())
    }

    fn get_genesis_parent_hash(&self) -> Hash {
        self.genesis_parent_hash
    }

    fn get_starting_block_number(&self) -> u64 {
        0
    }
}

/// Starts from a pre-verified checkpoint block.
#[derive(Debug)]
pub struct FromCheckpoint {
    genesis_parent_hash: Hash,
    checkpoint_block_number: u64,
}

impl FromCheckpoint {
    pub fn new(genesis_parent_hash: Hash, checkpoint_block_number: u64) -> Self {
        Self { genesis_parent_hash, checkpoint_block_number }
    }
}

#[async_trait::async_trait]
impl ChainLaunchStrategy for FromCheckpoint {
    async fn fulfill_prerequisites(&self) -> Result<(), LaunchError> {
        Ok(())
    }

    fn get_genesis_parent_hash(&self) -> Hash {
        self.genesis_parent_hash
    }

    fn get_starting_block_number(&self) -> u64 {
        self.checkpoint_block_number
    }
}
