//! Collaborator interfaces consumed by the router: the pairwise exchange
//! primitive and the custody transfer capability.

pub mod adapter;
pub mod transfer;

/// State that can be snapshotted and restored.
///
/// The router checkpoints every collaborator before a session opens and
/// restores the checkpoint if the session fails, so a failed call leaves
/// no trace in pool state or balances.
pub trait Transactional {
    type Checkpoint;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}
