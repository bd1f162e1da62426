pub mod memory;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::models::Entrant;

/// Result alias for pending queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Error raised by pending queue backends.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A delete or release referenced a claim that is no longer held.
    #[error("unknown claim handle `{handle}`")]
    UnknownClaim { handle: ClaimHandle },
}

/// Opaque receipt identifying one claimed entrant until it is deleted or released.
pub type ClaimHandle = u64;

/// An entrant exclusively claimed from the queue, together with the receipt
/// needed to durably remove it (or hand it back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedEntrant {
    pub entrant: Entrant,
    pub handle: ClaimHandle,
}

/// Abstraction over the shared queue of clients waiting to be matched.
///
/// The essential contract is exclusive claiming: `receive_one` hands the
/// single oldest waiting entrant to exactly one caller. A claimed entrant is
/// invisible to other consumers until `delete` removes it for good or
/// `release` returns it to the front of the queue.
pub trait PendingQueue: Send + Sync {
    fn enqueue(&self, entrant: Entrant) -> BoxFuture<'static, QueueResult<()>>;
    fn receive_one(&self) -> BoxFuture<'static, QueueResult<Option<ClaimedEntrant>>>;
    fn delete(&self, handle: ClaimHandle) -> BoxFuture<'static, QueueResult<()>>;
    fn release(&self, handle: ClaimHandle) -> BoxFuture<'static, QueueResult<()>>;
}
