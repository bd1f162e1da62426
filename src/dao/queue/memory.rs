use std::{collections::VecDeque, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use super::{ClaimHandle, ClaimedEntrant, PendingQueue, QueueError, QueueResult};
use crate::dao::models::Entrant;

/// In-process pending queue guarded by a single mutex.
///
/// Claiming pops the oldest entrant and parks it in the in-flight map, so no
/// two consumers can pair with the same entrant. There is no visibility
/// timer: a claim stays invisible until the holder deletes or releases it.
#[derive(Clone, Default)]
pub struct MemoryPendingQueue {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    waiting: VecDeque<Entrant>,
    in_flight: Vec<(ClaimHandle, Entrant)>,
    next_handle: ClaimHandle,
}

impl MemoryPendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    async fn enqueue(&self, entrant: Entrant) {
        let mut inner = self.inner.lock().await;
        inner.waiting.push_back(entrant);
    }

    async fn receive_one(&self) -> Option<ClaimedEntrant> {
        let mut inner = self.inner.lock().await;
        let entrant = inner.waiting.pop_front()?;
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.in_flight.push((handle, entrant.clone()));
        Some(ClaimedEntrant { entrant, handle })
    }

    async fn delete(&self, handle: ClaimHandle) -> QueueResult<()> {
        let mut inner = self.inner.lock().await;
        let index = inner
            .in_flight
            .iter()
            .position(|(held, _)| *held == handle)
            .ok_or(QueueError::UnknownClaim { handle })?;
        inner.in_flight.remove(index);
        Ok(())
    }

    async fn release(&self, handle: ClaimHandle) -> QueueResult<()> {
        let mut inner = self.inner.lock().await;
        let index = inner
            .in_flight
            .iter()
            .position(|(held, _)| *held == handle)
            .ok_or(QueueError::UnknownClaim { handle })?;
        let (_, entrant) = inner.in_flight.remove(index);
        // Released entrants keep their place at the head of the line.
        inner.waiting.push_front(entrant);
        Ok(())
    }
}

impl PendingQueue for MemoryPendingQueue {
    fn enqueue(&self, entrant: Entrant) -> BoxFuture<'static, QueueResult<()>> {
        let queue = self.clone();
        Box::pin(async move {
            queue.enqueue(entrant).await;
            Ok(())
        })
    }

    fn receive_one(&self) -> BoxFuture<'static, QueueResult<Option<ClaimedEntrant>>> {
        let queue = self.clone();
        Box::pin(async move { Ok(queue.receive_one().await) })
    }

    fn delete(&self, handle: ClaimHandle) -> BoxFuture<'static, QueueResult<()>> {
        let queue = self.clone();
        Box::pin(async move { queue.delete(handle).await })
    }

    fn release(&self, handle: ClaimHandle) -> BoxFuture<'static, QueueResult<()>> {
        let queue = self.clone();
        Box::pin(async move { queue.release(handle).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrant(connection_id: &str, name: &str) -> Entrant {
        Entrant {
            connection_id: connection_id.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn receive_on_empty_queue_yields_none() {
        let queue = MemoryPendingQueue::new();
        assert_eq!(queue.receive_one().await, None);
    }

    #[tokio::test]
    async fn claims_are_exclusive() {
        let queue = MemoryPendingQueue::new();
        queue.enqueue(entrant("c1", "alice")).await;

        let claimed = queue.receive_one().await.expect("one entrant queued");
        assert_eq!(claimed.entrant.name, "alice");
        // The claimed entrant is invisible to a second consumer.
        assert_eq!(queue.receive_one().await, None);
    }

    #[tokio::test]
    async fn delete_discards_the_claim_for_good() {
        let queue = MemoryPendingQueue::new();
        queue.enqueue(entrant("c1", "alice")).await;

        let claimed = queue.receive_one().await.unwrap();
        queue.delete(claimed.handle).await.unwrap();

        assert_eq!(queue.receive_one().await, None);
        // The receipt is spent.
        assert!(matches!(
            queue.delete(claimed.handle).await,
            Err(QueueError::UnknownClaim { .. })
        ));
    }

    #[tokio::test]
    async fn release_restores_the_entrant_at_the_front() {
        let queue = MemoryPendingQueue::new();
        queue.enqueue(entrant("c1", "alice")).await;
        queue.enqueue(entrant("c2", "bob")).await;

        let claimed = queue.receive_one().await.unwrap();
        assert_eq!(claimed.entrant.name, "alice");
        queue.release(claimed.handle).await.unwrap();

        let next = queue.receive_one().await.unwrap();
        assert_eq!(next.entrant.name, "alice");
    }

    #[tokio::test]
    async fn fifo_order_is_kept() {
        let queue = MemoryPendingQueue::new();
        queue.enqueue(entrant("c1", "alice")).await;
        queue.enqueue(entrant("c2", "bob")).await;

        assert_eq!(queue.receive_one().await.unwrap().entrant.name, "alice");
        assert_eq!(queue.receive_one().await.unwrap().entrant.name, "bob");
    }
}
