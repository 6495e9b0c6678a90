use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// In-process keyed mutex: at most one provisioning write per client at a time.
///
/// Complements the row lock taken on the client row inside the transaction,
/// which covers writers in other processes on backends that support it.
#[derive(Debug, Default)]
pub struct ClientLocks {
    enabled: bool,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ClientLocks {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `client_id`. Returns `None` when serialization is disabled.
    pub async fn acquire(&self, client_id: Uuid) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }
        let lock = Arc::clone(self.locks.entry(client_id).or_default().value());
        Some(lock.lock_owned().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_client_waits_for_holder() {
        let locks = Arc::new(ClientLocks::new(true));
        let client = Uuid::new_v4();

        let guard = locks.acquire(client).await;
        assert!(guard.is_some());

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(client).await.is_some() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        assert!(contender.await.unwrap_or(false));
    }

    #[tokio::test]
    async fn different_clients_do_not_block_each_other() {
        let locks = ClientLocks::new(true);
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn disabled_locks_hand_out_nothing() {
        let locks = ClientLocks::new(false);
        let client = Uuid::new_v4();
        assert!(locks.acquire(client).await.is_none());
        assert!(locks.acquire(client).await.is_none());
    }
}
