//! Per-sender serialization
//!
//! Messages from one sender must be handled in arrival order because session
//! mutations do not commute. Each sender gets its own async mutex; different
//! senders never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::SenderId;

/// Idle lanes are pruned once the map grows past this size
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Default)]
pub struct SenderLanes {
    lanes: Mutex<HashMap<SenderId, Arc<AsyncMutex<()>>>>,
}

impl SenderLanes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the sender's lane. The lane is released when the guard drops,
    /// including when the owning future is cancelled.
    pub async fn acquire(&self, sender: &SenderId) -> OwnedMutexGuard<()> {
        let lane = {
            let mut lanes = self.lanes.lock().unwrap_or_else(|e| e.into_inner());
            if lanes.len() > PRUNE_THRESHOLD {
                lanes.retain(|_, lane| Arc::strong_count(lane) > 1);
            }
            lanes
                .entry(sender.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lane.lock_owned().await
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
