use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::McpError;
use crate::sync::LockExt;

/// What the reader task delivers to a request's waiting caller.
pub enum Delivery {
    Result(Value),
    Error(McpError),
}

type Sink = oneshot::Sender<Delivery>;

/// Tracks outstanding requests by id. Mutated by the caller task on issue
/// and by the reader task on response delivery (§5); a plain mutex is
/// sufficient since no await happens while the guard is held.
#[derive(Default)]
pub struct InFlightTable {
    sinks: Mutex<HashMap<i64, Sink>>,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: i64) -> oneshot::Receiver<Delivery> {
        let (tx, rx) = oneshot::channel();
        self.sinks.lock_ignore_poison().insert(id, tx);
        rx
    }

    pub fn remove(&self, id: i64) -> Option<Sink> {
        self.sinks.lock_ignore_poison().remove(&id)
    }

    /// Delivers `delivery` to the sink registered for `id`, if any. Returns
    /// `false` when no such sink exists (an unsolicited response, §8 S5).
    pub fn deliver(&self, id: i64, delivery: Delivery) -> bool {
        match self.remove(id) {
            Some(tx) => {
                let _ = tx.send(delivery);
                true
            }
            None => false,
        }
    }

    /// Drains every outstanding sink with `ConnectionClosed`, per the
    /// `close()` contract in §5.
    pub fn close_all(&self) {
        let mut sinks = self.sinks.lock_ignore_poison();
        for (_, tx) in sinks.drain() {
            let _ = tx.send(Delivery::Error(McpError::ConnectionClosed));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sinks.lock_ignore_poison().len()
    }
}
