use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::warn;

pub const EVENT_INSERT: &str = "INSERT";
pub const EVENT_UPDATE: &str = "UPDATE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub event_type: String,
    pub record: Value,
    pub committed_at: i64,
}

/// Best-effort fan-out of store changes. Slow subscribers skip events; nothing is replayed.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish_insert<T: Serialize>(&self, table: &str, record: &T) {
        self.publish(table, EVENT_INSERT, record);
    }

    pub fn publish_update<T: Serialize>(&self, table: &str, record: &T) {
        self.publish(table, EVENT_UPDATE, record);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Runs `handler` for each insert into `table` accepted by `predicate` until the feed closes.
    pub fn on_insert<P, H>(&self, table: &str, predicate: P, mut handler: H) -> JoinHandle<()>
    where
        P: Fn(&ChangeEvent) -> bool + Send + 'static,
        H: FnMut(ChangeEvent) + Send + 'static,
    {
        let mut rx = self.subscribe();
        let table = table.to_string();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.table == table
                            && event.event_type == EVENT_INSERT
                            && predicate(&event)
                        {
                            handler(event);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(table = %table, skipped, "realtime subscriber lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn publish<T: Serialize>(&self, table: &str, event_type: &str, record: &T) {
        let record = match serde_json::to_value(record) {
            Ok(v) => v,
            Err(e) => {
                warn!(table = %table, error = %e, "failed to encode realtime record");
                return;
            }
        };
        // No receivers is the normal idle state.
        let _ = self.sender.send(ChangeEvent {
            table: table.to_string(),
            event_type: event_type.to_string(),
            record,
            committed_at: Utc::now().timestamp(),
        });
    }
}
