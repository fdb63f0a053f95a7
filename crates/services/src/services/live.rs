//! Push-based live query over responses: subscribers receive every new
//! ResponseRecord for a form as it is persisted.

use dashmap::DashMap;
use db::models::response::ResponseRecord;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// Per-form broadcast hub, shared behind the deployment.
#[derive(Debug, Default)]
pub struct ResponseBroadcaster {
    channels: DashMap<Uuid, broadcast::Sender<ResponseRecord>>,
}

impl ResponseBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to new responses for one form.
    pub fn subscribe(&self, form_id: Uuid) -> broadcast::Receiver<ResponseRecord> {
        self.channels
            .entry(form_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish a freshly persisted response to current subscribers. A send
    /// with no listeners is not an error.
    pub fn publish(&self, record: ResponseRecord) {
        if let Some(sender) = self.channels.get(&record.form_id) {
            let delivered = sender.send(record).unwrap_or(0);
            debug!(delivered, "published response to live subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(form_id: Uuid) -> ResponseRecord {
        ResponseRecord {
            id: Uuid::new_v4(),
            form_id,
            answers: "{}".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_records() {
        let hub = ResponseBroadcaster::new();
        let form_id = Uuid::new_v4();
        let mut rx = hub.subscribe(form_id);

        let published = record(form_id);
        hub.publish(published.clone());

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, published.id);
    }

    #[tokio::test]
    async fn publishing_is_scoped_per_form() {
        let hub = ResponseBroadcaster::new();
        let watched = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut rx = hub.subscribe(watched);

        hub.publish(record(other));
        assert!(rx.try_recv().is_err());

        hub.publish(record(watched));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let hub = ResponseBroadcaster::new();
        hub.publish(record(Uuid::new_v4()));
    }
}
