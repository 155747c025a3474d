//! In-process event bus and typed subscription adapter.
//!
//! The session layer publishes every inbound push message as an
//! [`Envelope`]; [`Subscriptions`] hands each topic's payloads to typed
//! callbacks, isolating failures per callback so one misbehaving handler
//! cannot break delivery to the others.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Minimal event envelope (RFC3339 time).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Envelope {
    pub time: String,
    pub topic: String,
    pub payload: Value,
}

/// A simple broadcast bus for JSON-serializable events.
///
/// No acknowledgement, retry, or replay: a lagging receiver loses the oldest
/// messages, and nothing is redelivered after a disconnect. Reconnection and
/// resubscription belong to the session layer.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Envelope>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    pub fn publish<T: Serialize>(&self, topic: &str, payload: &T) {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let val =
            serde_json::to_value(payload).unwrap_or_else(|_| serde_json::json!({"_ser":"error"}));
        let _ = self.tx.send(Envelope {
            time: now,
            topic: topic.to_string(),
            payload: val,
        });
    }
}

/// Registers typed per-topic listeners against a [`Bus`].
///
/// Each registration owns an independent receiver, so multiple listeners on
/// the same topic all fire (fan-out) and see that topic's messages in
/// publish order. No ordering holds across topics.
#[derive(Clone)]
pub struct Subscriptions {
    bus: Bus,
}

impl Subscriptions {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// Invoke `callback` once per inbound message on `topic`.
    ///
    /// A callback error is logged with the topic name and full error chain
    /// and does not unsubscribe the listener or affect later messages.
    /// Payloads that fail to decode as `T` are logged and skipped.
    pub fn on<T, F, Fut>(&self, topic: &'static str, callback: F) -> JoinHandle<()>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(env) => {
                        if env.topic != topic {
                            continue;
                        }
                        let payload = match serde_json::from_value::<T>(env.payload) {
                            Ok(payload) => payload,
                            Err(err) => {
                                tracing::warn!("undecodable payload on {}: {}", topic, err);
                                continue;
                            }
                        };
                        if let Err(err) = callback(payload).await {
                            tracing::error!("error on {}: {:#}", topic, err);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("listener on {} lagged; {} messages lost", topic, missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn recv_soon<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("delivery within 2s")
            .expect("channel open")
    }

    #[tokio::test]
    async fn fans_out_to_every_listener_on_a_topic() {
        let bus = Bus::new(16);
        let subs = Subscriptions::new(bus.clone());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        subs.on::<String, _, _>("chain.data", move |msg| {
            let tx = tx_a.clone();
            async move {
                tx.send(msg).ok();
                Ok(())
            }
        });
        subs.on::<String, _, _>("chain.data", move |msg| {
            let tx = tx_b.clone();
            async move {
                tx.send(msg).ok();
                Ok(())
            }
        });

        bus.publish("chain.data", &"syncing");
        assert_eq!(recv_soon(&mut rx_a).await, "syncing");
        assert_eq!(recv_soon(&mut rx_b).await, "syncing");
    }

    #[tokio::test]
    async fn failing_callback_does_not_suppress_later_deliveries() {
        let bus = Bus::new(16);
        let subs = Subscriptions::new(bus.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let seen = calls.clone();
        subs.on::<String, _, _>("progress.log", move |_msg| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow!("handler blew up")) }
        });
        subs.on::<String, _, _>("progress.log", move |msg| {
            let tx = tx.clone();
            async move {
                tx.send(msg).ok();
                Ok(())
            }
        });

        bus.publish("progress.log", &"first");
        bus.publish("progress.log", &"second");

        assert_eq!(recv_soon(&mut rx).await, "first");
        assert_eq!(recv_soon(&mut rx).await, "second");
        // The throwing listener kept receiving too.
        tokio::time::timeout(Duration::from_secs(2), async {
            while calls.load(Ordering::SeqCst) < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("failing listener stays subscribed");
    }

    #[tokio::test]
    async fn undecodable_payload_is_skipped_not_fatal() {
        let bus = Bus::new(16);
        let subs = Subscriptions::new(bus.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        subs.on::<u64, _, _>("volumes", move |n| {
            let tx = tx.clone();
            async move {
                tx.send(n).ok();
                Ok(())
            }
        });

        bus.publish("volumes", &json!({"not": "a number"}));
        bus.publish("volumes", &7u64);
        assert_eq!(recv_soon(&mut rx).await, 7);
    }

    #[tokio::test]
    async fn listeners_only_see_their_own_topic_in_order() {
        let bus = Bus::new(16);
        let subs = Subscriptions::new(bus.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        subs.on::<u64, _, _>("a", move |n| {
            let tx = tx.clone();
            async move {
                tx.send(n).ok();
                Ok(())
            }
        });

        bus.publish("b", &99u64);
        bus.publish("a", &1u64);
        bus.publish("b", &98u64);
        bus.publish("a", &2u64);

        assert_eq!(recv_soon(&mut rx).await, 1);
        assert_eq!(recv_soon(&mut rx).await, 2);
    }
}
