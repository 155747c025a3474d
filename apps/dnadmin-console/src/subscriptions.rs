//! Dispatch router: binds every push topic to exactly one store action.
//!
//! Payload shaping happens here (progress-log clear split, device-list
//! unwrap); the store never sees wire shapes.

use std::sync::Arc;

use anyhow::bail;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use dnadmin_events::Subscriptions;
use dnadmin_protocol::{
    AutoUpdateData, ChainData, DeviceList, DirectoryDnp, InstalledDnp, ProgressLog,
    PushNotification, SystemInfo, UserActionLog, VolumeData,
};
use dnadmin_topics as topics;

use crate::store::{Action, AppStore};

/// Register one listener per topic. The returned handles live as long as
/// the current session scope; a reload discards them together with the
/// store.
pub fn register(
    subs: &Subscriptions,
    store: Arc<AppStore>,
    reload_tx: mpsc::UnboundedSender<()>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    let s = store.clone();
    handles.push(subs.on::<AutoUpdateData, _, _>(topics::TOPIC_AUTO_UPDATE_DATA, move |data| {
        let s = s.clone();
        async move {
            s.apply(Action::SetAutoUpdateData(data)).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<Vec<ChainData>, _, _>(topics::TOPIC_CHAIN_DATA, move |chains| {
        let s = s.clone();
        async move {
            s.apply(Action::SetChainData(chains)).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<Vec<DirectoryDnp>, _, _>(topics::TOPIC_DIRECTORY, move |directory| {
        let s = s.clone();
        async move {
            s.apply(Action::SetDirectory(directory)).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<Vec<InstalledDnp>, _, _>(topics::TOPIC_PACKAGES, move |installed| {
        let s = s.clone();
        async move {
            s.apply(Action::SetInstalledPackages(installed)).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<ProgressLog, _, _>(topics::TOPIC_PROGRESS_LOG, move |progress| {
        let s = s.clone();
        async move {
            if progress.clear {
                s.apply(Action::ClearInstallingLog { id: progress.id }).await;
                return Ok(());
            }
            let ProgressLog {
                id,
                name: Some(dnp_name),
                message: Some(log),
                ..
            } = progress
            else {
                bail!("progress log without name or message");
            };
            s.apply(Action::UpdateInstallingLog { id, dnp_name, log }).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<PushNotification, _, _>(
        topics::TOPIC_PUSH_NOTIFICATION,
        move |notification| {
            let s = s.clone();
            async move {
                s.apply(Action::PushNotification(notification)).await;
                Ok(())
            }
        },
    ));

    let s = store.clone();
    handles.push(subs.on::<SystemInfo, _, _>(topics::TOPIC_SYSTEM_INFO, move |info| {
        let s = s.clone();
        async move {
            s.apply(Action::SetSystemInfo(info)).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<UserActionLog, _, _>(topics::TOPIC_USER_ACTION_LOG, move |log| {
        let s = s.clone();
        async move {
            s.apply(Action::PushUserActionLog(log)).await;
            Ok(())
        }
    }));

    let s = store.clone();
    handles.push(subs.on::<Vec<VolumeData>, _, _>(topics::TOPIC_VOLUMES, move |volumes| {
        let s = s.clone();
        async move {
            s.apply(Action::SetVolumes(volumes)).await;
            Ok(())
        }
    }));

    // The dappmanager may ask the console to reload. Unconditional: the
    // whole session scope, store included, is torn down and rebuilt.
    handles.push(subs.on::<Value, _, _>(topics::TOPIC_RELOAD_CLIENT, move |data| {
        let reload_tx = reload_tx.clone();
        async move {
            tracing::warn!("dappmanager triggered a client reload: {}", data);
            let _ = reload_tx.send(());
            Ok(())
        }
    }));

    // Historical wire shape wraps the device array as `[devices]`.
    let s = store.clone();
    handles.push(subs.on::<(DeviceList,), _, _>(topics::TOPIC_VPN_DEVICES, move |(devices,)| {
        let s = s.clone();
        async move {
            s.apply(Action::SetDevices(devices)).await;
            Ok(())
        }
    }));

    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnadmin_events::Bus;
    use serde_json::json;
    use std::time::Duration;

    async fn wait_for_version(store: &AppStore, at_least: u64) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.version() < at_least {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("store to observe the dispatched actions");
    }

    fn wire(bus: &Bus) -> (Arc<AppStore>, mpsc::UnboundedReceiver<()>) {
        let store = AppStore::new();
        let subs = Subscriptions::new(bus.clone());
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();
        register(&subs, store.clone(), reload_tx);
        (store, reload_rx)
    }

    #[tokio::test]
    async fn progress_log_events_upsert_then_clear() {
        let bus = Bus::new(32);
        let (store, _reload_rx) = wire(&bus);

        bus.publish(
            topics::TOPIC_PROGRESS_LOG,
            &json!({"id": "X", "name": "bitcoin.dnp.dappnode.eth", "message": "50%"}),
        );
        wait_for_version(&store, 1).await;
        let by_dnp = store.progress_logs_by_dnp().await;
        assert_eq!(
            by_dnp["bitcoin.dnp.dappnode.eth"]["bitcoin.dnp.dappnode.eth"],
            "50%"
        );

        bus.publish(topics::TOPIC_PROGRESS_LOG, &json!({"id": "X", "clear": true}));
        wait_for_version(&store, 2).await;
        assert!(store.progress_logs_by_dnp().await.is_empty());
    }

    #[tokio::test]
    async fn device_list_wrapper_is_unwrapped() {
        let bus = Bus::new(32);
        let (store, _reload_rx) = wire(&bus);

        bus.publish(
            topics::TOPIC_VPN_DEVICES,
            &json!([[{"id": "MyPhone", "isAdmin": false}, {"id": "Admin", "isAdmin": true}]]),
        );
        wait_for_version(&store, 1).await;
        let devices = store.with_state(|s| s.devices.clone()).await;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "MyPhone");
        assert!(devices[1].is_admin);
    }

    #[tokio::test]
    async fn reload_directive_signals_the_session_scope() {
        let bus = Bus::new(32);
        let (_store, mut reload_rx) = wire(&bus);

        bus.publish(topics::TOPIC_RELOAD_CLIENT, &json!({"reason": "update"}));
        tokio::time::timeout(Duration::from_secs(2), reload_rx.recv())
            .await
            .expect("reload signal within 2s")
            .expect("channel open");
    }

    #[tokio::test]
    async fn malformed_progress_log_does_not_stop_the_topic() {
        let bus = Bus::new(32);
        let (store, _reload_rx) = wire(&bus);

        // Missing name/message and not a clear: handler reports an error...
        bus.publish(topics::TOPIC_PROGRESS_LOG, &json!({"id": "X"}));
        // ...and the next message on the same topic still lands.
        bus.publish(
            topics::TOPIC_PROGRESS_LOG,
            &json!({"id": "X", "name": "geth.dnp.dappnode.eth", "message": "started"}),
        );
        wait_for_version(&store, 1).await;
        let by_dnp = store.progress_logs_by_dnp().await;
        assert_eq!(by_dnp["geth.dnp.dappnode.eth"]["geth.dnp.dappnode.eth"], "started");
    }

    #[tokio::test]
    async fn system_info_replaces_previous_record() {
        let bus = Bus::new(32);
        let (store, _reload_rx) = wire(&bus);

        bus.publish(
            topics::TOPIC_SYSTEM_INFO,
            &json!({"version": "0.2.0", "ethClientTarget": "remote"}),
        );
        bus.publish(
            topics::TOPIC_SYSTEM_INFO,
            &json!({"version": "0.2.1", "ethClientTarget": "geth"}),
        );
        wait_for_version(&store, 2).await;
        assert_eq!(
            store.eth_client_target().await,
            Some(dnadmin_protocol::EthClientTarget::Geth)
        );
    }
}
