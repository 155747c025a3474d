use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use dnadmin_events::{Bus, Subscriptions};

mod commands;
mod config;
mod confirm;
mod crypto;
mod eth_client;
mod identity;
mod install;
mod installing_logs;
mod rpc;
mod session;
mod store;
mod subscriptions;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cfg = config::Config::from_env();
    let api: Arc<dyn rpc::DappmanagerApi> =
        Arc::new(rpc::RpcClient::new(cfg.dappmanager_url.clone()));
    tracing::info!("dnadmin-console connecting to {}", cfg.dappmanager_url);

    // One session scope per iteration. A reload directive from the
    // dappmanager tears the scope down wholesale: store, listeners, stream
    // and pending confirmations are all discarded, with no confirmation
    // step. Ctrl+C exits instead.
    loop {
        let bus = Bus::new(cfg.bus_capacity);
        let store = store::AppStore::new();
        let subs = Subscriptions::new(bus.clone());
        let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
        let (confirmer, confirm_rx) = confirm::channel();

        let mut tasks = subscriptions::register(&subs, store.clone(), reload_tx);
        tasks.push(session::spawn(cfg.clone(), bus.clone()));
        tasks.push(commands::spawn(
            store.clone(),
            api.clone(),
            confirmer,
            confirm_rx,
            cfg.admin_secret_key.clone(),
        ));

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                for task in &tasks {
                    task.abort();
                }
                return Ok(());
            }
            _ = reload_rx.recv() => {
                tracing::warn!("reload directive received; discarding in-memory state");
                for task in &tasks {
                    task.abort();
                }
            }
        }
    }
}
