//! Ethereum client target change flow.
//!
//! When switching away from a package client the operator is asked whether
//! to also remove its volumes. Declining only skips the volume deletion;
//! the target change itself still proceeds. RPC failures are logged to the
//! diagnostic channel and not surfaced further.

use std::sync::Arc;

use dnadmin_protocol::EthClientTarget;

use crate::confirm::{Confirmer, Decision};
use crate::rpc::DappmanagerApi;
use crate::store::AppStore;

pub async fn change_eth_client_target(
    store: Arc<AppStore>,
    api: Arc<dyn DappmanagerApi>,
    confirmer: Confirmer,
    next_target: EthClientTarget,
) {
    let prev_target = store.eth_client_target().await;

    // Make sure the target has changed or the call will error.
    if prev_target == Some(next_target) {
        return;
    }

    let delete_volumes = match prev_target {
        Some(prev) if prev.is_package() => {
            let decision = confirmer
                .confirm(
                    format!("Remove {} volumes?", prev.pretty_name()),
                    "Do you want to keep or remove the volumes of your current \
                     Ethereum client? This action cannot be undone.",
                    "Remove",
                    true,
                )
                .await;
            decision == Decision::Accepted
        }
        _ => false,
    };

    if let Err(err) = api.eth_client_target_set(next_target, delete_volumes).await {
        tracing::error!("error changing Eth client target: {:#}", err);
    }
}
