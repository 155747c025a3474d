//! Headless operator surface: one JSON command per stdin line, responses
//! and confirmation prompts as JSON lines on stdout. A richer chrome can
//! replace this without touching the flows.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use dnadmin_protocol::{EthClientTarget, UserSettingsAllDnps};

use crate::confirm::{ConfirmRequest, Confirmer, Decision};
use crate::rpc::DappmanagerApi;
use crate::store::AppStore;

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    EthClientTargetSet { target: EthClientTarget },
    #[serde(rename_all = "camelCase")]
    SetSeedPhrase { seed_phrase: String },
    #[serde(rename_all = "camelCase")]
    InstallPackage {
        name: String,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        user_settings: UserSettingsAllDnps,
    },
    /// Answer the pending confirmation prompt.
    #[serde(rename_all = "camelCase")]
    Confirm { accept: bool },
    /// Dump a state summary.
    State,
}

pub fn spawn(
    store: Arc<AppStore>,
    api: Arc<dyn DappmanagerApi>,
    confirmer: Confirmer,
    mut confirm_rx: mpsc::UnboundedReceiver<ConfirmRequest>,
    admin_secret_key: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut pending: Option<ConfirmRequest> = None;
        loop {
            tokio::select! {
                request = confirm_rx.recv() => {
                    let Some(request) = request else { break };
                    println!(
                        "{}",
                        json!({"confirm": {
                            "title": request.title(),
                            "text": request.text(),
                            "acceptLabel": request.accept_label(),
                            "danger": request.danger(),
                        }})
                    );
                    // A newer prompt supersedes an unanswered one.
                    if let Some(previous) = pending.replace(request) {
                        previous.respond(Decision::Declined);
                    }
                }
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(err) => {
                            tracing::warn!("stdin error: {}", err);
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Command>(&line) {
                        Ok(command) => {
                            dispatch(command, &store, &api, &confirmer, &mut pending, &admin_secret_key)
                                .await
                        }
                        Err(err) => tracing::warn!("unrecognized command: {}", err),
                    }
                }
            }
        }
    })
}

async fn dispatch(
    command: Command,
    store: &Arc<AppStore>,
    api: &Arc<dyn DappmanagerApi>,
    confirmer: &Confirmer,
    pending: &mut Option<ConfirmRequest>,
    admin_secret_key: &str,
) {
    match command {
        Command::EthClientTargetSet { target } => {
            // Spawned: the flow may block on a confirmation this loop answers.
            tokio::spawn(crate::eth_client::change_eth_client_target(
                store.clone(),
                api.clone(),
                confirmer.clone(),
                target,
            ));
        }
        Command::SetSeedPhrase { seed_phrase } => {
            tokio::spawn(crate::identity::set_seed_phrase(
                store.clone(),
                api.clone(),
                confirmer.clone(),
                admin_secret_key.to_string(),
                seed_phrase,
            ));
        }
        Command::InstallPackage {
            name,
            version,
            user_settings,
        } => {
            match crate::install::install_package(
                api.as_ref(),
                &name,
                version.as_deref(),
                user_settings,
            )
            .await
            {
                Ok(()) => println!("{}", json!({"ok": true, "name": name})),
                Err(errors) => println!("{}", json!({"ok": false, "dataErrors": errors})),
            }
        }
        Command::Confirm { accept } => match pending.take() {
            Some(request) => request.respond(if accept {
                Decision::Accepted
            } else {
                Decision::Declined
            }),
            None => tracing::warn!("no confirmation pending"),
        },
        Command::State => {
            let progress_logs = store.progress_logs_by_dnp().await;
            let snapshot = store
                .with_state(|s| {
                    json!({
                        "version": store.version(),
                        "chains": s.chains,
                        "directory": s.directory.len(),
                        "installed": s.installed.len(),
                        "volumes": s.volumes.len(),
                        "devices": s.devices,
                        "notifications": s.notifications.len(),
                        "userActionLogs": s.user_action_logs.len(),
                        "systemInfo": s.system_info,
                        "autoUpdate": s.auto_update,
                        "progressLogsByDnp": progress_logs,
                    })
                })
                .await;
            println!("{}", snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_parse_from_tagged_json_lines() {
        let command: Command = serde_json::from_value(json!({
            "cmd": "ethClientTargetSet", "target": "geth-light"
        }))
        .expect("eth command");
        assert!(matches!(
            command,
            Command::EthClientTargetSet {
                target: EthClientTarget::GethLight
            }
        ));

        let command: Command = serde_json::from_value(json!({
            "cmd": "installPackage", "name": "geth.dnp.dappnode.eth"
        }))
        .expect("install command with defaults");
        assert!(matches!(
            command,
            Command::InstallPackage { version: None, .. }
        ));

        assert!(serde_json::from_str::<Command>("{\"cmd\":\"reboot\"}").is_err());
    }
}
