//! Package install submission: validation gate, then the install RPC.
//!
//! All-or-nothing: when the gate reports errors the settings object leaves
//! the console unchanged and no RPC call is made.

use serde_json::json;

use dnadmin_protocol::UserSettingsAllDnps;
use dnadmin_setup::user_settings_data_errors;

use crate::rpc::{CallOptions, DappmanagerApi};

pub async fn install_package(
    api: &dyn DappmanagerApi,
    name: &str,
    version: Option<&str>,
    user_settings: UserSettingsAllDnps,
) -> Result<(), Vec<String>> {
    let errors = user_settings_data_errors(&user_settings);
    if !errors.is_empty() {
        return Err(errors);
    }
    let result = api
        .call(
            "installPackage",
            json!({
                "name": name,
                "version": version,
                "userSettings": user_settings,
            }),
            CallOptions {
                toast_message: Some(format!("Installing {name}...")),
            },
        )
        .await;
    if let Err(err) = result {
        tracing::error!("error installing {}: {:#}", name, err);
    }
    Ok(())
}
