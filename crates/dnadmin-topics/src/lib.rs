//! Canonical push-topic constants published by the dappmanager session.
//!
//! This crate centralizes the topic URIs used when registering
//! subscriptions so that the dispatch router and any test harness stay in
//! sync. Keep this list grouped by publisher and favor the historical
//! `<name>.<publisher>.dnp.dappnode.eth` form.

// dappmanager
pub const TOPIC_AUTO_UPDATE_DATA: &str = "autoUpdateData.dappmanager.dnp.dappnode.eth";
pub const TOPIC_CHAIN_DATA: &str = "chainData.dappmanager.dnp.dappnode.eth";
pub const TOPIC_DIRECTORY: &str = "directory.dappmanager.dnp.dappnode.eth";
pub const TOPIC_PACKAGES: &str = "packages.dappmanager.dnp.dappnode.eth";
pub const TOPIC_PROGRESS_LOG: &str = "log.dappmanager.dnp.dappnode.eth";
pub const TOPIC_PUSH_NOTIFICATION: &str = "pushNotification.dappmanager.dnp.dappnode.eth";
pub const TOPIC_SYSTEM_INFO: &str = "systemInfo.dappmanager.dnp.dappnode.eth";
pub const TOPIC_USER_ACTION_LOG: &str = "logUserAction.dappmanager.dnp.dappnode.eth";
pub const TOPIC_VOLUMES: &str = "volumes.dappmanager.dnp.dappnode.eth";

// The dappmanager may ask the console to drop all state and start over.
pub const TOPIC_RELOAD_CLIENT: &str = "reloadClient.dappmanager.dnp.dappnode.eth";

// vpn
// Wire shape wraps the device array as `[devices]`; see the dispatch router.
pub const TOPIC_VPN_DEVICES: &str = "devices.vpn.dnp.dappnode.eth";
