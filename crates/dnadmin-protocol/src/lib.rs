//! Shared payload types for the dappmanager push topics and RPC boundary.
//!
//! Every topic carries one concrete payload type; the historically untyped
//! VPN device topic gets an explicit [`DeviceList`] here.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel meaning "explicitly unset" on mountpoint and file-upload fields.
pub const USER_SETTING_DISABLE_TAG: &str = "disable";

/// Fixed prefix marking a mountpoint value that uses the old device
/// addressing convention. Strip for display, re-add on encode; the strip
/// length must match this literal exactly or mount paths get corrupted.
pub const MOUNTPOINT_DEVICE_LEGACY_TAG: &str = "legacy:";

/// Auto-update view pushed by the dappmanager. The sections are owned by the
/// remote service and treated as opaque structured records here.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct AutoUpdateData {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub registry: Value,
    #[serde(default)]
    pub pending: Value,
}

/// Sync status of one chain (Ethereum mainnet, IPFS, ...).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChainData {
    pub dnp_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub syncing: bool,
    #[serde(default)]
    pub progress: Option<f64>,
}

/// One entry of the installable package directory.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDnp {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_trusted: bool,
    #[serde(default)]
    pub position: i64,
}

/// An installed package as reported by the dappmanager.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InstalledDnp {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub deps: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Danger,
    Warning,
    Success,
}

/// Notification pushed by the dappmanager for the operator to acknowledge.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    pub id: String,
    #[serde(rename = "type")]
    pub severity: NotificationSeverity,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// One line of the dappmanager user-action log stream.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserActionLog {
    pub level: String,
    pub event: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub kwargs: Value,
}

/// Docker volume as reported by the dappmanager.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VolumeData {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mountpoint: Option<String>,
}

/// Incremental install/update progress for one install session.
///
/// `id` groups messages that may span several package names; `clear` asks
/// the consumer to drop everything recorded under that id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProgressLog {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub clear: bool,
}

/// A VPN device credential entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VpnDevice {
    pub id: String,
    #[serde(default)]
    pub is_admin: bool,
}

pub type DeviceList = Vec<VpnDevice>;

/// Which Ethereum client the node routes its mainnet queries through.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EthClientTarget {
    Remote,
    GethLight,
    Geth,
    Parity,
}

impl EthClientTarget {
    /// Human name used in confirmation prompts.
    pub fn pretty_name(&self) -> &'static str {
        match self {
            EthClientTarget::Remote => "Remote",
            EthClientTarget::GethLight => "Geth light client",
            EthClientTarget::Geth => "Geth",
            EthClientTarget::Parity => "Parity",
        }
    }

    /// True when the target runs as a local package with its own volumes.
    pub fn is_package(&self) -> bool {
        !matches!(self, EthClientTarget::Remote)
    }
}

/// Host system status record. Carries the fields the console flows read;
/// the dappmanager sends more, which serde ignores.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub eth_client_target: Option<EthClientTarget>,
    #[serde(default)]
    pub identity_address: Option<String>,
    #[serde(default)]
    pub upnp_available: bool,
    #[serde(default)]
    pub alerts: Vec<String>,
}

// -------- User settings (canonical persisted intent) --------

/// Operator-provided configuration for one package.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_volume_mountpoints: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_named_volume_mountpoint: Option<String>,
    /// Uploaded file contents as data URLs, keyed by container path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub file_uploads: BTreeMap<String, String>,
}

impl UserSettings {
    pub fn is_empty(&self) -> bool {
        self.environment.is_empty()
            && self.named_volume_mountpoints.is_empty()
            && self.all_named_volume_mountpoint.is_none()
            && self.file_uploads.is_empty()
    }
}

/// Canonical settings for every package touched by an install, keyed by
/// package name.
pub type UserSettingsAllDnps = BTreeMap<String, UserSettings>;

/// Structural kind of one configurable field; drives both codec directions
/// and UI hinting.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SetupTarget {
    #[serde(rename_all = "camelCase")]
    Environment { name: String },
    #[serde(rename_all = "camelCase")]
    NamedVolumeMountpoint { volume_name: String },
    AllNamedVolumesMountpoint,
    #[serde(rename_all = "camelCase")]
    FileUpload { path: String },
}

/// Field metadata per package, keyed by package name then form field id.
pub type SetupTargetAllDnps = BTreeMap<String, BTreeMap<String, SetupTarget>>;

/// Flat, schema-driven view of [`UserSettingsAllDnps`]: package name to form
/// field id to displayed value. Derived, never canonical.
pub type FormDataAllDnps = BTreeMap<String, BTreeMap<String, String>>;
