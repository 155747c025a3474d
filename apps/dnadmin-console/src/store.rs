//! Application state owner. All mutation funnels through [`AppStore::apply`]
//! and the pure [`reduce`] function; no handler touches state directly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use dnadmin_protocol::{
    AutoUpdateData, ChainData, DeviceList, DirectoryDnp, EthClientTarget, InstalledDnp,
    PushNotification, SystemInfo, UserActionLog, VolumeData,
};

use crate::installing_logs::{progress_logs_by_dnp, InstallingLogsState, ProgressLogsByDnp};

const NOTIFICATIONS_CAP: usize = 256;
const USER_ACTION_LOGS_CAP: usize = 256;

/// One state mutation. Each push topic maps to exactly one variant.
#[derive(Debug)]
pub enum Action {
    SetAutoUpdateData(AutoUpdateData),
    SetChainData(Vec<ChainData>),
    SetDirectory(Vec<DirectoryDnp>),
    SetInstalledPackages(Vec<InstalledDnp>),
    UpdateInstallingLog {
        id: String,
        dnp_name: String,
        log: String,
    },
    ClearInstallingLog {
        id: String,
    },
    PushNotification(PushNotification),
    SetSystemInfo(SystemInfo),
    PushUserActionLog(UserActionLog),
    SetVolumes(Vec<VolumeData>),
    SetDevices(DeviceList),
}

#[derive(Debug, Default)]
pub struct AppState {
    pub auto_update: Option<AutoUpdateData>,
    pub chains: Vec<ChainData>,
    pub directory: Vec<DirectoryDnp>,
    pub installed: Vec<InstalledDnp>,
    pub installing_logs: InstallingLogsState,
    pub notifications: VecDeque<PushNotification>,
    pub system_info: Option<SystemInfo>,
    pub user_action_logs: VecDeque<UserActionLog>,
    pub volumes: Vec<VolumeData>,
    pub devices: DeviceList,
}

/// Apply one action to the state. Pure with respect to everything but its
/// two arguments.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetAutoUpdateData(auto_update) => state.auto_update = Some(auto_update),
        Action::SetChainData(chains) => state.chains = chains,
        Action::SetDirectory(directory) => state.directory = directory,
        Action::SetInstalledPackages(installed) => state.installed = installed,
        Action::UpdateInstallingLog { id, dnp_name, log } => {
            state.installing_logs.upsert(&id, &dnp_name, &log);
        }
        Action::ClearInstallingLog { id } => state.installing_logs.clear(&id),
        Action::PushNotification(notification) => {
            push_capped(&mut state.notifications, notification, NOTIFICATIONS_CAP);
        }
        Action::SetSystemInfo(system_info) => state.system_info = Some(system_info),
        Action::PushUserActionLog(log) => {
            push_capped(&mut state.user_action_logs, log, USER_ACTION_LOGS_CAP);
        }
        Action::SetVolumes(volumes) => state.volumes = volumes,
        Action::SetDevices(devices) => state.devices = devices,
    }
}

fn push_capped<T>(deque: &mut VecDeque<T>, value: T, cap: usize) {
    if deque.len() == cap {
        deque.pop_front();
    }
    deque.push_back(value);
}

/// Shared, versioned owner of [`AppState`].
pub struct AppStore {
    state: RwLock<AppState>,
    version: AtomicU64,
}

impl AppStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(AppState::default()),
            version: AtomicU64::new(0),
        })
    }

    pub async fn apply(&self, action: Action) {
        let mut state = self.state.write().await;
        reduce(&mut state, action);
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Monotonic change counter; presentational layers poll it to decide
    /// whether to re-render.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }

    pub async fn with_state<R>(&self, read: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.read().await;
        read(&state)
    }

    pub async fn eth_client_target(&self) -> Option<EthClientTarget> {
        self.with_state(|s| s.system_info.as_ref().and_then(|i| i.eth_client_target))
            .await
    }

    pub async fn identity_address(&self) -> Option<String> {
        self.with_state(|s| {
            s.system_info
                .as_ref()
                .and_then(|i| i.identity_address.clone())
        })
        .await
    }

    pub async fn progress_logs_by_dnp(&self) -> ProgressLogsByDnp {
        self.with_state(|s| progress_logs_by_dnp(&s.installing_logs))
            .await
    }
}
