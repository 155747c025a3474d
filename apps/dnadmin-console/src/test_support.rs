use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::confirm::{ConfirmRequest, Decision};
use crate::rpc::{CallOptions, DappmanagerApi, RpcError};

/// Scripted dappmanager that records every call it receives.
#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<(String, Value)>>,
    fail: bool,
}

impl RecordingApi {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl DappmanagerApi for RecordingApi {
    async fn call(
        &self,
        method: &str,
        params: Value,
        _opts: CallOptions,
    ) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((method.to_string(), params));
        if self.fail {
            return Err(RpcError::Remote("scripted failure".into()));
        }
        match method {
            "naclEncryptionGetPublicKey" => Ok(json!("dappmanager-pk")),
            _ => Ok(Value::Null),
        }
    }
}

/// Answer every confirmation prompt with `decision`, recording the titles
/// asked so tests can assert whether a prompt happened at all.
pub fn auto_answer(
    mut rx: mpsc::UnboundedReceiver<ConfirmRequest>,
    decision: Decision,
) -> Arc<Mutex<Vec<String>>> {
    let asked = Arc::new(Mutex::new(Vec::new()));
    let record = asked.clone();
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            record
                .lock()
                .expect("asked lock")
                .push(request.title().to_string());
            request.respond(decision);
        }
    });
    asked
}

pub mod env {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    pub struct EnvGuard {
        _lock: MutexGuard<'static, ()>,
        saved: Vec<(&'static str, Option<String>)>,
    }

    pub fn guard() -> EnvGuard {
        let lk = ENV_LOCK.get_or_init(|| Mutex::new(()));
        EnvGuard {
            _lock: lk.lock().expect("env lock"),
            saved: Vec::new(),
        }
    }

    impl EnvGuard {
        fn remember(&mut self, key: &'static str) {
            if self.saved.iter().any(|(k, _)| *k == key) {
                return;
            }
            self.saved.push((key, std::env::var(key).ok()));
        }
        pub fn set(&mut self, key: &'static str, value: &str) {
            self.remember(key);
            std::env::set_var(key, value);
        }
        pub fn remove(&mut self, key: &'static str) {
            self.remember(key);
            std::env::remove_var(key);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, val) in self.saved.drain(..) {
                match val {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
