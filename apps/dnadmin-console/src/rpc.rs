//! Outbound RPC boundary to the dappmanager.
//!
//! Calls are `{method, params}` JSON posts. The optional toast message is
//! UI-hint metadata; with no chrome attached it is logged.

use async_trait::async_trait;
use serde_json::{json, Value};

use dnadmin_protocol::EthClientTarget;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dappmanager error: {0}")]
    Remote(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub toast_message: Option<String>,
}

#[async_trait]
pub trait DappmanagerApi: Send + Sync {
    async fn call(
        &self,
        method: &str,
        params: Value,
        opts: CallOptions,
    ) -> Result<Value, RpcError>;

    async fn eth_client_target_set(
        &self,
        target: EthClientTarget,
        delete_volumes: bool,
    ) -> Result<(), RpcError> {
        self.call(
            "ethClientTargetSet",
            json!({"target": target, "deleteVolumes": delete_volumes}),
            CallOptions {
                toast_message: Some("Changing Eth client...".into()),
            },
        )
        .await
        .map(drop)
    }

    async fn nacl_encryption_get_public_key(&self) -> Result<String, RpcError> {
        let result = self
            .call("naclEncryptionGetPublicKey", json!({}), CallOptions::default())
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed("public key is not a string".into()))
    }

    async fn seed_phrase_set(&self, seed_phrase_encrypted: &str) -> Result<(), RpcError> {
        self.call(
            "seedPhraseSet",
            json!({"seedPhraseEncrypted": seed_phrase_encrypted}),
            CallOptions {
                toast_message: Some("Setting seed phrase...".into()),
            },
        )
        .await
        .map(drop)
    }
}

pub struct RpcClient {
    http: reqwest::Client,
    base: String,
}

impl RpcClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into(),
        }
    }
}

#[async_trait]
impl DappmanagerApi for RpcClient {
    async fn call(
        &self,
        method: &str,
        params: Value,
        opts: CallOptions,
    ) -> Result<Value, RpcError> {
        if let Some(toast) = &opts.toast_message {
            tracing::info!("{}", toast);
        }
        let body: Value = self
            .http
            .post(format!("{}/rpc", self.base.trim_end_matches('/')))
            .json(&json!({"method": method, "params": params}))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(RpcError::Remote(message.to_string()));
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}
