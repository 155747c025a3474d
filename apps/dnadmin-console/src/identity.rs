//! Identity flow: set the node's seed phrase.
//!
//! The phrase is sealed locally and only the opaque payload leaves the
//! console. Re-setting an existing identity requires confirmation; RPC
//! failures are logged to the diagnostic channel only.

use std::sync::Arc;

use anyhow::ensure;

use crate::confirm::{Confirmer, Decision};
use crate::rpc::DappmanagerApi;
use crate::store::AppStore;

pub const SEED_PHRASE_WORDS: usize = 12;

pub fn seed_phrase_is_valid(seed_phrase: &str) -> bool {
    seed_phrase.split_whitespace().count() == SEED_PHRASE_WORDS
}

pub async fn set_seed_phrase(
    store: Arc<AppStore>,
    api: Arc<dyn DappmanagerApi>,
    confirmer: Confirmer,
    admin_secret_key: String,
    seed_phrase: String,
) {
    if let Err(err) =
        try_set_seed_phrase(store, api, confirmer, &admin_secret_key, &seed_phrase).await
    {
        tracing::error!("error setting seed phrase: {:#}", err);
    }
}

async fn try_set_seed_phrase(
    store: Arc<AppStore>,
    api: Arc<dyn DappmanagerApi>,
    confirmer: Confirmer,
    admin_secret_key: &str,
    seed_phrase: &str,
) -> anyhow::Result<()> {
    ensure!(
        seed_phrase_is_valid(seed_phrase),
        "seed phrase must be {SEED_PHRASE_WORDS} words separated by spaces"
    );

    if store.identity_address().await.is_some() {
        let decision = confirmer
            .confirm(
                "Changing DAppNode identity",
                "Are you sure you want to change the current DAppNode's identity?",
                "Yes",
                true,
            )
            .await;
        if decision == Decision::Declined {
            return Ok(());
        }
    }

    let dappmanager_public_key = api.nacl_encryption_get_public_key().await?;
    let sealed = crate::crypto::seal(seed_phrase, admin_secret_key, &dappmanager_public_key)?;
    api.seed_phrase_set(&sealed).await?;
    Ok(())
}
