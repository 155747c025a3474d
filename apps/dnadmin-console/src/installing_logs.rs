//! Install-session progress logs and their per-package read model.
//!
//! One install session (`id`) may touch several packages; packages sharing
//! a session see each other's latest messages.

use std::collections::BTreeMap;

/// Latest message per package name within one install session.
pub type ProgressLogs = BTreeMap<String, String>;

/// Read view: every package currently installing, mapped to the full
/// message map of its session.
pub type ProgressLogsByDnp = BTreeMap<String, ProgressLogs>;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallingLogsState {
    /// Session id to package name to latest message.
    pub logs: BTreeMap<String, ProgressLogs>,
    pub dnp_name_to_log_id: BTreeMap<String, String>,
}

impl InstallingLogsState {
    pub fn upsert(&mut self, id: &str, dnp_name: &str, log: &str) {
        self.logs
            .entry(id.to_string())
            .or_default()
            .insert(dnp_name.to_string(), log.to_string());
        self.dnp_name_to_log_id
            .insert(dnp_name.to_string(), id.to_string());
    }

    /// Drop everything recorded under `id`, including the reverse index
    /// entries pointing at it.
    pub fn clear(&mut self, id: &str) {
        self.logs.remove(id);
        self.dnp_name_to_log_id.retain(|_, log_id| log_id != id);
    }
}

/// Build the per-package view. A package referenced by the reverse index
/// whose session holds no messages yet is omitted.
pub fn progress_logs_by_dnp(state: &InstallingLogsState) -> ProgressLogsByDnp {
    let mut out = ProgressLogsByDnp::new();
    for (dnp_name, id) in &state.dnp_name_to_log_id {
        if let Some(logs) = state.logs.get(id) {
            out.insert(dnp_name.clone(), logs.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packages_sharing_a_session_see_the_same_log_map() {
        let dnp_name1 = "ln.dnp.dappnode.eth";
        let dnp_name2 = "bitcoin.dnp.dappnode.eth";
        let dnp_name3 = "not-installing.dnp.dappnode.eth";
        let id = dnp_name1;

        let mut state = InstallingLogsState::default();
        state.upsert(id, dnp_name1, "Downloading 1%...");
        state.upsert(id, dnp_name2, "Downloading 2%...");
        // Reverse index entry with no session messages yet.
        state
            .dnp_name_to_log_id
            .insert(dnp_name3.to_string(), dnp_name3.to_string());

        let by_dnp = progress_logs_by_dnp(&state);
        let expected: ProgressLogs = [
            (dnp_name1.to_string(), "Downloading 1%...".to_string()),
            (dnp_name2.to_string(), "Downloading 2%...".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(by_dnp.get(dnp_name1), Some(&expected));
        assert_eq!(by_dnp.get(dnp_name1), by_dnp.get(dnp_name2));
        assert_eq!(by_dnp.get(dnp_name3), None);
        assert_eq!(by_dnp.get("other.dnp.dappnode.eth"), None);
    }

    #[test]
    fn upsert_overwrites_the_previous_message_for_a_package() {
        let mut state = InstallingLogsState::default();
        state.upsert("A", "geth.dnp.dappnode.eth", "Downloading 10%");
        state.upsert("A", "geth.dnp.dappnode.eth", "Downloading 90%");
        assert_eq!(
            state.logs["A"]["geth.dnp.dappnode.eth"],
            "Downloading 90%"
        );
    }

    #[test]
    fn clear_removes_session_and_reverse_index() {
        let mut state = InstallingLogsState::default();
        state.upsert("A", "geth.dnp.dappnode.eth", "Downloading 10%");
        state.upsert("B", "bitcoin.dnp.dappnode.eth", "Resolving...");
        state.clear("A");
        assert!(!state.logs.contains_key("A"));
        assert!(!state.dnp_name_to_log_id.contains_key("geth.dnp.dappnode.eth"));
        // Unrelated sessions untouched.
        assert!(state.logs.contains_key("B"));
    }
}
