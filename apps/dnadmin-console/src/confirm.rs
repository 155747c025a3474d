//! Confirmation service: flows ask, the operator surface answers.
//!
//! `confirm` resolves when the operator decides; there is no timeout, so a
//! workflow may wait indefinitely. A dismissed or orphaned prompt counts as
//! declined; only an explicit accept may trigger destructive action.

use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Declined,
}

#[derive(Debug)]
pub struct ConfirmRequest {
    title: String,
    text: String,
    accept_label: String,
    danger: bool,
    respond: oneshot::Sender<Decision>,
}

impl ConfirmRequest {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn accept_label(&self) -> &str {
        &self.accept_label
    }

    pub fn danger(&self) -> bool {
        self.danger
    }

    pub fn respond(self, decision: Decision) {
        let _ = self.respond.send(decision);
    }
}

pub fn channel() -> (Confirmer, mpsc::UnboundedReceiver<ConfirmRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Confirmer { tx }, rx)
}

#[derive(Clone)]
pub struct Confirmer {
    tx: mpsc::UnboundedSender<ConfirmRequest>,
}

impl Confirmer {
    pub async fn confirm(
        &self,
        title: impl Into<String>,
        text: impl Into<String>,
        accept_label: impl Into<String>,
        danger: bool,
    ) -> Decision {
        let (respond, decided) = oneshot::channel();
        let request = ConfirmRequest {
            title: title.into(),
            text: text.into(),
            accept_label: accept_label.into(),
            danger,
            respond,
        };
        if self.tx.send(request).is_err() {
            return Decision::Declined;
        }
        decided.await.unwrap_or(Decision::Declined)
    }
}
