use async_trait::async_trait;
use shared::protocol::{Contact, NewContact};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed,
    Declined,
    /// Closed without an answer.
    Dismissed,
}

#[async_trait]
pub trait ConfirmationDialog: Send + Sync {
    async fn confirm_removal(&self, contact: &Contact) -> DialogOutcome;
}

pub trait UnderageNotice: Send + Sync {
    fn notify_underage(&self, contact: &NewContact);
}

/// Used when no dialog is wired in: nothing is ever removed.
pub struct DeclineAllConfirmations;

#[async_trait]
impl ConfirmationDialog for DeclineAllConfirmations {
    async fn confirm_removal(&self, contact: &Contact) -> DialogOutcome {
        info!(contact_id = %contact.id, "no confirmation dialog available; removal dismissed");
        DialogOutcome::Dismissed
    }
}

pub struct LogUnderageNotice;

impl UnderageNotice for LogUnderageNotice {
    fn notify_underage(&self, contact: &NewContact) {
        warn!(
            name = %contact.name,
            birth_date = %contact.birth_date,
            "contact is under the age of majority; not saved"
        );
    }
}
