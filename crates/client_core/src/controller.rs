use std::{fmt, sync::Arc};

use shared::{
    domain::{ContactId, Gender},
    error::ApiError,
    protocol::{Contact, NewContact},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    dialogs::{
        ConfirmationDialog, DeclineAllConfirmations, DialogOutcome, LogUnderageNotice,
        UnderageNotice,
    },
    form::{ContactForm, FormError, FormField, FormMode, FormState},
    gateway::{ContactGateway, GatewayError},
    store::{ContactStore, SortField},
    validation::{is_adult_on, Clock, LocalClock},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Load,
    Select,
    Save,
    Update,
    Remove,
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PendingAction::Load => "load",
            PendingAction::Select => "select",
            PendingAction::Save => "save",
            PendingAction::Update => "update",
            PendingAction::Remove => "remove",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("cannot {requested} while {in_flight} is still in flight")]
    Busy {
        requested: PendingAction,
        in_flight: PendingAction,
    },
    #[error("the form is not open for a new contact")]
    NotCreating,
    #[error("no contact is selected for editing")]
    NotEditing,
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Contact),
    /// Rejected by the age rule; the form stays open.
    Underage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed {
        id: ContactId,
        echoed: Option<Contact>,
    },
    Declined,
    Dismissed,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    ContactsReloaded { count: usize },
    FormModeChanged { mode: FormMode },
    UnderageRejected { contact: NewContact },
    Error(ApiError),
}

/// Everything a view needs to render one frame.
#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub contacts: Vec<Contact>,
    pub filtered: Vec<Contact>,
    pub visible: Vec<Contact>,
    pub gender_filter: Option<Gender>,
    pub search_term: Option<String>,
    pub form_mode: FormMode,
    pub form: ContactForm,
    pub pending: Option<PendingAction>,
    pub last_error: Option<ApiError>,
}

#[derive(Default)]
struct ControllerState {
    store: ContactStore,
    form: FormState,
    pending: Option<PendingAction>,
    last_error: Option<ApiError>,
}

pub struct ContactListController {
    gateway: Arc<dyn ContactGateway>,
    confirmation: Arc<dyn ConfirmationDialog>,
    underage_notice: Arc<dyn UnderageNotice>,
    clock: Arc<dyn Clock>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ContactListController {
    pub fn new(gateway: Arc<dyn ContactGateway>) -> Arc<Self> {
        Self::new_with_dependencies(
            gateway,
            Arc::new(DeclineAllConfirmations),
            Arc::new(LogUnderageNotice),
            Arc::new(LocalClock),
        )
    }

    pub fn new_with_dependencies(
        gateway: Arc<dyn ContactGateway>,
        confirmation: Arc<dyn ConfirmationDialog>,
        underage_notice: Arc<dyn UnderageNotice>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            confirmation,
            underage_notice,
            clock,
            inner: Mutex::new(ControllerState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let guard = self.inner.lock().await;
        ControllerSnapshot {
            contacts: guard.store.contacts().to_vec(),
            filtered: guard.store.filtered().to_vec(),
            visible: guard.store.visible().into_iter().cloned().collect(),
            gender_filter: guard.store.gender_filter().cloned(),
            search_term: guard.store.search_term().map(str::to_string),
            form_mode: guard.form.mode().clone(),
            form: guard.form.values().clone(),
            pending: guard.pending,
            last_error: guard.last_error.clone(),
        }
    }

    /// Fetches the whole collection, replacing the list and dropping filters.
    pub async fn load(&self) -> Result<usize, ControllerError> {
        self.begin(PendingAction::Load).await?;
        let result = self.reload().await;
        self.finish(result).await
    }

    pub async fn filter_by_gender(&self, gender: Gender) -> Vec<Contact> {
        let mut guard = self.inner.lock().await;
        guard.store.filter_by_gender(&gender).to_vec()
    }

    pub async fn clear_filters(&self) {
        self.inner.lock().await.store.clear_filters();
    }

    pub async fn sort_by(&self, field: SortField) -> Vec<Contact> {
        let mut guard = self.inner.lock().await;
        guard.store.sort_by(field).to_vec()
    }

    pub async fn set_search_term(&self, term: Option<String>) {
        self.inner.lock().await.store.set_search_term(term);
    }

    pub async fn start_create(&self) {
        let mode = {
            let mut guard = self.inner.lock().await;
            guard.form.start_create();
            guard.form.mode().clone()
        };
        self.emit(ControllerEvent::FormModeChanged { mode });
    }

    pub async fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.inner.lock().await.form.set_field(field, value);
    }

    pub async fn set_form(&self, values: ContactForm) {
        self.inner.lock().await.form.set_values(values);
    }

    /// Fetches the record fresh from the backend and opens it for editing.
    pub async fn select(&self, id: ContactId) -> Result<Contact, ControllerError> {
        self.begin(PendingAction::Select).await?;
        let result: Result<Contact, ControllerError> = async {
            let contact = self.gateway.get(id).await?;
            let mode = {
                let mut guard = self.inner.lock().await;
                guard.form.begin_edit(contact.clone());
                guard.form.mode().clone()
            };
            self.emit(ControllerEvent::FormModeChanged { mode });
            Ok(contact)
        }
        .await;
        self.finish(result).await
    }

    pub async fn cancel(&self) {
        self.reset_form().await;
    }

    /// Creates a contact from the form. Underage contacts are never sent; the
    /// notice is shown and the form stays as it is.
    pub async fn save(&self) -> Result<SaveOutcome, ControllerError> {
        self.begin(PendingAction::Save).await?;
        let result: Result<SaveOutcome, ControllerError> = async {
            let draft = {
                let guard = self.inner.lock().await;
                if *guard.form.mode() != FormMode::Creating {
                    return Err(ControllerError::NotCreating);
                }
                guard.form.values().validate()?
            };

            if !is_adult_on(&draft.birth_date, self.clock.today()) {
                info!(name = %draft.name, "save rejected: contact is underage");
                self.underage_notice.notify_underage(&draft);
                self.emit(ControllerEvent::UnderageRejected { contact: draft });
                return Ok(SaveOutcome::Underage);
            }

            let created = self.gateway.create(&draft).await?;
            info!(contact_id = %created.id, "contact created");
            self.reset_form().await;
            self.reload().await?;
            Ok(SaveOutcome::Created(created))
        }
        .await;
        self.finish(result).await
    }

    /// Sends the form values for the selected contact. The age rule is not
    /// applied here.
    pub async fn update(&self) -> Result<Contact, ControllerError> {
        self.begin(PendingAction::Update).await?;
        let result: Result<Contact, ControllerError> = async {
            let (id, patch) = {
                let guard = self.inner.lock().await;
                let selected = guard.form.selected().ok_or(ControllerError::NotEditing)?;
                (selected.id, guard.form.values().to_patch())
            };

            let updated = self.gateway.update(id, &patch).await?;
            info!(contact_id = %id, "contact updated");
            self.reset_form().await;
            self.reload().await?;
            Ok(updated)
        }
        .await;
        self.finish(result).await
    }

    /// Asks for confirmation, then deletes by id. The action slot is held
    /// while the dialog is open.
    pub async fn remove(&self, contact: &Contact) -> Result<RemoveOutcome, ControllerError> {
        self.begin(PendingAction::Remove).await?;
        let result: Result<RemoveOutcome, ControllerError> = async {
            match self.confirmation.confirm_removal(contact).await {
                DialogOutcome::Declined => return Ok(RemoveOutcome::Declined),
                DialogOutcome::Dismissed => return Ok(RemoveOutcome::Dismissed),
                DialogOutcome::Confirmed => {}
            }

            let echoed = self.gateway.delete(contact.id).await?;
            info!(contact_id = %contact.id, "contact removed");
            self.reset_form().await;
            self.reload().await?;
            Ok(RemoveOutcome::Removed {
                id: contact.id,
                echoed,
            })
        }
        .await;
        self.finish(result).await
    }

    async fn reload(&self) -> Result<usize, ControllerError> {
        let contacts = self.gateway.list().await?;
        let count = self.inner.lock().await.store.replace_all(contacts);
        info!(count, "contact list reloaded");
        self.emit(ControllerEvent::ContactsReloaded { count });
        Ok(count)
    }

    async fn reset_form(&self) {
        {
            let mut guard = self.inner.lock().await;
            if guard.form == FormState::default() {
                return;
            }
            guard.form.reset();
        }
        self.emit(ControllerEvent::FormModeChanged {
            mode: FormMode::Idle,
        });
    }

    async fn begin(&self, requested: PendingAction) -> Result<(), ControllerError> {
        let mut guard = self.inner.lock().await;
        if let Some(in_flight) = guard.pending {
            warn!(%requested, %in_flight, "action rejected while another is in flight");
            return Err(ControllerError::Busy {
                requested,
                in_flight,
            });
        }
        guard.pending = Some(requested);
        Ok(())
    }

    async fn finish<T>(
        &self,
        result: Result<T, ControllerError>,
    ) -> Result<T, ControllerError> {
        let failure = {
            let mut guard = self.inner.lock().await;
            guard.pending = None;
            match &result {
                Ok(_) => {
                    guard.last_error = None;
                    None
                }
                Err(ControllerError::Gateway(err)) => {
                    let api_error = err.to_api_error();
                    guard.last_error = Some(api_error.clone());
                    Some(api_error)
                }
                Err(_) => None,
            }
        };
        if let Some(api_error) = failure {
            warn!(code = ?api_error.code, message = %api_error.message, "backend request failed");
            self.emit(ControllerEvent::Error(api_error));
        }
        result
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
