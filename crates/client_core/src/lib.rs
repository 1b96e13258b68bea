pub mod collation;
pub mod config;
pub mod controller;
pub mod dialogs;
pub mod form;
pub mod gateway;
pub mod store;
pub mod validation;

pub use config::{load_gateway_config, load_gateway_config_from, GatewayConfig};
pub use controller::{
    ContactListController, ControllerError, ControllerEvent, ControllerSnapshot, PendingAction,
    RemoveOutcome, SaveOutcome,
};
pub use dialogs::{
    ConfirmationDialog, DeclineAllConfirmations, DialogOutcome, LogUnderageNotice, UnderageNotice,
};
pub use form::{ContactForm, FormError, FormField, FormMode, FormState};
pub use gateway::{ContactGateway, GatewayError, HttpContactGateway};
pub use store::{ContactStore, SortField, UnknownSortField};
pub use validation::{is_adult, is_adult_on, Clock, FixedClock, LocalClock};
