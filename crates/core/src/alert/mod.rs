//! Budget alert evaluation.

pub mod service;
pub mod types;

pub use service::AlertService;
pub use types::{AlertDraft, AlertSeverity, AlertStatus, AlertType};
