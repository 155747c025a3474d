//! Settings reconciliation for the package setup wizard.
//!
//! Converts between the canonical nested user settings and the flat,
//! schema-driven form representation, merges edits coming from either view
//! with an explicit deep-merge policy, and gates submission behind
//! structural/semantic validation.

mod form_data;
mod hints;
mod merge;
mod validate;
mod wizard;

pub use form_data::{
    add_mountpoint_legacy_tag, form_data_to_user_settings, strip_mountpoint_legacy_tag,
    user_settings_to_form_data,
};
pub use hints::{field_hints, FieldHint, MountpointHint};
pub use merge::{deep_merge, merged};
pub use validate::{user_settings_data_errors, validate_form_data_against_schema};
pub use wizard::{SetupWizard, WizardMode};

/// Errors surfaced by the reconciliation engine.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Validation gate rejected the candidate settings; nothing was
    /// submitted or mutated.
    #[error("invalid user settings: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("settings encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
}
