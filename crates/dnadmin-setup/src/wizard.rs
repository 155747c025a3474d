//! Two-view reconciliation engine for package setup.
//!
//! The operator edits settings either through the schema-driven wizard form
//! or through a raw editor over the canonical settings object. Switching
//! views and submitting both deep-merge the two buffers with an explicit
//! priority, so fields only one view knows about are never lost.

use serde_json::Value;

use dnadmin_protocol::{FormDataAllDnps, SetupTargetAllDnps, UserSettingsAllDnps};

use crate::form_data::{form_data_to_user_settings, user_settings_to_form_data};
use crate::merge::merged;
use crate::validate::{user_settings_data_errors, validate_form_data_against_schema};
use crate::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Wizard,
    Editor,
}

pub struct SetupWizard {
    target: SetupTargetAllDnps,
    schema: Option<Value>,
    /// Canonical settings as the editor last saw them. Holds fields the
    /// wizard schema does not declare.
    editor_data: UserSettingsAllDnps,
    /// Cached wizard form state, kept across view switches. Holds
    /// schema-declared fields the editor buffer may not carry (file
    /// uploads in progress, cleared values).
    wizard_data: FormDataAllDnps,
    mode: WizardMode,
}

impl SetupWizard {
    pub fn new(
        target: SetupTargetAllDnps,
        schema: Option<Value>,
        user_settings: UserSettingsAllDnps,
    ) -> Self {
        let wizard_data = user_settings_to_form_data(&user_settings, &target);
        let mode = if schema.is_some() {
            WizardMode::Wizard
        } else {
            WizardMode::Editor
        };
        Self {
            target,
            schema,
            editor_data: user_settings,
            wizard_data,
            mode,
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn wizard_available(&self) -> bool {
        self.schema.is_some()
    }

    pub fn editor_data(&self) -> &UserSettingsAllDnps {
        &self.editor_data
    }

    pub fn wizard_data(&self) -> &FormDataAllDnps {
        &self.wizard_data
    }

    /// Raw editor edits replace the editor buffer wholesale.
    pub fn set_editor_data(&mut self, settings: UserSettingsAllDnps) {
        self.editor_data = settings;
    }

    /// Move data from the wizard to the editor. The wizard's current form
    /// state merges into the editor's last-known settings (wizard wins on
    /// overlap, editor-only keys preserved) and is cached for the way back.
    pub fn show_advanced_editor(
        &mut self,
        form_data: FormDataAllDnps,
    ) -> Result<(), SetupError> {
        let wizard_settings = form_data_to_user_settings(&form_data, &self.target);
        self.editor_data = merge_settings(&self.editor_data, &wizard_settings)?;
        self.wizard_data = form_data;
        self.mode = WizardMode::Editor;
        Ok(())
    }

    /// Move data from the editor back to the wizard. The editor's settings
    /// merge (via the codec) into the cached wizard form data, editor wins;
    /// wizard-only fields absent from the editor buffer survive. Fields the
    /// editor holds no value for are dropped from the merge source, or they
    /// would blank the cache.
    pub fn hide_advanced_editor(&mut self) -> Result<(), SetupError> {
        let mut editor_form = user_settings_to_form_data(&self.editor_data, &self.target);
        for form in editor_form.values_mut() {
            form.retain(|_, value| !value.is_empty());
        }
        self.wizard_data = merge_form_data(&self.wizard_data, &editor_form)?;
        self.mode = WizardMode::Wizard;
        Ok(())
    }

    /// Final submit from the wizard view: wizard is authoritative for what
    /// it declares, everything else comes from the editor buffer.
    pub fn submit_from_wizard(
        &self,
        form_data: &FormDataAllDnps,
    ) -> Result<UserSettingsAllDnps, SetupError> {
        if let Some(schema) = &self.schema {
            let errors = validate_form_data_against_schema(schema, form_data);
            if !errors.is_empty() {
                return Err(SetupError::Invalid(errors));
            }
        }
        let wizard_settings = form_data_to_user_settings(form_data, &self.target);
        let candidate = merge_settings(&self.editor_data, &wizard_settings)?;
        self.gate(candidate)
    }

    /// Final submit from the editor view: editor is authoritative; wizard
    /// data, when a wizard exists, only fills in what the editor lacks.
    pub fn submit_from_editor(&self) -> Result<UserSettingsAllDnps, SetupError> {
        let candidate = if self.wizard_available() {
            let wizard_settings = form_data_to_user_settings(&self.wizard_data, &self.target);
            merge_settings(&wizard_settings, &self.editor_data)?
        } else {
            self.editor_data.clone()
        };
        self.gate(candidate)
    }

    fn gate(&self, candidate: UserSettingsAllDnps) -> Result<UserSettingsAllDnps, SetupError> {
        let errors = user_settings_data_errors(&candidate);
        if errors.is_empty() {
            Ok(candidate)
        } else {
            Err(SetupError::Invalid(errors))
        }
    }
}

fn merge_settings(
    base: &UserSettingsAllDnps,
    over: &UserSettingsAllDnps,
) -> Result<UserSettingsAllDnps, SetupError> {
    let out = merged(&serde_json::to_value(base)?, &serde_json::to_value(over)?);
    Ok(serde_json::from_value(out)?)
}

fn merge_form_data(
    base: &FormDataAllDnps,
    over: &FormDataAllDnps,
) -> Result<FormDataAllDnps, SetupError> {
    let out = merged(&serde_json::to_value(base)?, &serde_json::to_value(over)?);
    Ok(serde_json::from_value(out)?)
}
