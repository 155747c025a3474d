//! Validation gate run over a merged settings object before it may leave
//! the component boundary. Returns human-readable error strings; an empty
//! list means valid. The candidate is never mutated or partially submitted.

use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use dnadmin_protocol::{
    FormDataAllDnps, UserSettingsAllDnps, USER_SETTING_DISABLE_TAG,
};

use crate::form_data::strip_mountpoint_legacy_tag;

static ENV_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env name regex"));

pub fn user_settings_data_errors(settings: &UserSettingsAllDnps) -> Vec<String> {
    let mut errors = Vec::new();
    for (dnp_name, dnp) in settings {
        for name in dnp.environment.keys() {
            if !ENV_NAME_RE.is_match(name) {
                errors.push(format!(
                    "{dnp_name}: invalid environment variable name '{name}'"
                ));
            }
        }
        for (volume_name, value) in &dnp.named_volume_mountpoints {
            if let Some(error) = mountpoint_error(value) {
                errors.push(format!("{dnp_name}: volume '{volume_name}' {error}"));
            }
        }
        if let Some(value) = &dnp.all_named_volume_mountpoint {
            if let Some(error) = mountpoint_error(value) {
                errors.push(format!("{dnp_name}: all-volumes mountpoint {error}"));
            }
        }
        for (path, content) in &dnp.file_uploads {
            if content == USER_SETTING_DISABLE_TAG {
                continue;
            }
            if let Some(error) = data_url_error(content) {
                errors.push(format!("{dnp_name}: file upload '{path}' {error}"));
            }
        }
    }
    errors
}

fn mountpoint_error(value: &str) -> Option<&'static str> {
    if value.is_empty() || value == USER_SETTING_DISABLE_TAG {
        return None;
    }
    let (path, _is_legacy) = strip_mountpoint_legacy_tag(value);
    if !path.starts_with('/') {
        return Some("mountpoint path must be absolute");
    }
    None
}

fn data_url_error(content: &str) -> Option<&'static str> {
    if !content.starts_with("data:") {
        return Some("must be a data URL");
    }
    let Some((_mime, payload)) = content.split_once(";base64,") else {
        return Some("must carry a base64 payload");
    };
    if base64::engine::general_purpose::STANDARD
        .decode(payload)
        .is_err()
    {
        return Some("base64 payload is not decodable");
    }
    None
}

/// Check the wizard's flat form data against the package setup schema
/// (JSON Schema, one object property per package). Errors are reported in
/// the same human-readable list as the semantic checks.
pub fn validate_form_data_against_schema(
    schema: &Value,
    form_data: &FormDataAllDnps,
) -> Vec<String> {
    let validator = match jsonschema::validator_for(schema) {
        Ok(validator) => validator,
        Err(err) => return vec![format!("setup schema is invalid: {err}")],
    };
    let instance = match serde_json::to_value(form_data) {
        Ok(instance) => instance,
        Err(err) => return vec![format!("form data is not serializable: {err}")],
    };
    validator
        .iter_errors(&instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect()
}
