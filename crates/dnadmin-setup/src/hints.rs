//! Per-field UI hints derived from the previous settings and the field
//! kind. The wizard shell uses these to pick widgets; nothing here renders.

use std::collections::BTreeMap;

use dnadmin_protocol::{
    SetupTarget, SetupTargetAllDnps, UserSettingsAllDnps, USER_SETTING_DISABLE_TAG,
};

use crate::form_data::{strip_mountpoint_legacy_tag, user_settings_to_form_data};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountpointHint {
    pub already_set: bool,
    pub is_legacy: bool,
    /// Previous path with the legacy marker stripped for display.
    pub prev_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldHint {
    /// The operator explicitly unset this field; render it inert.
    Disabled,
    Mountpoint(MountpointHint),
}

/// Compute hints for every declared field. Must use the settings as they
/// were when the wizard opened, not the live edit buffer, so hints stay
/// stable while the operator types.
pub fn field_hints(
    prev_settings: &UserSettingsAllDnps,
    target: &SetupTargetAllDnps,
) -> BTreeMap<String, BTreeMap<String, FieldHint>> {
    let form = user_settings_to_form_data(prev_settings, target);
    let mut out = BTreeMap::new();
    for (dnp_name, fields) in target {
        let mut hints = BTreeMap::new();
        for (field_id, field_target) in fields {
            let value = form
                .get(dnp_name)
                .and_then(|f| f.get(field_id))
                .cloned()
                .unwrap_or_default();
            let is_mountpoint = matches!(
                field_target,
                SetupTarget::NamedVolumeMountpoint { .. } | SetupTarget::AllNamedVolumesMountpoint
            );
            if value == USER_SETTING_DISABLE_TAG
                && (is_mountpoint || matches!(field_target, SetupTarget::FileUpload { .. }))
            {
                hints.insert(field_id.clone(), FieldHint::Disabled);
            } else if is_mountpoint {
                let (prev_path, is_legacy) = strip_mountpoint_legacy_tag(&value);
                hints.insert(
                    field_id.clone(),
                    FieldHint::Mountpoint(MountpointHint {
                        already_set: !value.is_empty(),
                        is_legacy,
                        prev_path,
                    }),
                );
            }
        }
        if !hints.is_empty() {
            out.insert(dnp_name.clone(), hints);
        }
    }
    out
}
