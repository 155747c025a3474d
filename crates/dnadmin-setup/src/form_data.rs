//! Codec between the canonical user settings and the wizard's flat form
//! data, driven by per-field [`SetupTarget`] metadata.
//!
//! Fields of the settings not declared in the target are never carried into
//! form data; they are recovered by the wizard's deep-merge, not here.

use std::collections::BTreeMap;

use dnadmin_protocol::{
    FormDataAllDnps, SetupTarget, SetupTargetAllDnps, UserSettings, UserSettingsAllDnps,
    MOUNTPOINT_DEVICE_LEGACY_TAG,
};

/// Read every declared field out of `settings` into its form slot, with an
/// empty string standing in for absent values.
pub fn user_settings_to_form_data(
    settings: &UserSettingsAllDnps,
    target: &SetupTargetAllDnps,
) -> FormDataAllDnps {
    let mut out = FormDataAllDnps::new();
    for (dnp_name, fields) in target {
        let dnp = settings.get(dnp_name);
        let mut form = BTreeMap::new();
        for (field_id, field_target) in fields {
            let value = match field_target {
                SetupTarget::Environment { name } => {
                    dnp.and_then(|s| s.environment.get(name)).cloned()
                }
                SetupTarget::NamedVolumeMountpoint { volume_name } => dnp
                    .and_then(|s| s.named_volume_mountpoints.get(volume_name))
                    .cloned(),
                SetupTarget::AllNamedVolumesMountpoint => {
                    dnp.and_then(|s| s.all_named_volume_mountpoint.clone())
                }
                SetupTarget::FileUpload { path } => {
                    dnp.and_then(|s| s.file_uploads.get(path)).cloned()
                }
            };
            form.insert(field_id.clone(), value.unwrap_or_default());
        }
        out.insert(dnp_name.clone(), form);
    }
    out
}

/// Inverse mapping: place every non-empty declared form value back into the
/// nested settings structure. Empty strings are not materialized, so the
/// declared-field round trip is identity.
pub fn form_data_to_user_settings(
    form_data: &FormDataAllDnps,
    target: &SetupTargetAllDnps,
) -> UserSettingsAllDnps {
    let mut out = UserSettingsAllDnps::new();
    for (dnp_name, fields) in target {
        let Some(form) = form_data.get(dnp_name) else {
            continue;
        };
        let mut settings = UserSettings::default();
        for (field_id, field_target) in fields {
            let Some(value) = form.get(field_id) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match field_target {
                SetupTarget::Environment { name } => {
                    settings.environment.insert(name.clone(), value.clone());
                }
                SetupTarget::NamedVolumeMountpoint { volume_name } => {
                    settings
                        .named_volume_mountpoints
                        .insert(volume_name.clone(), value.clone());
                }
                SetupTarget::AllNamedVolumesMountpoint => {
                    settings.all_named_volume_mountpoint = Some(value.clone());
                }
                SetupTarget::FileUpload { path } => {
                    settings.file_uploads.insert(path.clone(), value.clone());
                }
            }
        }
        if !settings.is_empty() {
            out.insert(dnp_name.clone(), settings);
        }
    }
    out
}

/// Strip the legacy device marker for display. Returns the bare path and
/// whether the marker was present.
pub fn strip_mountpoint_legacy_tag(value: &str) -> (String, bool) {
    match value.strip_prefix(MOUNTPOINT_DEVICE_LEGACY_TAG) {
        Some(rest) => (rest.to_string(), true),
        None => (value.to_string(), false),
    }
}

/// Re-add the legacy device marker when encoding a path that carried it.
pub fn add_mountpoint_legacy_tag(path: &str) -> String {
    format!("{MOUNTPOINT_DEVICE_LEGACY_TAG}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target() -> SetupTargetAllDnps {
        serde_json::from_value(json!({
            "geth.dnp.dappnode.eth": {
                "syncmode": {"type": "environment", "name": "SYNCMODE"},
                "dataDir": {"type": "namedVolumeMountpoint", "volumeName": "geth_data"},
                "keystore": {"type": "fileUpload", "path": "/root/.ethereum/keystore.json"}
            },
            "bitcoin.dnp.dappnode.eth": {
                "txindex": {"type": "environment", "name": "BTC_TXINDEX"},
                "allData": {"type": "allNamedVolumesMountpoint"}
            }
        }))
        .expect("target fixture")
    }

    fn settings() -> UserSettingsAllDnps {
        serde_json::from_value(json!({
            "geth.dnp.dappnode.eth": {
                "environment": {"SYNCMODE": "fast"},
                "namedVolumeMountpoints": {"geth_data": "/dev1/ssd-volume"}
            },
            "bitcoin.dnp.dappnode.eth": {
                "environment": {"BTC_TXINDEX": "1"},
                "allNamedVolumeMountpoint": "/dev0/data"
            }
        }))
        .expect("settings fixture")
    }

    #[test]
    fn declared_fields_round_trip_exactly() {
        let target = target();
        let settings = settings();
        let form = user_settings_to_form_data(&settings, &target);
        assert_eq!(form["geth.dnp.dappnode.eth"]["syncmode"], "fast");
        assert_eq!(form["geth.dnp.dappnode.eth"]["dataDir"], "/dev1/ssd-volume");
        // Declared but absent fields surface as empty strings.
        assert_eq!(form["geth.dnp.dappnode.eth"]["keystore"], "");

        let back = form_data_to_user_settings(&form, &target);
        assert_eq!(back, settings);
    }

    #[test]
    fn undeclared_settings_are_not_carried_into_form_data() {
        let target = target();
        let mut settings = settings();
        settings
            .get_mut("geth.dnp.dappnode.eth")
            .expect("geth settings")
            .environment
            .insert("EXTRA_OPTS".into(), "--cache 2048".into());

        let form = user_settings_to_form_data(&settings, &target);
        assert!(!form["geth.dnp.dappnode.eth"].contains_key("EXTRA_OPTS"));
    }

    #[test]
    fn form_data_for_unknown_dnp_is_ignored() {
        let target = target();
        let mut form = user_settings_to_form_data(&settings(), &target);
        form.insert(
            "rogue.dnp.dappnode.eth".into(),
            BTreeMap::from([("syncmode".to_string(), "fast".to_string())]),
        );
        let back = form_data_to_user_settings(&form, &target);
        assert!(!back.contains_key("rogue.dnp.dappnode.eth"));
    }

    #[test]
    fn legacy_tag_strip_then_add_is_identity() {
        let original = "legacy:/dev/sdb1";
        let (bare, is_legacy) = strip_mountpoint_legacy_tag(original);
        assert!(is_legacy);
        assert_eq!(bare, "/dev/sdb1");
        assert_eq!(add_mountpoint_legacy_tag(&bare), original);

        let (untouched, is_legacy) = strip_mountpoint_legacy_tag("/dev/sdb1");
        assert!(!is_legacy);
        assert_eq!(untouched, "/dev/sdb1");
    }
}
