//! Capability name validation against the three MSIX capability namespaces.
//!
//! Pure functions, no I/O. The validator reports every violation, not just
//! the first, so a caller can surface them all at once.

/// General-use capabilities declarable without extra justification.
pub const GENERAL_CAPABILITIES: &[&str] = &[
    "internetClient",
    "internetClientServer",
    "privateNetworkClientServer",
    "allJoyn",
    "codeGeneration",
];

/// Device capabilities (hardware access, user-consent gated).
pub const DEVICE_CAPABILITIES: &[&str] = &[
    "location",
    "microphone",
    "webcam",
    "proximity",
    "bluetooth",
    "usb",
    "humaninterfacedevice",
    "serialcommunication",
    "pointOfService",
    "radios",
    "optical",
    "activity",
    "gazeInput",
    "lowLevelDevices",
    "wiFiControl",
];

/// Restricted capabilities (Store approval or org policy required).
pub const RESTRICTED_CAPABILITIES: &[&str] = &[
    "broadFileSystemAccess",
    "allowElevation",
    "runFullTrust",
    "enterpriseAuthentication",
    "sharedUserCertificates",
    "documentsLibrary",
    "appCaptureSettings",
    "cellularDeviceControl",
    "inputInjectionBrowserOnly",
    "packagedServices",
    "localSystemServices",
    "uiAutomation",
];

/// Capability names partitioned by namespace. Absent entries are empty lists.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    pub general: Vec<String>,
    pub device: Vec<String>,
    pub restricted: Vec<String>,
}

/// Validate every entry of `set` against its namespace's allow-list.
///
/// Returns one message per invalid entry, naming the category and the
/// offending value. Categories are checked general → device → restricted,
/// preserving input order within each.
pub fn validate_capabilities(set: &CapabilitySet) -> Vec<String> {
    let mut errors = Vec::new();
    check_category(&mut errors, "general", &set.general, GENERAL_CAPABILITIES);
    check_category(&mut errors, "device", &set.device, DEVICE_CAPABILITIES);
    check_category(
        &mut errors,
        "restricted",
        &set.restricted,
        RESTRICTED_CAPABILITIES,
    );
    errors
}

fn check_category(errors: &mut Vec<String>, category: &str, names: &[String], allowed: &[&str]) {
    for name in names {
        if !allowed.contains(&name.as_str()) {
            errors.push(format!("Invalid {category} capability: '{name}'"));
        }
    }
}

/// Partition a flat capability list (as stored in `bundle.config.json`) into
/// namespaces by membership. Names in no namespace land in `general` so that
/// validation reports them as invalid general capabilities.
pub fn partition_capabilities(names: &[String]) -> CapabilitySet {
    let mut set = CapabilitySet::default();
    for name in names {
        if DEVICE_CAPABILITIES.contains(&name.as_str()) {
            set.device.push(name.clone());
        } else if RESTRICTED_CAPABILITIES.contains(&name.as_str()) {
            set.restricted.push(name.clone());
        } else {
            set.general.push(name.clone());
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_general_capabilities_produce_no_errors() {
        let set = CapabilitySet {
            general: strings(&["internetClient"]),
            ..Default::default()
        };
        assert!(validate_capabilities(&set).is_empty());
    }

    #[test]
    fn valid_device_capabilities_produce_no_errors() {
        let set = CapabilitySet {
            device: strings(&["webcam", "microphone"]),
            ..Default::default()
        };
        assert!(validate_capabilities(&set).is_empty());
    }

    #[test]
    fn valid_restricted_capabilities_produce_no_errors() {
        let set = CapabilitySet {
            restricted: strings(&["broadFileSystemAccess"]),
            ..Default::default()
        };
        assert!(validate_capabilities(&set).is_empty());
    }

    #[test]
    fn invalid_general_capability_names_category_and_value() {
        let set = CapabilitySet {
            general: strings(&["bogus"]),
            ..Default::default()
        };
        let errors = validate_capabilities(&set);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("general"));
        assert!(errors[0].contains("bogus"));
    }

    #[test]
    fn invalid_device_capability_is_reported() {
        let set = CapabilitySet {
            device: strings(&["badDevice"]),
            ..Default::default()
        };
        let errors = validate_capabilities(&set);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Invalid device capability"));
    }

    #[test]
    fn invalid_restricted_capability_is_reported() {
        let set = CapabilitySet {
            restricted: strings(&["notRestricted"]),
            ..Default::default()
        };
        let errors = validate_capabilities(&set);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Invalid restricted capability"));
    }

    #[test]
    fn all_violations_are_collected_in_order() {
        let set = CapabilitySet {
            general: strings(&["bad1", "bad2"]),
            device: strings(&["bad3"]),
            ..Default::default()
        };
        let errors = validate_capabilities(&set);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("bad1"));
        assert!(errors[1].contains("bad2"));
        assert!(errors[2].contains("bad3"));
    }

    #[test]
    fn empty_set_is_valid() {
        assert!(validate_capabilities(&CapabilitySet::default()).is_empty());
    }

    #[test]
    fn partition_routes_names_by_namespace() {
        let set = partition_capabilities(&strings(&[
            "internetClient",
            "webcam",
            "broadFileSystemAccess",
            "mystery",
        ]));
        assert_eq!(set.general, strings(&["internetClient", "mystery"]));
        assert_eq!(set.device, strings(&["webcam"]));
        assert_eq!(set.restricted, strings(&["broadFileSystemAccess"]));
    }
}
