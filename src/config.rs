//! Configuration documents consumed and produced by the bundler.
//!
//! Three shapes matter:
//!
//! - [`ProjectConfig`] — the host project's `tauri.conf.json` (read-only).
//! - [`BundleConfig`] — the user-owned `bundle.config.json` under
//!   `src-tauri/gen/windows`, rewritten wholesale on every mutation.
//! - [`MergedConfig`] — the ephemeral combination of both, built fresh for
//!   each manifest render and never persisted.
//!
//! Field names follow the camelCase JSON the documents use on disk.

use serde::{Deserialize, Serialize};

/// Default minimum supported Windows version (Windows 10 1809).
pub const DEFAULT_MIN_WINDOWS_VERSION: &str = "10.0.17763.0";

/// Capabilities a freshly initialized bundle config declares.
pub const DEFAULT_CAPABILITIES: &[&str] = &["internetClient"];

/// Subset of `tauri.conf.json` the bundler reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub product_name: Option<String>,
    pub version: Option<String>,
    pub identifier: Option<String>,
    #[serde(default)]
    pub bundle: BundleSection,
}

/// The `bundle` object of `tauri.conf.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSection {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
    pub windows: Option<WindowsSection>,
}

/// The `bundle.windows` object; carries the signing hint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsSection {
    pub certificate_thumbprint: Option<String>,
}

/// One entry of `bundle.resources`: either a glob pattern relative to
/// `src-tauri`, or an explicit source → target mapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResourceDecl {
    Pattern(String),
    Mapping { src: String, target: String },
}

/// The user-owned packaging configuration (`bundle.config.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    pub publisher: String,
    pub publisher_display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing: Option<Signing>,
}

/// Certificate material for the packer's signing flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfx_password: Option<String>,
}

/// Optional platform feature declarations.
///
/// Within each list the identifying key (name / alias / clsid / verb) is
/// unique; the operations in [`crate::extensions`] maintain that invariant by
/// updating an existing entry in place instead of appending a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extensions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub share_target: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_associations: Vec<FileAssociation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocol_handlers: Vec<ProtocolHandler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_task: Option<StartupTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context_menus: Vec<ContextMenu>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub background_tasks: Vec<BackgroundTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub app_execution_aliases: Vec<AppExecutionAlias>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub app_services: Vec<AppService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast_activation: Option<ToastActivation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub autoplay_handlers: Vec<AutoplayHandler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_task_settings: Option<PrintTaskSettings>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub thumbnail_handlers: Vec<ThumbnailHandler>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preview_handlers: Vec<PreviewHandler>,
}

impl Extensions {
    pub fn is_empty(&self) -> bool {
        *self == Extensions::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAssociation {
    pub name: String,
    pub extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolHandler {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupTask {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenu {
    pub name: String,
    pub file_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundTask {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BackgroundTaskKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundTaskKind {
    Timer,
    SystemEvent,
    PushNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppExecutionAlias {
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastActivation {
    pub activation_type: ToastActivationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastActivationKind {
    Foreground,
    Background,
    Protocol,
}

/// An autoplay declaration carries exactly one of a content event or a
/// device event; the enum makes the exclusivity structural while the
/// `flatten` keeps the on-disk JSON shape (`contentEvent`/`deviceEvent`
/// as sibling keys of `verb`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoplayHandler {
    pub verb: String,
    pub action_display_name: String,
    #[serde(flatten)]
    pub event: AutoplayEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoplayEvent {
    ContentEvent(String),
    DeviceEvent(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintTaskSettings {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailHandler {
    pub clsid: String,
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewHandler {
    pub clsid: String,
    pub file_types: Vec<String>,
}

/// Identity fields resolved from the project config layered over the
/// packaging config. Built once per manifest render; never written to disk.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub display_name: String,
    /// Always a four-part dotted version.
    pub version: String,
    pub description: String,
    pub identifier: String,
    pub bundle: BundleConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_config_roundtrips_with_camel_case_keys() {
        let json = r#"{
            "publisher": "CN=TestCompany",
            "publisherDisplayName": "Test Company",
            "capabilities": ["internetClient"],
            "extensions": {
                "shareTarget": true,
                "fileAssociations": [
                    { "name": "myfiles", "extensions": [".myf"], "description": "My files" }
                ]
            }
        }"#;

        let config: BundleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.publisher, "CN=TestCompany");
        assert!(config.extensions.share_target);
        assert_eq!(config.extensions.file_associations[0].name, "myfiles");

        let out = serde_json::to_string(&config).unwrap();
        assert!(out.contains("publisherDisplayName"));
        assert!(out.contains("shareTarget"));
        assert!(out.contains("fileAssociations"));
    }

    #[test]
    fn empty_extensions_block_is_omitted_when_serializing() {
        let config = BundleConfig {
            publisher: "CN=X".into(),
            publisher_display_name: "X".into(),
            capabilities: vec![],
            extensions: Extensions::default(),
            signing: None,
        };
        let out = serde_json::to_string(&config).unwrap();
        assert!(!out.contains("extensions"));
        assert!(!out.contains("signing"));
    }

    #[test]
    fn background_task_kind_uses_camel_case_values() {
        let task: BackgroundTask =
            serde_json::from_str(r#"{ "name": "sync", "type": "systemEvent" }"#).unwrap();
        assert_eq!(task.kind, BackgroundTaskKind::SystemEvent);

        let out = serde_json::to_string(&BackgroundTask {
            name: "push".into(),
            kind: BackgroundTaskKind::PushNotification,
        })
        .unwrap();
        assert!(out.contains(r#""type":"pushNotification""#));
    }

    #[test]
    fn autoplay_event_flattens_to_sibling_key() {
        let handler = AutoplayHandler {
            verb: "play".into(),
            action_display_name: "Play with MyApp".into(),
            event: AutoplayEvent::ContentEvent("PlayMusicFilesOnArrival".into()),
        };
        let out = serde_json::to_string(&handler).unwrap();
        assert!(out.contains(r#""contentEvent":"PlayMusicFilesOnArrival""#));
        assert!(!out.contains("deviceEvent"));

        let back: AutoplayHandler = serde_json::from_str(&out).unwrap();
        assert_eq!(back, handler);
    }

    #[test]
    fn resource_decl_parses_both_shapes() {
        let decls: Vec<ResourceDecl> = serde_json::from_str(
            r#"["assets/*", { "src": "data/config.json", "target": "resources/config.json" }]"#,
        )
        .unwrap();
        assert_eq!(decls[0], ResourceDecl::Pattern("assets/*".into()));
        assert_eq!(
            decls[1],
            ResourceDecl::Mapping {
                src: "data/config.json".into(),
                target: "resources/config.json".into(),
            }
        );
    }

    #[test]
    fn project_config_tolerates_missing_bundle_section() {
        let config: ProjectConfig =
            serde_json::from_str(r#"{ "productName": "TestApp", "version": "1.0.0" }"#).unwrap();
        assert_eq!(config.product_name.as_deref(), Some("TestApp"));
        assert!(config.bundle.resources.is_empty());
    }
}
