//! Operations over the Extensions block of a [`BundleConfig`].
//!
//! Every operation here is pure with respect to the filesystem: it takes the
//! configuration by reference, mutates it in memory, and reports what it did.
//! Loading and persisting the document is the caller's job (the binary does a
//! read → mutate → write cycle around these).
//!
//! List-valued features are keyed (name / alias / clsid / verb); adding an
//! entry whose key already exists replaces that entry in place, so list
//! length never grows on a repeated add.

use anyhow::{bail, Result};

use crate::config::{
    AppExecutionAlias, AppService, AutoplayHandler, BackgroundTask, BundleConfig, ContextMenu,
    FileAssociation, PreviewHandler, PrintTaskSettings, ProtocolHandler, StartupTask,
    ThumbnailHandler, ToastActivation, ToastActivationKind,
};

/// Whether an upsert created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// The closed set of removable extension kinds. Dispatch over feature kinds
/// is exhaustive at compile time; the CLI maps its kebab-case argument onto
/// this enum at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    FileAssociation,
    Protocol,
    ContextMenu,
    BackgroundTask,
    AppExecutionAlias,
    AppService,
    Autoplay,
    ThumbnailHandler,
    PreviewHandler,
}

impl ExtensionKind {
    pub const ALL: &'static [ExtensionKind] = &[
        ExtensionKind::FileAssociation,
        ExtensionKind::Protocol,
        ExtensionKind::ContextMenu,
        ExtensionKind::BackgroundTask,
        ExtensionKind::AppExecutionAlias,
        ExtensionKind::AppService,
        ExtensionKind::Autoplay,
        ExtensionKind::ThumbnailHandler,
        ExtensionKind::PreviewHandler,
    ];

    pub fn parse(value: &str) -> Result<ExtensionKind> {
        match value {
            "file-association" => Ok(ExtensionKind::FileAssociation),
            "protocol" => Ok(ExtensionKind::Protocol),
            "context-menu" => Ok(ExtensionKind::ContextMenu),
            "background-task" => Ok(ExtensionKind::BackgroundTask),
            "app-execution-alias" => Ok(ExtensionKind::AppExecutionAlias),
            "app-service" => Ok(ExtensionKind::AppService),
            "autoplay" => Ok(ExtensionKind::Autoplay),
            "thumbnail-handler" => Ok(ExtensionKind::ThumbnailHandler),
            "preview-handler" => Ok(ExtensionKind::PreviewHandler),
            other => bail!(
                "unknown extension type '{other}'; valid types: {}",
                ExtensionKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionKind::FileAssociation => "file-association",
            ExtensionKind::Protocol => "protocol",
            ExtensionKind::ContextMenu => "context-menu",
            ExtensionKind::BackgroundTask => "background-task",
            ExtensionKind::AppExecutionAlias => "app-execution-alias",
            ExtensionKind::AppService => "app-service",
            ExtensionKind::Autoplay => "autoplay",
            ExtensionKind::ThumbnailHandler => "thumbnail-handler",
            ExtensionKind::PreviewHandler => "preview-handler",
        }
    }
}

fn upsert_by_key<T, F>(items: &mut Vec<T>, item: T, key: F) -> UpsertOutcome
where
    F: Fn(&T) -> &str,
{
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(index) => {
            items[index] = item;
            UpsertOutcome::Updated
        }
        None => {
            items.push(item);
            UpsertOutcome::Added
        }
    }
}

fn remove_by_key<T, F>(items: &mut Vec<T>, name: &str, key: F) -> bool
where
    F: Fn(&T) -> &str,
{
    match items.iter().position(|existing| key(existing) == name) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

pub fn upsert_file_association(
    config: &mut BundleConfig,
    assoc: FileAssociation,
) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.file_associations, assoc, |a| &a.name)
}

pub fn upsert_protocol_handler(
    config: &mut BundleConfig,
    handler: ProtocolHandler,
) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.protocol_handlers, handler, |h| &h.name)
}

pub fn upsert_context_menu(config: &mut BundleConfig, menu: ContextMenu) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.context_menus, menu, |m| &m.name)
}

pub fn upsert_background_task(config: &mut BundleConfig, task: BackgroundTask) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.background_tasks, task, |t| &t.name)
}

pub fn upsert_app_execution_alias(
    config: &mut BundleConfig,
    alias: AppExecutionAlias,
) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.app_execution_aliases, alias, |a| {
        &a.alias
    })
}

pub fn upsert_app_service(config: &mut BundleConfig, service: AppService) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.app_services, service, |s| &s.name)
}

pub fn upsert_autoplay_handler(
    config: &mut BundleConfig,
    handler: AutoplayHandler,
) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.autoplay_handlers, handler, |h| &h.verb)
}

pub fn upsert_thumbnail_handler(
    config: &mut BundleConfig,
    handler: ThumbnailHandler,
) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.thumbnail_handlers, handler, |h| &h.clsid)
}

pub fn upsert_preview_handler(
    config: &mut BundleConfig,
    handler: PreviewHandler,
) -> UpsertOutcome {
    upsert_by_key(&mut config.extensions.preview_handlers, handler, |h| &h.clsid)
}

pub fn set_share_target(config: &mut BundleConfig, enabled: bool) {
    config.extensions.share_target = enabled;
}

pub fn set_startup_task(config: &mut BundleConfig, enabled: bool) {
    config.extensions.startup_task = Some(StartupTask {
        enabled,
        task_id: None,
    });
}

pub fn enable_toast_activation(config: &mut BundleConfig, activation: ToastActivationKind) {
    config.extensions.toast_activation = Some(ToastActivation {
        activation_type: activation,
    });
}

pub fn disable_toast_activation(config: &mut BundleConfig) {
    config.extensions.toast_activation = None;
}

pub fn enable_print_task_settings(config: &mut BundleConfig, display_name: String) {
    config.extensions.print_task_settings = Some(PrintTaskSettings { display_name });
}

pub fn disable_print_task_settings(config: &mut BundleConfig) {
    config.extensions.print_task_settings = None;
}

/// Remove the entry of `kind` identified by `key`. Returns whether anything
/// was removed.
pub fn remove_extension(config: &mut BundleConfig, kind: ExtensionKind, key: &str) -> bool {
    let ext = &mut config.extensions;
    match kind {
        ExtensionKind::FileAssociation => remove_by_key(&mut ext.file_associations, key, |a| &a.name),
        ExtensionKind::Protocol => remove_by_key(&mut ext.protocol_handlers, key, |h| &h.name),
        ExtensionKind::ContextMenu => remove_by_key(&mut ext.context_menus, key, |m| &m.name),
        ExtensionKind::BackgroundTask => remove_by_key(&mut ext.background_tasks, key, |t| &t.name),
        ExtensionKind::AppExecutionAlias => {
            remove_by_key(&mut ext.app_execution_aliases, key, |a| &a.alias)
        }
        ExtensionKind::AppService => remove_by_key(&mut ext.app_services, key, |s| &s.name),
        ExtensionKind::Autoplay => remove_by_key(&mut ext.autoplay_handlers, key, |h| &h.verb),
        ExtensionKind::ThumbnailHandler => {
            remove_by_key(&mut ext.thumbnail_handlers, key, |h| &h.clsid)
        }
        ExtensionKind::PreviewHandler => {
            remove_by_key(&mut ext.preview_handlers, key, |h| &h.clsid)
        }
    }
}

/// Human-readable summary of every configured extension, one section per
/// feature kind.
pub fn describe_extensions(config: &BundleConfig) -> String {
    let ext = &config.extensions;
    let mut out = String::new();

    out.push_str(&format!(
        "  Share Target: {}\n",
        if ext.share_target { "enabled" } else { "disabled" }
    ));

    if ext.file_associations.is_empty() {
        out.push_str("  File Associations: none\n");
    } else {
        out.push_str("  File Associations:\n");
        for assoc in &ext.file_associations {
            out.push_str(&format!("    - {}: {}\n", assoc.name, assoc.extensions.join(", ")));
        }
    }

    if ext.protocol_handlers.is_empty() {
        out.push_str("  Protocol Handlers: none\n");
    } else {
        out.push_str("  Protocol Handlers:\n");
        for handler in &ext.protocol_handlers {
            let label = handler.display_name.as_deref().unwrap_or(&handler.name);
            out.push_str(&format!("    - {}:// ({})\n", handler.name, label));
        }
    }

    let startup = ext.startup_task.as_ref().map(|t| t.enabled).unwrap_or(false);
    out.push_str(&format!(
        "  Startup Task: {}\n",
        if startup { "enabled" } else { "disabled" }
    ));

    if ext.context_menus.is_empty() {
        out.push_str("  Context Menus: none\n");
    } else {
        out.push_str("  Context Menus:\n");
        for menu in &ext.context_menus {
            out.push_str(&format!("    - {}: {}\n", menu.name, menu.file_types.join(", ")));
        }
    }

    if ext.background_tasks.is_empty() {
        out.push_str("  Background Tasks: none\n");
    } else {
        out.push_str("  Background Tasks:\n");
        for task in &ext.background_tasks {
            out.push_str(&format!("    - {} ({:?})\n", task.name, task.kind));
        }
    }

    if ext.app_execution_aliases.is_empty() {
        out.push_str("  App Execution Aliases: none\n");
    } else {
        out.push_str("  App Execution Aliases:\n");
        for alias in &ext.app_execution_aliases {
            out.push_str(&format!("    - {}\n", alias.alias));
        }
    }

    if ext.app_services.is_empty() {
        out.push_str("  App Services: none\n");
    } else {
        out.push_str("  App Services:\n");
        for service in &ext.app_services {
            out.push_str(&format!("    - {}\n", service.name));
        }
    }

    out.push_str(&format!(
        "  Toast Activation: {}\n",
        if ext.toast_activation.is_some() { "enabled" } else { "disabled" }
    ));

    if ext.autoplay_handlers.is_empty() {
        out.push_str("  Autoplay Handlers: none\n");
    } else {
        out.push_str("  Autoplay Handlers:\n");
        for handler in &ext.autoplay_handlers {
            out.push_str(&format!("    - {}: {}\n", handler.verb, handler.action_display_name));
        }
    }

    out.push_str(&format!(
        "  Print Task Settings: {}\n",
        if ext.print_task_settings.is_some() { "enabled" } else { "disabled" }
    ));

    if ext.thumbnail_handlers.is_empty() {
        out.push_str("  Thumbnail Handlers: none\n");
    } else {
        out.push_str("  Thumbnail Handlers:\n");
        for handler in &ext.thumbnail_handlers {
            out.push_str(&format!("    - {}: {}\n", handler.clsid, handler.file_types.join(", ")));
        }
    }

    if ext.preview_handlers.is_empty() {
        out.push_str("  Preview Handlers: none\n");
    } else {
        out.push_str("  Preview Handlers:\n");
        for handler in &ext.preview_handlers {
            out.push_str(&format!("    - {}: {}\n", handler.clsid, handler.file_types.join(", ")));
        }
    }

    out
}
