//! `init` scaffolding for the windows packaging metadata directory.
//!
//! Creates `src-tauri/gen/windows` with a starter `bundle.config.json`,
//! the editable manifest template, placeholder logo assets, an `extensions`
//! directory, and a `.gitignore`. Existing user files are never clobbered.
//! Also wires a `tauri:windows:build` script into the host `package.json`
//! when one is present.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::assets::generate_assets;
use crate::config::{BundleConfig, Extensions, DEFAULT_CAPABILITIES};
use crate::discovery::{windows_dir, write_bundle_config, BUNDLE_CONFIG_FILE};
use crate::manifest::{write_manifest_template, MANIFEST_TEMPLATE_FILE};

/// npm script name added to the host package.json.
pub const BUILD_SCRIPT_NAME: &str = "tauri:windows:build";

/// npm script body added to the host package.json.
pub const BUILD_SCRIPT_COMMAND: &str = "msix-bundle build";

const GITIGNORE: &str = "# Certificates must never be committed\n*.pfx\n*.cer\n";

/// What the package.json hookup ended with; surfaced so the binary can print
/// a warning instead of failing init over a cosmetic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageJsonOutcome {
    ScriptAdded,
    ScriptAlreadyPresent,
    FileMissing,
    FileUnreadable(String),
}

/// Create the metadata directory scaffold. Idempotent: files that already
/// exist are left untouched.
pub fn scaffold_windows_dir(project_root: &Path, publisher_display_name: &str) -> Result<()> {
    let windows_dir = windows_dir(project_root);
    fs::create_dir_all(windows_dir.join("extensions"))
        .with_context(|| format!("creating '{}'", windows_dir.display()))?;

    generate_assets(&windows_dir)?;

    if !windows_dir.join(BUNDLE_CONFIG_FILE).exists() {
        write_bundle_config(&windows_dir, &default_bundle_config(publisher_display_name))?;
    }

    if !windows_dir.join(MANIFEST_TEMPLATE_FILE).exists() {
        write_manifest_template(&windows_dir)?;
    }

    let gitignore = windows_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, GITIGNORE)
            .with_context(|| format!("writing '{}'", gitignore.display()))?;
    }

    Ok(())
}

/// The starter packaging configuration written by `init`.
pub fn default_bundle_config(publisher_display_name: &str) -> BundleConfig {
    BundleConfig {
        publisher: format!("CN={publisher_display_name}"),
        publisher_display_name: publisher_display_name.to_string(),
        capabilities: DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect(),
        extensions: Extensions::default(),
        signing: None,
    }
}

/// Add the build script to the host `package.json`, if there is one.
/// An existing script with the same name is left alone.
pub fn add_package_json_script(project_root: &Path) -> PackageJsonOutcome {
    let path = project_root.join("package.json");
    if !path.is_file() {
        return PackageJsonOutcome::FileMissing;
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => return PackageJsonOutcome::FileUnreadable(err.to_string()),
    };
    let mut json: serde_json::Value = match serde_json::from_str(&content) {
        Ok(json) => json,
        Err(err) => return PackageJsonOutcome::FileUnreadable(err.to_string()),
    };

    let Some(root) = json.as_object_mut() else {
        return PackageJsonOutcome::FileUnreadable("package.json is not an object".to_string());
    };
    let scripts = root
        .entry("scripts")
        .or_insert_with(|| serde_json::Value::Object(Default::default()));
    let Some(scripts) = scripts.as_object_mut() else {
        return PackageJsonOutcome::FileUnreadable("\"scripts\" is not an object".to_string());
    };

    if scripts.contains_key(BUILD_SCRIPT_NAME) {
        return PackageJsonOutcome::ScriptAlreadyPresent;
    }
    scripts.insert(
        BUILD_SCRIPT_NAME.to_string(),
        serde_json::Value::String(BUILD_SCRIPT_COMMAND.to_string()),
    );

    let mut out = match serde_json::to_string_pretty(&json) {
        Ok(out) => out,
        Err(err) => return PackageJsonOutcome::FileUnreadable(err.to_string()),
    };
    out.push('\n');
    match fs::write(&path, out) {
        Ok(()) => PackageJsonOutcome::ScriptAdded,
        Err(err) => PackageJsonOutcome::FileUnreadable(err.to_string()),
    }
}
