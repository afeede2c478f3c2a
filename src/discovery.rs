//! Project discovery and configuration merging.
//!
//! Locates the Tauri project root, reads `tauri.conf.json` and the optional
//! `tauri.windows.conf.json` overlay, loads and persists the packaging
//! configuration, and combines everything into the [`MergedConfig`] consumed
//! by the manifest generator.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::{BundleConfig, MergedConfig, ProjectConfig};

/// File name of the user-owned packaging configuration.
pub const BUNDLE_CONFIG_FILE: &str = "bundle.config.json";

/// Walk up from `start` (or the current directory) looking for a Tauri
/// project root: a directory containing `src-tauri/tauri.conf.json`, or a
/// `package.json` next to a `src-tauri` directory.
pub fn find_project_root(start: Option<&Path>) -> Result<PathBuf> {
    let mut dir = match start {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("resolving current directory")?,
    };

    loop {
        if dir.join("src-tauri").join("tauri.conf.json").is_file() {
            return Ok(dir);
        }
        if dir.join("package.json").is_file() && dir.join("src-tauri").is_dir() {
            return Ok(dir);
        }
        if !dir.pop() {
            bail!(
                "Could not find Tauri project root. \
                 Make sure you are in a Tauri project directory."
            );
        }
    }
}

/// The packaging-metadata directory: `src-tauri/gen/windows`.
pub fn windows_dir(project_root: &Path) -> PathBuf {
    project_root.join("src-tauri").join("gen").join("windows")
}

/// The directory `tauri.conf.json` lives in; relative version references and
/// bundled resources resolve against it.
pub fn tauri_dir(project_root: &Path) -> PathBuf {
    project_root.join("src-tauri")
}

/// Read and parse `src-tauri/tauri.conf.json`.
pub fn read_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let config_path = tauri_dir(project_root).join("tauri.conf.json");
    if !config_path.is_file() {
        bail!("tauri.conf.json not found at {}", config_path.display());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading '{}'", config_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse '{}'", config_path.display()))
}

/// Read `src-tauri/tauri.windows.conf.json` if present. Absence is not an
/// error; a present-but-unparseable file is.
pub fn read_windows_overlay(project_root: &Path) -> Result<Option<ProjectConfig>> {
    let config_path = tauri_dir(project_root).join("tauri.windows.conf.json");
    if !config_path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading '{}'", config_path.display()))?;
    let overlay = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse '{}'", config_path.display()))?;
    Ok(Some(overlay))
}

/// Read the packaging configuration from the windows metadata directory.
pub fn read_bundle_config(windows_dir: &Path) -> Result<BundleConfig> {
    let config_path = windows_dir.join(BUNDLE_CONFIG_FILE);
    if !config_path.is_file() {
        bail!("{BUNDLE_CONFIG_FILE} not found. Run 'msix-bundle init' first.");
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading '{}'", config_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse '{}'", config_path.display()))
}

/// Persist the packaging configuration wholesale: pretty-printed JSON with a
/// trailing newline. The document is always rewritten as a unit; there are no
/// partial updates.
pub fn write_bundle_config(windows_dir: &Path, config: &BundleConfig) -> Result<()> {
    let config_path = windows_dir.join(BUNDLE_CONFIG_FILE);
    let mut content =
        serde_json::to_string_pretty(config).context("serializing bundle config")?;
    content.push('\n');
    fs::write(&config_path, content)
        .with_context(|| format!("writing '{}'", config_path.display()))
}

/// Resolve a configured version string.
///
/// If the string names an existing file (relative to `config_dir`), that file
/// is read as JSON and its `version` field is used instead — the common Tauri
/// idiom of pointing `version` at `../package.json`. A referenced file that
/// is not valid JSON is a parse error; valid JSON without a string `version`
/// field is a configuration error. Anything that is not an existing file
/// passes through unchanged.
pub fn resolve_version(version: &str, config_dir: &Path) -> Result<String> {
    let referenced = config_dir.join(version);
    if !referenced.is_file() {
        return Ok(version.to_string());
    }

    let content = fs::read_to_string(&referenced)
        .with_context(|| format!("reading '{}'", referenced.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {version} as JSON"))?;

    match json.get("version").and_then(|v| v.as_str()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => bail!("File {version} does not contain a valid \"version\" field"),
    }
}

/// Signing thumbprint hint for the packer. The windows overlay's value takes
/// precedence over the base project config's.
pub fn certificate_thumbprint(
    overlay: Option<&ProjectConfig>,
    project: &ProjectConfig,
) -> Option<String> {
    overlay
        .and_then(|config| config.bundle.windows.as_ref())
        .or(project.bundle.windows.as_ref())
        .and_then(|windows| windows.certificate_thumbprint.clone())
}

/// Normalize a dotted version to exactly four numeric components: missing
/// trailing components become 0, components past the fourth are dropped.
pub fn to_four_part_version(version: &str) -> String {
    let mut parts: Vec<&str> = version.split('.').collect();
    while parts.len() < 4 {
        parts.push("0");
    }
    parts.truncate(4);
    parts.join(".")
}

/// Combine the packaging configuration with identity fields resolved from the
/// project configuration.
///
/// The project config owns identity (name, version, identifier, description);
/// the bundle config owns publisher, capabilities, extensions, and signing.
/// `default_name` is used when the project declares no product name.
pub fn merge_config(
    bundle: BundleConfig,
    project: &ProjectConfig,
    default_name: &str,
    config_dir: &Path,
) -> Result<MergedConfig> {
    let display_name = project
        .product_name
        .clone()
        .unwrap_or_else(|| default_name.to_string());

    let raw_version = match &project.version {
        Some(version) => version.as_str(),
        None => bail!("tauri.conf.json does not declare a version"),
    };
    let version = to_four_part_version(&resolve_version(raw_version, config_dir)?);

    let identifier = match &project.identifier {
        Some(identifier) => identifier.clone(),
        None => bail!("tauri.conf.json does not declare an identifier"),
    };

    let description = project
        .bundle
        .short_description
        .clone()
        .or_else(|| project.bundle.long_description.clone())
        .unwrap_or_else(|| display_name.clone());

    Ok(MergedConfig {
        display_name,
        version,
        description,
        identifier,
        bundle,
    })
}
