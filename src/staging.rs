//! Staging directory assembly.
//!
//! Builds `target/appx/<arch>/` with everything `msixbundle-cli` needs:
//! the release executable, the rendered `AppxManifest.xml`, the logo assets,
//! and any bundled resources declared in `tauri.conf.json`.
//!
//! The whole step is idempotent against a pre-existing staging tree; a
//! partial tree left by an earlier failure is simply overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::config::{MergedConfig, ProjectConfig, ResourceDecl};
use crate::discovery::{tauri_dir, windows_dir};
use crate::manifest::{
    executable_name, generate_manifest, render_manifest, Arch, MANIFEST_FILE,
    MANIFEST_TEMPLATE_FILE,
};

/// Assemble the staging directory for one architecture and return its path.
///
/// `windows_dir_override` substitutes the packaging-metadata directory
/// (normally `src-tauri/gen/windows`); tests use it to point at a fixture.
///
/// Fails fatally when the release executable is missing from
/// `target/<triple>/release` — nothing is written in that case.
pub fn prepare_appx_content(
    project_root: &Path,
    arch: Arch,
    config: &MergedConfig,
    project: &ProjectConfig,
    min_version: &str,
    windows_dir_override: Option<&Path>,
) -> Result<PathBuf> {
    let build_dir = project_root
        .join("target")
        .join(arch.target_triple())
        .join("release");
    let exe_name = executable_name(&config.display_name);
    let src_exe = build_dir.join(&exe_name);

    // Checked before any directory is created so a failed invocation leaves
    // no half-written manifest behind.
    if !src_exe.is_file() {
        bail!("Executable not found: {}", src_exe.display());
    }

    let appx_dir = project_root.join("target").join("appx").join(arch.label());
    let assets_dir = appx_dir.join("Assets");
    fs::create_dir_all(&assets_dir)
        .with_context(|| format!("creating staging directory '{}'", assets_dir.display()))?;

    fs::copy(&src_exe, appx_dir.join(&exe_name))
        .with_context(|| format!("copying executable '{}'", src_exe.display()))?;

    let metadata_dir = match windows_dir_override {
        Some(dir) => dir.to_path_buf(),
        None => windows_dir(project_root),
    };

    // A hand-edited template in the metadata directory wins over the
    // built-in one.
    let template_path = metadata_dir.join(MANIFEST_TEMPLATE_FILE);
    let manifest = if template_path.is_file() {
        let template = fs::read_to_string(&template_path)
            .with_context(|| format!("reading '{}'", template_path.display()))?;
        render_manifest(&template, config, arch, min_version)
    } else {
        generate_manifest(config, arch, min_version)
    };
    let manifest_path = appx_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, manifest)
        .with_context(|| format!("writing '{}'", manifest_path.display()))?;

    let source_assets = metadata_dir.join("Assets");
    if source_assets.is_dir() {
        copy_dir_recursive(&source_assets, &assets_dir)?;
    }

    copy_bundled_resources(project_root, &appx_dir, project)?;

    Ok(appx_dir)
}

/// Expand the project's resource declarations into the staging tree.
///
/// String declarations are glob patterns relative to `src-tauri`; a pattern
/// matching nothing is silently skipped. Mapping declarations copy their
/// source (a file, or a directory copied recursively) to the given target
/// path; a mapping whose source does not exist is a fatal error — a declared
/// resource is treated as required.
fn copy_bundled_resources(
    project_root: &Path,
    appx_dir: &Path,
    project: &ProjectConfig,
) -> Result<()> {
    let src_dir = tauri_dir(project_root);

    for resource in &project.bundle.resources {
        match resource {
            ResourceDecl::Pattern(pattern) => {
                // Only the declared pattern is glob syntax; the project path
                // it is anchored to may itself contain metacharacters.
                let escaped_root = glob::Pattern::escape(&src_dir.to_string_lossy());
                let full_pattern =
                    format!("{escaped_root}{}{pattern}", std::path::MAIN_SEPARATOR);
                let matches = glob::glob(&full_pattern)
                    .with_context(|| format!("invalid resource pattern '{pattern}'"))?;

                for entry in matches {
                    let path =
                        entry.with_context(|| format!("expanding resource pattern '{pattern}'"))?;
                    let rel = path
                        .strip_prefix(&src_dir)
                        .with_context(|| format!("resolving resource path '{}'", path.display()))?;
                    copy_resource(&path, &appx_dir.join(rel))?;
                }
            }
            ResourceDecl::Mapping { src, target } => {
                let source = src_dir.join(src);
                if !source.exists() {
                    bail!("Resource not found: {}", source.display());
                }
                copy_resource(&source, &appx_dir.join(target))?;
            }
        }
    }

    Ok(())
}

fn copy_resource(source: &Path, dest: &Path) -> Result<()> {
    if source.is_dir() {
        copy_dir_recursive(source, dest)
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating '{}'", parent.display()))?;
        }
        fs::copy(source, dest)
            .with_context(|| format!("copying '{}'", source.display()))?;
        Ok(())
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("walking '{}'", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("resolving '{}'", entry.path().display()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("creating '{}'", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating '{}'", parent.display()))?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("copying '{}'", entry.path().display()))?;
        }
    }
    Ok(())
}
