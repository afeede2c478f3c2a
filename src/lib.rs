//! MSIX packaging for Tauri desktop applications.
//!
//! This crate generates a Windows MSIX application package from a Tauri
//! project's release build. It merges the project's `tauri.conf.json` with a
//! user-editable `bundle.config.json`, renders an `AppxManifest.xml` from a
//! token template, assembles a per-architecture staging directory (executable,
//! logo assets, bundled resources), and hands that directory to the external
//! `msixbundle-cli` packer.
//!
//! # Pipeline
//!
//! ```text
//! tauri.conf.json ──┐
//!                   ├─ discovery::merge_config ─► MergedConfig
//! bundle.config.json┘                                 │
//!                                                     ▼
//!                        manifest::generate_manifest (token template)
//!                                                     │
//!                                                     ▼
//!                        staging::prepare_appx_content
//!                          target/appx/<arch>/
//!                            ├── <App>.exe
//!                            ├── AppxManifest.xml
//!                            ├── Assets/...
//!                            └── bundled resources
//! ```
//!
//! The library itself never prints or prompts; all user interaction lives in
//! the `msix-bundle` binary. Filesystem writes are scoped to one staging tree
//! per invocation, and a partially assembled staging directory is disposable
//! scratch state — rerunning the build overwrites it.

pub mod assets;
pub mod capabilities;
pub mod config;
pub mod discovery;
pub mod exec;
pub mod extensions;
pub mod manifest;
pub mod scaffold;
pub mod staging;
pub mod template;

pub use config::{BundleConfig, MergedConfig, ProjectConfig};
pub use manifest::Arch;
