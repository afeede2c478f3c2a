//! AppxManifest generation.
//!
//! Renders the merged configuration, target architecture, and minimum
//! Windows version into an `AppxManifest.xml` via `{{TOKEN}}` substitution.
//! Two fragments are built dynamically: the `<Extensions>` block (one
//! declaration per enabled feature that has a manifest representation) and
//! the `<Capabilities>` list.
//!
//! Values are substituted verbatim — nothing is XML-escaped here. Display
//! names, association names, and the like must not contain XML-special
//! characters; guaranteeing that is the caller's responsibility.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::{Extensions, MergedConfig};
use crate::template::replace_template_variables;

/// Manifest file name inside the staging directory.
pub const MANIFEST_FILE: &str = "AppxManifest.xml";

/// Template file name inside the windows metadata directory. When present,
/// staging renders this user-edited skeleton instead of the built-in one.
pub const MANIFEST_TEMPLATE_FILE: &str = "AppxManifest.xml.template";

const MANIFEST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package
  xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
  xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
  xmlns:uap3="http://schemas.microsoft.com/appx/manifest/uap/windows10/3"
  xmlns:desktop="http://schemas.microsoft.com/appx/manifest/desktop/windows10"
  xmlns:rescap="http://schemas.microsoft.com/appx/manifest/foundation/windows10/restrictedcapabilities">

  <Identity
    Name="{{PACKAGE_NAME}}"
    Publisher="{{PUBLISHER}}"
    Version="{{VERSION}}"
    ProcessorArchitecture="{{ARCH}}" />

  <Properties>
    <DisplayName>{{DISPLAY_NAME}}</DisplayName>
    <PublisherDisplayName>{{PUBLISHER_DISPLAY_NAME}}</PublisherDisplayName>
    <Logo>Assets\StoreLogo.png</Logo>
  </Properties>

  <Dependencies>
    <TargetDeviceFamily Name="Windows.Desktop"
      MinVersion="{{MIN_VERSION}}"
      MaxVersionTested="10.0.22621.0" />
  </Dependencies>

  <Resources>
    <Resource Language="en-us" />
  </Resources>

  <Applications>
    <Application Id="App"
      Executable="{{EXECUTABLE}}"
      EntryPoint="Windows.FullTrustApplication">
      <uap:VisualElements
        DisplayName="{{DISPLAY_NAME}}"
        Description="{{DESCRIPTION}}"
        BackgroundColor="transparent"
        Square150x150Logo="Assets\Square150x150Logo.png"
        Square44x44Logo="Assets\Square44x44Logo.png">
        <uap:DefaultTile Wide310x150Logo="Assets\Wide310x150Logo.png" />
      </uap:VisualElements>

{{EXTENSIONS}}
    </Application>
  </Applications>

  <Capabilities>
{{CAPABILITIES}}
  </Capabilities>
</Package>
"#;

/// Target architecture for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    pub fn parse(value: &str) -> Result<Arch> {
        match value {
            "x64" => Ok(Arch::X64),
            "arm64" => Ok(Arch::Arm64),
            other => bail!("unsupported architecture '{other}'; expected 'x64' or 'arm64'"),
        }
    }

    /// The manifest's `ProcessorArchitecture` value, also used as the staging
    /// subdirectory name.
    pub fn label(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// The Rust target triple whose release output is packaged.
    pub fn target_triple(self) -> &'static str {
        match self {
            Arch::X64 => "x86_64-pc-windows-msvc",
            Arch::Arm64 => "aarch64-pc-windows-msvc",
        }
    }
}

/// Executable file name derived from the display name: whitespace stripped,
/// `.exe` suffix appended.
pub fn executable_name(display_name: &str) -> String {
    let stripped: String = display_name.split_whitespace().collect();
    format!("{stripped}.exe")
}

/// Write the unrendered built-in template to `AppxManifest.xml.template`
/// inside `windows_dir`, for users who want to hand-edit the skeleton.
pub fn write_manifest_template(windows_dir: &Path) -> Result<()> {
    let template_path = windows_dir.join(MANIFEST_TEMPLATE_FILE);
    fs::write(&template_path, MANIFEST_TEMPLATE)
        .with_context(|| format!("writing '{}'", template_path.display()))
}

/// Render the built-in manifest template.
pub fn generate_manifest(config: &MergedConfig, arch: Arch, min_version: &str) -> String {
    render_manifest(MANIFEST_TEMPLATE, config, arch, min_version)
}

/// Render an arbitrary manifest template (built-in or user-supplied) with the
/// token values derived from `config`. Deterministic, no side effects.
pub fn render_manifest(
    template: &str,
    config: &MergedConfig,
    arch: Arch,
    min_version: &str,
) -> String {
    let mut variables = HashMap::new();
    // The package name is the identifier with dots stripped; the identifier
    // itself keeps them.
    variables.insert(
        "PACKAGE_NAME".to_string(),
        config.identifier.replace('.', ""),
    );
    variables.insert("PUBLISHER".to_string(), config.bundle.publisher.clone());
    variables.insert("VERSION".to_string(), config.version.clone());
    variables.insert("ARCH".to_string(), arch.label().to_string());
    variables.insert("DISPLAY_NAME".to_string(), config.display_name.clone());
    variables.insert(
        "PUBLISHER_DISPLAY_NAME".to_string(),
        config.bundle.publisher_display_name.clone(),
    );
    variables.insert("MIN_VERSION".to_string(), min_version.to_string());
    variables.insert(
        "EXECUTABLE".to_string(),
        executable_name(&config.display_name),
    );
    variables.insert("DESCRIPTION".to_string(), config.description.clone());
    variables.insert(
        "EXTENSIONS".to_string(),
        extensions_fragment(&config.bundle.extensions),
    );
    variables.insert(
        "CAPABILITIES".to_string(),
        capabilities_fragment(&config.bundle.capabilities),
    );

    replace_template_variables(template, &variables)
}

/// Build the `<uap:Extension>` declarations for the feature kinds that have a
/// manifest representation: share target, file type associations, and
/// protocol handlers. Blocks are separated by a blank line; no enabled
/// features yields an empty fragment.
fn extensions_fragment(extensions: &Extensions) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if extensions.share_target {
        blocks.push(
            r#"      <uap:Extension Category="windows.shareTarget">
        <uap:ShareTarget>
          <uap:SupportedFileTypes>
            <uap:SupportsAnyFileType />
          </uap:SupportedFileTypes>
          <uap:DataFormat>Text</uap:DataFormat>
          <uap:DataFormat>Uri</uap:DataFormat>
        </uap:ShareTarget>
      </uap:Extension>"#
                .to_string(),
        );
    }

    for assoc in &extensions.file_associations {
        let file_types = assoc
            .extensions
            .iter()
            .map(|ext| format!("          <uap:FileType>{ext}</uap:FileType>"))
            .collect::<Vec<_>>()
            .join("\n");

        blocks.push(format!(
            r#"      <uap:Extension Category="windows.fileTypeAssociation">
        <uap:FileTypeAssociation Name="{name}">
          <uap:SupportedFileTypes>
{file_types}
          </uap:SupportedFileTypes>
        </uap:FileTypeAssociation>
      </uap:Extension>"#,
            name = assoc.name,
        ));
    }

    for handler in &extensions.protocol_handlers {
        let label = handler.display_name.as_deref().unwrap_or(&handler.name);
        blocks.push(format!(
            r#"      <uap:Extension Category="windows.protocol">
        <uap:Protocol Name="{name}">
          <uap:DisplayName>{label}</uap:DisplayName>
        </uap:Protocol>
      </uap:Extension>"#,
            name = handler.name,
        ));
    }

    blocks.join("\n\n")
}

/// One `<Capability>` line per declared name, input order preserved,
/// duplicates passed through unchanged.
fn capabilities_fragment(capabilities: &[String]) -> String {
    capabilities
        .iter()
        .map(|cap| format!(r#"    <Capability Name="{cap}" />"#))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BundleConfig, Extensions, FileAssociation, ProtocolHandler,
    };
    use tempfile::TempDir;

    fn merged_config() -> MergedConfig {
        MergedConfig {
            display_name: "Test App".into(),
            version: "1.0.0.0".into(),
            description: "A test application".into(),
            identifier: "com.example.testapp".into(),
            bundle: BundleConfig {
                publisher: "CN=TestCompany".into(),
                publisher_display_name: "Test Company".into(),
                capabilities: vec!["internetClient".into()],
                extensions: Extensions::default(),
                signing: None,
            },
        }
    }

    #[test]
    fn replaces_all_template_variables() {
        let manifest = generate_manifest(&merged_config(), Arch::X64, "10.0.17763.0");

        assert!(!manifest.contains("{{"));
        assert!(manifest.contains("Test App"));
        assert!(manifest.contains("CN=TestCompany"));
        assert!(manifest.contains("1.0.0.0"));
    }

    #[test]
    fn package_name_strips_identifier_dots() {
        let manifest = generate_manifest(&merged_config(), Arch::X64, "10.0.17763.0");
        assert!(manifest.contains(r#"Name="comexampletestapp""#));
    }

    #[test]
    fn arm64_architecture_is_stamped() {
        let manifest = generate_manifest(&merged_config(), Arch::Arm64, "10.0.17763.0");
        assert!(manifest.contains(r#"ProcessorArchitecture="arm64""#));
    }

    #[test]
    fn x64_architecture_is_stamped() {
        let manifest = generate_manifest(&merged_config(), Arch::X64, "10.0.17763.0");
        assert!(manifest.contains(r#"ProcessorArchitecture="x64""#));
    }

    #[test]
    fn executable_name_strips_whitespace() {
        assert_eq!(executable_name("Test App"), "TestApp.exe");
        assert_eq!(executable_name("App"), "App.exe");
        assert_eq!(executable_name("My  Cool\tApp"), "MyCoolApp.exe");
    }

    #[test]
    fn capabilities_render_in_order_without_dedup() {
        let mut config = merged_config();
        config.bundle.capabilities =
            vec!["internetClient".into(), "webcam".into(), "webcam".into()];
        let manifest = generate_manifest(&config, Arch::X64, "10.0.17763.0");

        assert!(manifest.contains(r#"<Capability Name="internetClient" />"#));
        assert_eq!(manifest.matches(r#"<Capability Name="webcam" />"#).count(), 2);
    }

    #[test]
    fn share_target_extension_is_emitted_when_enabled() {
        let mut config = merged_config();
        config.bundle.extensions.share_target = true;
        let manifest = generate_manifest(&config, Arch::X64, "10.0.17763.0");

        assert!(manifest.contains("windows.shareTarget"));
        assert!(manifest.contains("<uap:ShareTarget>"));
    }

    #[test]
    fn file_association_expands_each_extension() {
        let mut config = merged_config();
        config.bundle.extensions.file_associations.push(FileAssociation {
            name: "myfiles".into(),
            extensions: vec![".myf".into(), ".myx".into()],
            description: None,
        });
        let manifest = generate_manifest(&config, Arch::X64, "10.0.17763.0");

        assert!(manifest.contains("windows.fileTypeAssociation"));
        assert!(manifest.contains(r#"<uap:FileTypeAssociation Name="myfiles">"#));
        assert!(manifest.contains("<uap:FileType>.myf</uap:FileType>"));
        assert!(manifest.contains("<uap:FileType>.myx</uap:FileType>"));
    }

    #[test]
    fn protocol_handler_prefers_display_name() {
        let mut config = merged_config();
        config.bundle.extensions.protocol_handlers.push(ProtocolHandler {
            name: "myapp".into(),
            display_name: Some("My App Protocol".into()),
        });
        let manifest = generate_manifest(&config, Arch::X64, "10.0.17763.0");

        assert!(manifest.contains("windows.protocol"));
        assert!(manifest.contains(r#"<uap:Protocol Name="myapp">"#));
        assert!(manifest.contains("<uap:DisplayName>My App Protocol</uap:DisplayName>"));
    }

    #[test]
    fn protocol_handler_falls_back_to_name() {
        let mut config = merged_config();
        config.bundle.extensions.protocol_handlers.push(ProtocolHandler {
            name: "myapp".into(),
            display_name: None,
        });
        let manifest = generate_manifest(&config, Arch::X64, "10.0.17763.0");
        assert!(manifest.contains("<uap:DisplayName>myapp</uap:DisplayName>"));
    }

    #[test]
    fn no_enabled_features_yield_empty_fragment() {
        assert_eq!(extensions_fragment(&Extensions::default()), "");
    }

    #[test]
    fn enabled_features_are_separated_by_blank_lines() {
        let mut extensions = Extensions::default();
        extensions.share_target = true;
        extensions.protocol_handlers.push(ProtocolHandler {
            name: "myapp".into(),
            display_name: None,
        });
        let fragment = extensions_fragment(&extensions);
        assert!(fragment.contains("</uap:Extension>\n\n      <uap:Extension"));
    }

    #[test]
    fn template_file_contains_unrendered_tokens() {
        let temp = TempDir::new().unwrap();
        write_manifest_template(temp.path()).unwrap();

        let content =
            std::fs::read_to_string(temp.path().join(MANIFEST_TEMPLATE_FILE)).unwrap();
        assert!(content.contains(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(content.contains("{{PACKAGE_NAME}}"));
        assert!(content.contains("{{PUBLISHER}}"));
        assert!(content.contains("{{VERSION}}"));
        assert!(content.contains("{{ARCH}}"));
        assert!(content.contains("{{DISPLAY_NAME}}"));
        assert!(content.contains("{{EXTENSIONS}}"));
        assert!(content.contains("{{CAPABILITIES}}"));
    }

    #[test]
    fn custom_template_is_rendered_with_same_tokens() {
        let manifest = render_manifest(
            "<App name=\"{{DISPLAY_NAME}}\" exe=\"{{EXECUTABLE}}\" />",
            &merged_config(),
            Arch::X64,
            "10.0.17763.0",
        );
        assert_eq!(manifest, "<App name=\"Test App\" exe=\"TestApp.exe\" />");
    }

    #[test]
    fn arch_parse_accepts_known_tags_only() {
        assert_eq!(Arch::parse("x64").unwrap(), Arch::X64);
        assert_eq!(Arch::parse("arm64").unwrap(), Arch::Arm64);
        assert!(Arch::parse("ia64").is_err());
    }
}
