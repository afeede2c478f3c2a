//! Subprocess plumbing for the two external collaborators: the build runner
//! (`cargo` by default) and the `msixbundle-cli` packer.
//!
//! The bundler's only semantic dependency on the packer is a version string
//! from `--version`, compared against a minimum with ordinary three-part
//! numeric precedence. Everything else is opaque process invocation.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::config::Signing;

/// The external packaging tool invoked on each staging directory.
pub const MSIXBUNDLE_CLI: &str = "msixbundle-cli";

/// Oldest packer version the bundler works with.
pub const MIN_MSIXBUNDLE_CLI_VERSION: &str = "1.0.0";

/// Whether the packer is on PATH.
pub fn msixbundle_cli_installed() -> bool {
    which::which(MSIXBUNDLE_CLI).is_ok()
}

/// Ask the packer for its version. `None` when the tool cannot be run or its
/// output carries no recognizable version token.
pub fn msixbundle_cli_version() -> Option<String> {
    let output = Command::new(MSIXBUNDLE_CLI).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_version_token(&String::from_utf8_lossy(&output.stdout))
}

/// Extract the first `major.minor.patch` token from tool output such as
/// `msixbundle-cli 1.0.0` or a bare `1.0.0`.
pub fn parse_version_token(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .map(|token| token.trim_start_matches('v'))
        .find(|token| parse_three_part(token).is_some())
        .map(|token| token.to_string())
}

fn parse_three_part(version: &str) -> Option<(u32, u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}

/// Three-part numeric precedence: higher major always wins, then minor, then
/// patch. Malformed versions are never sufficient.
pub fn is_version_sufficient(version: &str, min_version: &str) -> bool {
    match (parse_three_part(version), parse_three_part(min_version)) {
        (Some(have), Some(want)) => have >= want,
        _ => false,
    }
}

/// Run a command to completion, failing on a non-zero exit status.
pub fn run(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .with_context(|| format!("running '{program}'"))?;

    if !status.success() {
        bail!("'{program}' failed with status {status}");
    }
    Ok(())
}

/// Build the packer's argument list for one staging directory.
///
/// Signing flags are derived from configuration: `--pfx`/`--pfx-password`
/// from the bundle config's signing block, `--thumbprint` from the project
/// config's certificate hint. An explicit thumbprint and a pfx can coexist;
/// the packer resolves precedence.
pub fn pack_args(
    appx_dir: &Path,
    output: &Path,
    signing: Option<&Signing>,
    thumbprint: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "pack".to_string(),
        "--dir".to_string(),
        appx_dir.display().to_string(),
        "--out".to_string(),
        output.display().to_string(),
    ];

    if let Some(signing) = signing {
        if let Some(pfx) = &signing.pfx {
            args.push("--pfx".to_string());
            args.push(pfx.clone());
            if let Some(password) = &signing.pfx_password {
                args.push("--pfx-password".to_string());
                args.push(password.clone());
            }
        }
    }

    if let Some(thumbprint) = thumbprint {
        args.push("--thumbprint".to_string());
        args.push(thumbprint.to_string());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn version_token_is_extracted_from_prefixed_output() {
        assert_eq!(
            parse_version_token("msixbundle-cli 1.2.3\n"),
            Some("1.2.3".to_string())
        );
        assert_eq!(parse_version_token("1.0.0"), Some("1.0.0".to_string()));
        assert_eq!(parse_version_token("v2.0.1"), Some("2.0.1".to_string()));
        assert_eq!(parse_version_token("no version here"), None);
    }

    #[test]
    fn version_comparison_follows_numeric_precedence() {
        assert!(is_version_sufficient("1.0.0", "1.0.0"));
        assert!(is_version_sufficient("2.0.0", "1.9.9"));
        assert!(is_version_sufficient("1.1.0", "1.0.9"));
        assert!(is_version_sufficient("1.0.1", "1.0.0"));
        assert!(!is_version_sufficient("1.0.0", "1.0.1"));
        assert!(!is_version_sufficient("0.9.9", "1.0.0"));
        assert!(!is_version_sufficient("10.0", "1.0.0"));
        assert!(!is_version_sufficient("garbage", "1.0.0"));
    }

    #[test]
    fn pack_args_without_signing() {
        let args = pack_args(
            &PathBuf::from("/tmp/appx/x64"),
            &PathBuf::from("/tmp/out.msix"),
            None,
            None,
        );
        assert_eq!(
            args,
            vec!["pack", "--dir", "/tmp/appx/x64", "--out", "/tmp/out.msix"]
        );
    }

    #[test]
    fn pack_args_include_pfx_and_password() {
        let signing = Signing {
            pfx: Some("cert.pfx".into()),
            pfx_password: Some("secret".into()),
        };
        let args = pack_args(
            &PathBuf::from("appx"),
            &PathBuf::from("out.msix"),
            Some(&signing),
            None,
        );
        assert!(args.windows(2).any(|w| w == ["--pfx", "cert.pfx"]));
        assert!(args.windows(2).any(|w| w == ["--pfx-password", "secret"]));
    }

    #[test]
    fn pack_args_include_thumbprint_hint() {
        let args = pack_args(
            &PathBuf::from("appx"),
            &PathBuf::from("out.msix"),
            None,
            Some("ABCDEF"),
        );
        assert!(args.windows(2).any(|w| w == ["--thumbprint", "ABCDEF"]));
    }

    #[test]
    fn pfx_password_without_pfx_is_ignored() {
        let signing = Signing {
            pfx: None,
            pfx_password: Some("secret".into()),
        };
        let args = pack_args(
            &PathBuf::from("appx"),
            &PathBuf::from("out.msix"),
            Some(&signing),
            None,
        );
        assert!(!args.iter().any(|a| a == "--pfx-password"));
    }

    #[test]
    fn run_propagates_nonzero_exit() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(run("false", &[], temp.path()).is_err());
        assert!(run("true", &[], temp.path()).is_ok());
    }
}
