use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use msix_bundle::capabilities::{partition_capabilities, validate_capabilities};
use msix_bundle::config::{
    AppExecutionAlias, AppService, AutoplayEvent, AutoplayHandler, BackgroundTask,
    BackgroundTaskKind, BundleConfig, ContextMenu, FileAssociation, PreviewHandler,
    ProtocolHandler, ThumbnailHandler, ToastActivationKind, DEFAULT_MIN_WINDOWS_VERSION,
};
use msix_bundle::discovery::{
    certificate_thumbprint, find_project_root, merge_config, read_bundle_config,
    read_project_config, read_windows_overlay, tauri_dir, windows_dir, write_bundle_config,
};
use msix_bundle::exec::{
    is_version_sufficient, msixbundle_cli_installed, msixbundle_cli_version, pack_args, run,
    MIN_MSIXBUNDLE_CLI_VERSION, MSIXBUNDLE_CLI,
};
use msix_bundle::extensions::{
    self, ExtensionKind, UpsertOutcome,
};
use msix_bundle::manifest::Arch;
use msix_bundle::scaffold::{
    add_package_json_script, scaffold_windows_dir, PackageJsonOutcome,
};
use msix_bundle::staging::prepare_appx_content;

const DEFAULT_RUNNER: &str = "cargo";

fn usage() -> &'static str {
    "Usage:\n  \
     msix-bundle init [--path <dir>]\n  \
     msix-bundle build [--arch <x64,arm64>] [--release] [--min-windows <version>]\n               \
     [--runner <cmd>] [--path <dir>]\n  \
     msix-bundle extension list\n  \
     msix-bundle extension add file-association <name> <.ext,.ext> [description]\n  \
     msix-bundle extension add protocol <name> [display-name]\n  \
     msix-bundle extension add context-menu <name> <types,...> [display-name]\n  \
     msix-bundle extension add background-task <name> <timer|systemEvent|pushNotification>\n  \
     msix-bundle extension add app-execution-alias <alias>\n  \
     msix-bundle extension add app-service <name> [server-name]\n  \
     msix-bundle extension add autoplay <verb> <display-name> <content|device> <event>\n  \
     msix-bundle extension add thumbnail-handler <clsid> <types,...>\n  \
     msix-bundle extension add preview-handler <clsid> <types,...>\n  \
     msix-bundle extension enable <share-target|startup-task|toast-activation|print-task-settings>\n  \
     msix-bundle extension disable <share-target|startup-task|toast-activation|print-task-settings>\n  \
     msix-bundle extension remove <type> <name>"
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = dispatch(&args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn dispatch(args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("init") => init(&args[1..]),
        Some("build") => build(&args[1..]),
        Some("extension") => extension(&args[1..]),
        Some("--help") | Some("-h") | None => {
            println!("{}", usage());
            Ok(())
        }
        Some(other) => bail!("unknown command '{other}'\n{}", usage()),
    }
}

fn parse_path_option(args: &[String]) -> Result<Option<PathBuf>> {
    let mut path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--path" | "-p" => {
                let value = iter.next().with_context(|| format!("{arg} requires a value"))?;
                path = Some(PathBuf::from(value));
            }
            other => bail!("unknown option '{other}'\n{}", usage()),
        }
    }
    Ok(path)
}

fn init(args: &[String]) -> Result<()> {
    let path = parse_path_option(args)?;
    let project_root = find_project_root(path.as_deref())?;

    let display_name = read_project_config(&project_root)
        .ok()
        .and_then(|config| config.product_name)
        .unwrap_or_else(|| "Publisher".to_string());

    scaffold_windows_dir(&project_root, &display_name)?;

    match add_package_json_script(&project_root) {
        PackageJsonOutcome::ScriptAdded => {
            println!("Added 'tauri:windows:build' script to package.json");
        }
        PackageJsonOutcome::ScriptAlreadyPresent => {}
        PackageJsonOutcome::FileMissing => {
            println!("Warning: package.json not found; skipping build script");
        }
        PackageJsonOutcome::FileUnreadable(reason) => {
            println!("Warning: Could not update package.json: {reason}");
        }
    }

    println!(
        "Initialized Windows bundle configuration in {}",
        windows_dir(&project_root).display()
    );
    println!("Replace the placeholder images under Assets/ before shipping.");
    Ok(())
}

struct BuildOptions {
    archs: Vec<Arch>,
    release: bool,
    min_windows: String,
    runner: String,
    path: Option<PathBuf>,
}

fn parse_build_options(args: &[String]) -> Result<BuildOptions> {
    let mut options = BuildOptions {
        archs: vec![Arch::X64],
        release: false,
        min_windows: DEFAULT_MIN_WINDOWS_VERSION.to_string(),
        runner: DEFAULT_RUNNER.to_string(),
        path: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--arch" => {
                let value = iter.next().context("--arch requires a value")?;
                options.archs = value
                    .split(',')
                    .map(|tag| Arch::parse(tag.trim()))
                    .collect::<Result<Vec<_>>>()?;
            }
            "--release" => options.release = true,
            "--min-windows" => {
                options.min_windows = iter
                    .next()
                    .context("--min-windows requires a value")?
                    .clone();
            }
            "--runner" => {
                options.runner = iter.next().context("--runner requires a value")?.clone();
            }
            "--path" | "-p" => {
                let value = iter.next().with_context(|| format!("{arg} requires a value"))?;
                options.path = Some(PathBuf::from(value));
            }
            other => bail!("unknown option '{other}'\n{}", usage()),
        }
    }
    Ok(options)
}

fn build(args: &[String]) -> Result<()> {
    let options = parse_build_options(args)?;
    let project_root = find_project_root(options.path.as_deref())?;
    let project = read_project_config(&project_root)?;
    let overlay = read_windows_overlay(&project_root)?;
    let bundle = read_bundle_config(&windows_dir(&project_root))?;

    if !msixbundle_cli_installed() {
        bail!(
            "{MSIXBUNDLE_CLI} not found in PATH; install it and run the build again"
        );
    }
    match msixbundle_cli_version() {
        Some(version) if is_version_sufficient(&version, MIN_MSIXBUNDLE_CLI_VERSION) => {}
        Some(version) => bail!(
            "{MSIXBUNDLE_CLI} {version} is too old; {MIN_MSIXBUNDLE_CLI_VERSION} or newer is required"
        ),
        None => bail!("could not determine the {MSIXBUNDLE_CLI} version"),
    }

    // Capability findings are advisory; an invalid name produces a package
    // that installs but is rejected at Store submission.
    for finding in validate_capabilities(&partition_capabilities(&bundle.capabilities)) {
        eprintln!("Warning: {finding}");
    }

    let default_name = project_root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "App".to_string());
    let merged = merge_config(bundle, &project, &default_name, &tauri_dir(&project_root))?;

    let thumbprint = certificate_thumbprint(overlay.as_ref(), &project);

    for &arch in &options.archs {
        println!("[build:{}] compiling {}", arch.label(), merged.display_name);
        let mut cargo_args = vec!["build", "--target", arch.target_triple()];
        if options.release {
            cargo_args.push("--release");
        }
        run(&options.runner, &cargo_args, &tauri_dir(&project_root))?;

        println!("[build:{}] staging package content", arch.label());
        let appx_dir = prepare_appx_content(
            &project_root,
            arch,
            &merged,
            &project,
            &options.min_windows,
            None,
        )?;

        let output = project_root.join("target").join("appx").join(format!(
            "{}_{}_{}.msix",
            merged.display_name.split_whitespace().collect::<String>(),
            merged.version,
            arch.label()
        ));
        let args = pack_args(&appx_dir, &output, merged.bundle.signing.as_ref(), thumbprint.as_deref());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run(MSIXBUNDLE_CLI, &arg_refs, &project_root)?;

        println!("[build:{}] created {}", arch.label(), output.display());
    }

    Ok(())
}

fn extension(args: &[String]) -> Result<()> {
    let project_root = find_project_root(None)?;
    let windows_dir = windows_dir(&project_root);

    match args.first().map(String::as_str) {
        Some("list") => {
            let config = read_bundle_config(&windows_dir)?;
            println!("\nConfigured extensions:\n");
            print!("{}", extensions::describe_extensions(&config));
            Ok(())
        }
        Some("add") => {
            let mut config = read_bundle_config(&windows_dir)?;
            let message = extension_add(&mut config, &args[1..])?;
            write_bundle_config(&windows_dir, &config)?;
            println!("{message}");
            Ok(())
        }
        Some("enable") => {
            let mut config = read_bundle_config(&windows_dir)?;
            let message = extension_toggle(&mut config, &args[1..], true)?;
            write_bundle_config(&windows_dir, &config)?;
            println!("{message}");
            Ok(())
        }
        Some("disable") => {
            let mut config = read_bundle_config(&windows_dir)?;
            let message = extension_toggle(&mut config, &args[1..], false)?;
            write_bundle_config(&windows_dir, &config)?;
            println!("{message}");
            Ok(())
        }
        Some("remove") => {
            let [kind, name] = &args[1..] else {
                bail!("extension remove expects <type> <name>\n{}", usage());
            };
            let kind = ExtensionKind::parse(kind)?;
            let mut config = read_bundle_config(&windows_dir)?;
            if extensions::remove_extension(&mut config, kind, name) {
                write_bundle_config(&windows_dir, &config)?;
                println!("{} '{name}' removed.", kind.as_str());
            } else {
                println!("{} '{name}' not found.", kind.as_str());
            }
            Ok(())
        }
        _ => bail!("unknown extension subcommand\n{}", usage()),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// File extensions always carry their leading dot, whether or not the user
/// typed one.
fn normalize_file_extensions(value: &str) -> Vec<String> {
    split_list(value)
        .into_iter()
        .map(|ext| {
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        })
        .collect()
}

fn extension_add(config: &mut BundleConfig, args: &[String]) -> Result<String> {
    let Some(kind) = args.first() else {
        bail!("extension add expects a type\n{}", usage());
    };
    let kind = ExtensionKind::parse(kind)?;
    let rest = &args[1..];

    let (outcome, label) = match kind {
        ExtensionKind::FileAssociation => {
            let (name, extensions_arg) = match rest {
                [name, ext] | [name, ext, _] => (name, ext),
                _ => bail!("usage: extension add file-association <name> <.ext,.ext> [description]"),
            };
            let assoc = FileAssociation {
                name: name.clone(),
                extensions: normalize_file_extensions(extensions_arg),
                description: rest.get(2).cloned(),
            };
            (
                extensions::upsert_file_association(config, assoc),
                format!("File association '{name}'"),
            )
        }
        ExtensionKind::Protocol => {
            let [name, ..] = rest else {
                bail!("usage: extension add protocol <name> [display-name]");
            };
            let handler = ProtocolHandler {
                name: name.clone(),
                display_name: rest.get(1).cloned(),
            };
            (
                extensions::upsert_protocol_handler(config, handler),
                format!("Protocol handler '{name}://'"),
            )
        }
        ExtensionKind::ContextMenu => {
            let [name, types, ..] = rest else {
                bail!("usage: extension add context-menu <name> <types,...> [display-name]");
            };
            let menu = ContextMenu {
                name: name.clone(),
                file_types: split_list(types),
                display_name: rest.get(2).cloned(),
            };
            (
                extensions::upsert_context_menu(config, menu),
                format!("Context menu '{name}'"),
            )
        }
        ExtensionKind::BackgroundTask => {
            let [name, task_kind] = rest else {
                bail!("usage: extension add background-task <name> <timer|systemEvent|pushNotification>");
            };
            let task = BackgroundTask {
                name: name.clone(),
                kind: parse_background_task_kind(task_kind)?,
            };
            (
                extensions::upsert_background_task(config, task),
                format!("Background task '{name}'"),
            )
        }
        ExtensionKind::AppExecutionAlias => {
            let [alias] = rest else {
                bail!("usage: extension add app-execution-alias <alias>");
            };
            (
                extensions::upsert_app_execution_alias(
                    config,
                    AppExecutionAlias { alias: alias.clone() },
                ),
                format!("App execution alias '{alias}'"),
            )
        }
        ExtensionKind::AppService => {
            let [name, ..] = rest else {
                bail!("usage: extension add app-service <name> [server-name]");
            };
            let service = AppService {
                name: name.clone(),
                server_name: rest.get(1).cloned(),
            };
            (
                extensions::upsert_app_service(config, service),
                format!("App service '{name}'"),
            )
        }
        ExtensionKind::Autoplay => {
            let [verb, display_name, event_kind, event] = rest else {
                bail!("usage: extension add autoplay <verb> <display-name> <content|device> <event>");
            };
            let event = match event_kind.as_str() {
                "content" => AutoplayEvent::ContentEvent(event.clone()),
                "device" => AutoplayEvent::DeviceEvent(event.clone()),
                other => bail!("unknown autoplay event type '{other}'; expected 'content' or 'device'"),
            };
            let handler = AutoplayHandler {
                verb: verb.clone(),
                action_display_name: display_name.clone(),
                event,
            };
            (
                extensions::upsert_autoplay_handler(config, handler),
                format!("Autoplay handler '{verb}'"),
            )
        }
        ExtensionKind::ThumbnailHandler => {
            let [clsid, types] = rest else {
                bail!("usage: extension add thumbnail-handler <clsid> <types,...>");
            };
            let handler = ThumbnailHandler {
                clsid: clsid.clone(),
                file_types: normalize_file_extensions(types),
            };
            (
                extensions::upsert_thumbnail_handler(config, handler),
                format!("Thumbnail handler '{clsid}'"),
            )
        }
        ExtensionKind::PreviewHandler => {
            let [clsid, types] = rest else {
                bail!("usage: extension add preview-handler <clsid> <types,...>");
            };
            let handler = PreviewHandler {
                clsid: clsid.clone(),
                file_types: normalize_file_extensions(types),
            };
            (
                extensions::upsert_preview_handler(config, handler),
                format!("Preview handler '{clsid}'"),
            )
        }
    };

    Ok(match outcome {
        UpsertOutcome::Added => format!("{label} added."),
        UpsertOutcome::Updated => format!("{label} updated."),
    })
}

fn parse_background_task_kind(value: &str) -> Result<BackgroundTaskKind> {
    match value {
        "timer" => Ok(BackgroundTaskKind::Timer),
        "systemEvent" => Ok(BackgroundTaskKind::SystemEvent),
        "pushNotification" => Ok(BackgroundTaskKind::PushNotification),
        other => bail!(
            "unknown background task type '{other}'; expected 'timer', 'systemEvent', or 'pushNotification'"
        ),
    }
}

fn extension_toggle(config: &mut BundleConfig, args: &[String], enable: bool) -> Result<String> {
    let Some(feature) = args.first() else {
        bail!("extension enable/disable expects a feature name\n{}", usage());
    };
    let state = if enable { "enabled" } else { "disabled" };

    match feature.as_str() {
        "share-target" => {
            extensions::set_share_target(config, enable);
            Ok(format!("Share Target {state}."))
        }
        "startup-task" => {
            extensions::set_startup_task(config, enable);
            Ok(format!("Startup Task {state}."))
        }
        "toast-activation" => {
            if enable {
                extensions::enable_toast_activation(config, ToastActivationKind::Foreground);
            } else {
                extensions::disable_toast_activation(config);
            }
            Ok(format!("Toast Activation {state}."))
        }
        "print-task-settings" => {
            if enable {
                extensions::enable_print_task_settings(config, "Print Settings".to_string());
            } else {
                extensions::disable_print_task_settings(config);
            }
            Ok(format!("Print Task Settings {state}."))
        }
        other => bail!(
            "unknown feature '{other}'; expected 'share-target', 'startup-task', \
             'toast-activation', or 'print-task-settings'"
        ),
    }
}
