// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use appfetch::storage::{self, Storage};
use appfetch::types::{InstalledArtifact, TransferTarget};
use appfetch::update::UpdateStatus;
use appfetch::{known_app_names, resolve_app, transfer, update, FetchError};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "appfetch")]
#[command(version = VERSION)]
#[command(about = "Install and update AppImages straight from GitHub and GitLab releases.")]
#[command(long_about = "appfetch - AppImage installer and updater\n\n\
    Install an app:      appfetch install tutanota\n\
    Add by URL:          appfetch add-repo https://github.com/owner/repo\n\
    Check for updates:   appfetch update --check\n\
    Upgrade everything:  appfetch update\n\
    List installed:      appfetch list\n\n\
    Interrupted downloads resume from where they stopped.")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose mode: detailed output for debugging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install apps into the main folder (interactive picker when no names given)
    ///
    /// Examples:
    ///   appfetch install tutanota librewolf
    ///   appfetch install
    Install {
        /// App names or GitHub project URLs
        apps: Vec<String>,
    },

    /// Download apps without installing them
    ///
    /// Examples:
    ///   appfetch download keepassxc
    ///   appfetch download keepassxc --path ~/Downloads
    Download {
        /// App names or GitHub project URLs
        apps: Vec<String>,
        /// Directory to download into (defaults to the current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Check for updates and upgrade installed apps
    ///
    /// Examples:
    ///   appfetch update
    ///   appfetch update tutanota
    ///   appfetch update --check
    ///   appfetch update --file ~/Downloads/app-1-2.AppImage
    Update {
        /// App names to update (defaults to everything installed)
        apps: Vec<String>,
        /// A specific AppImage file to update in place
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Only report; don't download anything
        #[arg(long)]
        check: bool,
    },

    /// List installed apps
    #[command(alias = "ls")]
    List,

    /// List all installable app names
    Available,

    /// Remove installed apps (interactive picker when no names given)
    Remove {
        /// App names to remove
        apps: Vec<String>,
    },

    /// Register a GitHub project URL as an installable app
    AddRepo {
        /// GitHub project URL, e.g. https://github.com/owner/repo
        url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .init();

    // A part file is always a valid prefix of the artifact, so aborting
    // between chunks never corrupts anything
    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted, exiting.");
        std::process::exit(130);
    })
    .context("failed to install Ctrl-C handler")?;

    let store = Storage::new()?;

    match cli.command {
        Commands::Install { apps } => cmd_install(&store, apps),
        Commands::Download { apps, path } => cmd_download(&store, apps, path),
        Commands::Update { apps, file, check } => cmd_update(&store, apps, file, check),
        Commands::List => cmd_list(&store),
        Commands::Available => cmd_available(&store),
        Commands::Remove { apps } => cmd_remove(&store, apps),
        Commands::AddRepo { url } => cmd_add_repo(&store, url),
    }
}

fn cmd_install(store: &Storage, apps: Vec<String>) -> Result<()> {
    let apps = if apps.is_empty() {
        pick_apps("Select for download:", known_app_names(store)?)?
    } else {
        apps
    };

    let mut failures = 0;
    for app in &apps {
        match install_one(store, app) {
            Ok(name) => println!("{} {} installed.", "✓".green(), name),
            Err(err) => {
                failures += 1;
                eprintln!("{} {}", "✗".red(), err);
            }
        }
    }
    finish(failures)
}

fn install_one(store: &Storage, app: &str) -> Result<String, FetchError> {
    let release = resolve_app(app, store)?;
    let dest = store.app_dir(&release.canonical_name)?;
    let target = TransferTarget::new(&release, dest);
    transfer::download(&target)?;
    make_executable(&target.final_path());
    Ok(release.canonical_name)
}

fn cmd_download(store: &Storage, apps: Vec<String>, path: Option<PathBuf>) -> Result<()> {
    let dest = match path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let apps = if apps.is_empty() {
        pick_apps("Select for download:", known_app_names(store)?)?
    } else {
        apps
    };

    let mut failures = 0;
    for app in &apps {
        let result = resolve_app(app, store).and_then(|release| {
            let target = TransferTarget::new(&release, dest.clone());
            transfer::download(&target).map(|_| release.canonical_name)
        });
        match result {
            Ok(name) => println!("{} {} downloaded.", "✓".green(), name),
            Err(err) => {
                failures += 1;
                eprintln!("{} {}", "✗".red(), err);
            }
        }
    }
    finish(failures)
}

fn cmd_update(
    store: &Storage,
    apps: Vec<String>,
    file: Option<PathBuf>,
    check: bool,
) -> Result<()> {
    let known = known_app_names(store)?;

    if let Some(file) = file {
        if !file.is_file() {
            bail!("{} is not a file", file.display());
        }
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let artifact = InstalledArtifact::new(file_name, &file);
        return finish(update_one(store, &known, &artifact, check));
    }

    let installed = store.installed_apps(&known)?;
    if installed.is_empty() {
        println!("Currently you don't have an installed app to update.");
        return Ok(());
    }

    let targets: Vec<String> = if apps.is_empty() {
        installed.keys().cloned().collect()
    } else {
        apps
    };

    let mut failures = 0;
    for app in &targets {
        match installed.get(app) {
            Some(artifact) => failures += update_one(store, &known, artifact, check),
            None => {
                failures += 1;
                eprintln!("{} {} is not installed.", "✗".red(), app);
            }
        }
    }
    finish(failures)
}

/// Checks (and unless `check`, applies) one update. Returns 1 on failure so
/// callers can keep going over the remaining apps.
fn update_one(store: &Storage, known: &[String], artifact: &InstalledArtifact, check: bool) -> i32 {
    match update::has_update(&artifact.file_path, known, store) {
        Ok(UpdateStatus::UpToDate) => {
            println!("{} {} is up to date.", "✓".green(), artifact.file_name);
            0
        }
        Ok(UpdateStatus::Available(release)) => {
            println!(
                "{} {} -> {}",
                "↑".yellow(),
                artifact.file_name,
                release.canonical_name
            );
            if check {
                return 0;
            }
            match update::apply_update(&release, artifact) {
                Ok(()) => {
                    make_executable(
                        &artifact
                            .dir()
                            .map(|d| d.join(&release.canonical_name))
                            .unwrap_or_default(),
                    );
                    println!("{} {} upgraded.", "✓".green(), release.canonical_name);
                    0
                }
                Err(err) => {
                    eprintln!("{} {}", "✗".red(), err);
                    1
                }
            }
        }
        Err(err) => {
            eprintln!("{} {}", "✗".red(), err);
            1
        }
    }
}

fn cmd_list(store: &Storage) -> Result<()> {
    let known = known_app_names(store)?;
    let installed = store.installed_apps(&known)?;
    if installed.is_empty() {
        println!("No apps installed yet.");
        return Ok(());
    }
    println!("{}", "MY APPS:".bold());
    for (i, (app, artifact)) in installed.iter().enumerate() {
        println!("{}) {} ({})", i + 1, app, artifact.file_name);
    }
    Ok(())
}

fn cmd_available(store: &Storage) -> Result<()> {
    println!("{}", "AVAILABLE APPIMAGES:".bold());
    for (i, app) in known_app_names(store)?.iter().enumerate() {
        println!("{}) {}", i + 1, app);
    }
    Ok(())
}

fn cmd_remove(store: &Storage, apps: Vec<String>) -> Result<()> {
    let known = known_app_names(store)?;
    let installed = store.installed_apps(&known)?;
    if installed.is_empty() {
        println!("Currently you don't have any installed app.");
        return Ok(());
    }

    let apps = if apps.is_empty() {
        pick_apps("Select for REMOVE:", installed.keys().cloned().collect())?
    } else {
        apps
    };

    let mut failures = 0;
    for app in &apps {
        match installed.get(app) {
            Some(artifact) => match store.remove_app(artifact) {
                Ok(()) => println!("{} {} has been removed.", "✓".green(), app),
                Err(err) => {
                    failures += 1;
                    eprintln!("{} {}", "✗".red(), err);
                }
            },
            None => {
                failures += 1;
                eprintln!("{} {} is not installed.", "✗".red(), app);
            }
        }
    }
    finish(failures)
}

fn cmd_add_repo(store: &Storage, url: String) -> Result<()> {
    if !appfetch::resolve::is_github_url(&url) {
        bail!("url {} is not a valid GitHub project url", url);
    }
    // Resolution by URL persists the project into the registry
    let release = resolve_app(&url, store)?;
    let name = storage::display_name(&release.download_url, &release.canonical_name);
    println!("{} {} added (current release: {}).", "✓".green(), name, release.canonical_name);
    Ok(())
}

fn pick_apps(prompt: &str, options: Vec<String>) -> Result<Vec<String>> {
    if options.is_empty() {
        bail!("nothing to select from");
    }
    inquire::MultiSelect::new(prompt, options)
        .prompt()
        .context("selection aborted")
}

/// AppImages must be executable to be launchable.
fn make_executable(path: &std::path::Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            let mut perms = meta.permissions();
            perms.set_mode(perms.mode() | 0o755);
            let _ = std::fs::set_permissions(path, perms);
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

fn finish(failures: i32) -> Result<()> {
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
