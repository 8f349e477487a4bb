//! Gachette CLI
//!
//! Entry point for the `gachette` command-line tool.

use clap::{Parser, Subcommand};
use gachette::config::SettingsError;
use gachette::{
    BuildSummary, EffectiveSettings, LocalRunner, Runner, Settings, SshRunner, Stack,
    VersionKind, WorkingCopy,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "gachette")]
#[command(about = "Build versioned artifacts and register them into deployment stacks", version)]
struct Cli {
    /// Path to the host config file (default: ~/.config/gachette/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Override a settings key, e.g. --set host.port=2222
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare, synchronize and build a project
    Build {
        /// Project name (determines the checkout path)
        project: String,

        /// Repository URL
        #[arg(long)]
        url: String,

        /// Branch the checkout is hard-reset to
        #[arg(long, default_value = "master")]
        branch: String,

        /// Artifact output directory (default from settings)
        #[arg(long)]
        output: Option<PathBuf>,

        /// App version passed to the packaging tool
        #[arg(long)]
        app_version: Option<String>,

        /// Env version passed to the packaging tool
        #[arg(long)]
        env_version: Option<String>,

        /// Service version passed to the packaging tool
        #[arg(long)]
        service_version: Option<String>,

        /// Webcallback URL passed to the packaging tool
        #[arg(long)]
        webcallback: Option<String>,

        /// Write the build summary JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Register a package version into a stack
    AddPackage {
        /// Stack version label
        stack_version: String,

        /// Package name
        #[arg(long)]
        name: String,

        /// Package version
        #[arg(long)]
        version: String,

        /// Artifact file name
        #[arg(long)]
        file: String,

        /// Registry root (default from settings)
        #[arg(long)]
        meta_path: Option<PathBuf>,
    },

    /// Print the effective settings with provenance
    ShowConfig,
}

fn main() {
    let cli = Cli::parse();

    let effective = match load_settings(cli.config, &cli.overrides) {
        Ok(effective) => effective,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Build {
            project,
            url,
            branch,
            output,
            app_version,
            env_version,
            service_version,
            webcallback,
            summary,
            json,
        } => {
            let versions = [
                (VersionKind::App, app_version),
                (VersionKind::Env, env_version),
                (VersionKind::Service, service_version),
            ];
            run_build(
                &effective.settings,
                &project,
                &url,
                &branch,
                output,
                versions,
                webcallback,
                summary,
                json,
            );
        }
        Commands::AddPackage {
            stack_version,
            name,
            version,
            file,
            meta_path,
        } => {
            run_add_package(
                &effective.settings,
                &stack_version,
                &name,
                &version,
                &file,
                meta_path,
            );
        }
        Commands::ShowConfig => match effective.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing settings: {}", e);
                process::exit(1);
            }
        },
    }
}

fn load_settings(
    path: Option<PathBuf>,
    overrides: &[String],
) -> Result<EffectiveSettings, SettingsError> {
    let path = path.or_else(EffectiveSettings::default_path);
    EffectiveSettings::build(path.as_deref(), overrides)
}

fn make_runner(settings: &Settings) -> Box<dyn Runner> {
    match &settings.host {
        Some(options) => Box::new(SshRunner::new(options.clone())),
        None => Box::new(LocalRunner::new()),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_build(
    settings: &Settings,
    project: &str,
    url: &str,
    branch: &str,
    output: Option<PathBuf>,
    versions: [(VersionKind, Option<String>); 3],
    webcallback: Option<String>,
    summary_path: Option<PathBuf>,
    json: bool,
) {
    let runner = make_runner(settings);
    let output_dir = output.unwrap_or_else(|| settings.output_dir.clone());

    let mut wc = WorkingCopy::new(runner.as_ref(), project, &settings.working_root)
        .with_base_version(&settings.base_version)
        .with_clone_depth(settings.clone_depth)
        .with_tool(&settings.tool)
        .with_arch(&settings.arch);

    for (kind, version) in versions {
        if let Some(version) = version {
            wc.set_version(kind, &version);
        }
    }

    if let Err(e) = wc.prepare_environment() {
        eprintln!("Error preparing environment: {}", e);
        process::exit(1);
    }

    let commit = match wc.force_sync(url, branch) {
        Ok(commit) => commit,
        Err(e) => {
            eprintln!("Error synchronizing checkout: {}", e);
            process::exit(1);
        }
    };

    let derived_version = match wc.version_from_git(None) {
        Ok(version) => version,
        Err(e) => {
            eprintln!("Error deriving version: {}", e);
            process::exit(1);
        }
    };

    let ok = match wc.build(&output_dir, webcallback.as_deref()) {
        Ok(output) => output.ok,
        Err(e) => {
            eprintln!("Error building: {}", e);
            false
        }
    };

    let summary = BuildSummary::new(
        project,
        &commit,
        &derived_version,
        &output_dir.to_string_lossy(),
        ok,
    );

    if let Some(path) = summary_path {
        if let Err(e) = summary.write_to_file(&path) {
            eprintln!("Error writing summary: {}", e);
            process::exit(1);
        }
    }

    if json {
        match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("built {} from {} ({})", project, commit, derived_version);
    }

    if !ok {
        process::exit(1);
    }
}

fn run_add_package(
    settings: &Settings,
    stack_version: &str,
    name: &str,
    version: &str,
    file: &str,
    meta_path: Option<PathBuf>,
) {
    let runner = make_runner(settings);
    let meta_path = meta_path.unwrap_or_else(|| settings.meta_root.clone());

    let stack = Stack::new(runner.as_ref(), stack_version, &meta_path);
    if let Err(e) = stack.add_package(name, version, file) {
        eprintln!("Error registering package: {}", e);
        process::exit(1);
    }

    println!("registered {} {} into stack {}", name, version, stack_version);
}
