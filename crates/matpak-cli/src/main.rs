//! matpak CLI - package manager for MATLAB packages.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod install;
mod list;
mod setup;
mod uninstall;

#[derive(Parser)]
#[command(name = "matpak")]
#[command(version)]
#[command(about = "Package manager for MATLAB packages", long_about = None)]
struct Cli {
    /// Matpak root directory (defaults to $MATPAK_HOME or ~/.matpak)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a package and its dependencies
    Install {
        /// Package name to install
        package: String,

        /// Resolve and print the installation plan without installing
        #[arg(long)]
        dry_run: bool,

        /// Registry base URL (overrides $MATPAK_REGISTRY)
        #[arg(long)]
        registry: Option<String>,
    },

    /// Uninstall an installed package
    Uninstall {
        /// Package name to uninstall
        package: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List installed packages
    List,

    /// Write the MATLAB integration files and print path instructions
    Setup,

    /// Print the detected host platform tag
    Platform,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let root = cli.root.unwrap_or_else(matpak_core::default_root);

    match cli.command {
        Commands::Install {
            package,
            dry_run,
            registry,
        } => {
            let options = install::InstallOptions {
                package,
                dry_run,
                registry,
                root,
            };
            install::install_package(&options)?;
        }

        Commands::Uninstall { package, yes } => {
            let options = uninstall::UninstallOptions { package, yes, root };
            uninstall::uninstall_package(&options)?;
        }

        Commands::List => {
            list::list_packages(&root)?;
        }

        Commands::Setup => {
            setup::setup_matlab(&root)?;
        }

        Commands::Platform => {
            println!("{}", matpak_core::detect_platform_tag());
        }
    }

    Ok(())
}
