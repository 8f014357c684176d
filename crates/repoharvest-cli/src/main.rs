mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "repoharvest",
    version,
    about = "Mirror, scan, and reconcile configuration repositories",
    long_about = "Repoharvest keeps local mirrors of remote git repositories, detects which\n\
        tracked files changed since the last scan (using per-branch watermark tags),\n\
        and reconciles file trees against an object store and repository rosters\n\
        against a local record catalog.\n\n\
        Quick start:\n  \
        repoharvest pull https://github.com/acme/widgets\n  \
        repoharvest scan https://github.com/acme/widgets --sync-store\n  \
        repoharvest sync-roster acme --team platform"
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: ~/.repoharvest/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override the mirror parent directory from the config
    #[arg(long, global = true)]
    mirror_root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone or fast-forward a repository mirror
    ///
    /// Acquires the repository lock, reads the remote's last-push time,
    /// fetches every tracked branch that exists upstream, and records the
    /// push time beside the mirror for later scans.
    ///
    /// Example: repoharvest pull https://github.com/acme/widgets
    Pull {
        /// Repository URL (scheme://host/org/name)
        repo_url: String,

        /// Comma-separated branch names to track
        #[arg(long, default_value = "main,develop", value_delimiter = ',')]
        branches: Vec<String>,
    },
    /// Scan changed files on the tracked branches
    ///
    /// Diffs each branch against its watermark tag, dispatches changed files
    /// to the registered scanners, and advances the watermark once the
    /// branch's scanners complete.
    ///
    /// Examples:
    ///   repoharvest scan https://github.com/acme/widgets
    ///   repoharvest scan https://github.com/acme/widgets --pull --sync-store
    ///   repoharvest scan https://github.com/acme/widgets --branch feature/x --full-scan
    Scan {
        /// Repository URL (scheme://host/org/name)
        repo_url: String,

        /// Comma-separated branch names to track
        #[arg(long, default_value = "main,develop", value_delimiter = ',')]
        branches: Vec<String>,

        /// Scan this branch with the development scanner set instead of the
        /// configured development branch
        #[arg(long)]
        branch: Option<String>,

        /// Ignore the watermark and scan every file
        #[arg(long)]
        full_scan: bool,

        /// Update the mirror first, under the same lock
        #[arg(long)]
        pull: bool,

        /// Mirror scanned files into the object store
        #[arg(long)]
        sync_store: bool,
    },
    /// Remove a repository mirror from disk
    ///
    /// Example: repoharvest delete https://github.com/acme/widgets
    Delete {
        /// Repository URL (scheme://host/org/name)
        repo_url: String,
    },
    /// Reconcile a local directory tree into the object store
    ///
    /// Uploads added and changed files under the prefix, deletes store
    /// objects with no local counterpart, and never touches excluded
    /// top-level names.
    ///
    /// Examples:
    ///   repoharvest sync-tree ./exports --prefix acme/widgets
    ///   repoharvest sync-tree ./exports --prefix shared --exclude siblings
    SyncTree {
        /// Local directory to mirror into the store
        local_root: String,

        /// Logical key prefix in the store (empty: top level only)
        #[arg(long, default_value = "")]
        prefix: String,

        /// Subdirectory of the local root to sync instead of the whole tree
        #[arg(long)]
        offset: Option<String>,

        /// Top-level name never deleted from the store (repeatable)
        #[arg(long = "exclude")]
        excludes: Vec<String>,
    },
    /// Reconcile an organization's repository roster into the catalog
    ///
    /// Examples:
    ///   repoharvest sync-roster acme
    ///   repoharvest sync-roster acme --team platform
    SyncRoster {
        /// Organization name at the remote host
        org: String,

        /// Restrict to repositories visible to this team
        #[arg(long)]
        team: Option<String>,

        /// Remote host to query
        #[arg(long, default_value = "github.com")]
        host: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("REPOHARVEST_LOG").unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_file = cli.config.as_deref().map(std::path::Path::new);
    let mirror_root = cli.mirror_root.as_deref();

    match cli.command {
        Commands::Pull { repo_url, branches } => {
            commands::pull::run(&repo_url, &branches, mirror_root, config_file)?;
        }
        Commands::Scan {
            repo_url,
            branches,
            branch,
            full_scan,
            pull,
            sync_store,
        } => {
            commands::scan::run(
                &repo_url,
                &branches,
                branch.as_deref(),
                full_scan,
                pull,
                sync_store,
                mirror_root,
                config_file,
            )?;
        }
        Commands::Delete { repo_url } => {
            commands::delete::run(&repo_url, mirror_root, config_file)?;
        }
        Commands::SyncTree {
            local_root,
            prefix,
            offset,
            excludes,
        } => {
            commands::sync_tree::run(
                std::path::Path::new(&local_root),
                &prefix,
                offset.as_deref(),
                &excludes,
                config_file,
            )?;
        }
        Commands::SyncRoster { org, team, host } => {
            commands::sync_roster::run(&org, team.as_deref(), &host, config_file)?;
        }
    }

    Ok(())
}
