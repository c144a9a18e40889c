use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sfcc_cache::{CacheConfig, CacheDir};
use sfcc_ide::{NodeKind, PanelEntry, TreeNode};
use sfcc_workspace::{adopt_dw_config, Engine, Notifier, RefreshOutcome, Settings};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "sfcc-overrides",
    version,
    about = "SFCC cartridge override analysis (tree, per-file overrides, cache)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the cartridge tree with override counts
    Tree(TreeArgs),
    /// Show the override stack for one workspace file
    Overrides(OverridesArgs),
    /// Manage the persisted per-workspace cache
    Cache(CacheArgs),
    /// Force re-discovery, ignoring and rebuilding the cache
    Refresh(RefreshArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Workspace root
    path: PathBuf,
    /// Colon-separated cartridge path (defaults to `cartridgesPath` in dw.json)
    #[arg(long)]
    cartridge_path: Option<String>,
    /// Hide files that neither override nor are overridden
    #[arg(long)]
    overrides_only: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct OverridesArgs {
    /// Workspace root
    path: PathBuf,
    /// Workspace-relative path of the file to inspect
    file: String,
    /// Colon-separated cartridge path (defaults to `cartridgesPath` in dw.json)
    #[arg(long)]
    cartridge_path: Option<String>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CacheArgs {
    #[command(subcommand)]
    command: CacheCommand,
    /// Workspace root (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum CacheCommand {
    Clean,
    Status,
}

#[derive(Args)]
struct RefreshArgs {
    /// Workspace root
    path: PathBuf,
    /// Colon-separated cartridge path (defaults to `cartridgesPath` in dw.json)
    #[arg(long)]
    cartridge_path: Option<String>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

/// Routes engine messages to stderr; confirmations are non-interactive and
/// always accepted (the CLI user asked for the operation explicitly).
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn info(&self, message: &str) {
        eprintln!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Tree(args) => {
            let mut engine = open_engine(&args.path, args.cartridge_path, args.overrides_only)?;
            engine.refresh(true)?;
            if args.json {
                print_json(&engine.tree())?;
            } else {
                render_tree(engine.tree(), 0);
            }
            Ok(0)
        }
        Command::Overrides(args) => {
            let mut engine = open_engine(&args.path, args.cartridge_path, false)?;
            engine.refresh(true)?;
            let entries = engine
                .open_overrides(&args.file)
                .ok_or_else(|| anyhow!("`{}` is not a tracked cartridge file", args.file))?;
            if args.json {
                print_json(&entries)?;
            } else {
                render_panel(entries);
            }
            Ok(0)
        }
        Command::Cache(args) => {
            // Cache management needs no cartridge path, only the workspace.
            let cache = CacheDir::new(&args.path, CacheConfig::from_env())?;
            match args.command {
                CacheCommand::Clean => {
                    cache.scope(sfcc_workspace::FILES_SCOPE)?.flush()?;
                    cache.scope(sfcc_workspace::OVERRIDES_SCOPE)?.flush()?;
                    if args.json {
                        print_json(&serde_json::json!({ "ok": true }))?;
                    } else {
                        println!("cache: cleaned {}", cache.root().display());
                    }
                }
                CacheCommand::Status => {
                    let status = CacheStatus {
                        dir: cache.root().to_path_buf(),
                        files_entries: cache.scope(sfcc_workspace::FILES_SCOPE)?.len(),
                        overrides_entries: cache.scope(sfcc_workspace::OVERRIDES_SCOPE)?.len(),
                    };
                    if args.json {
                        print_json(&status)?;
                    } else {
                        println!("cache:");
                        println!("  dir: {}", status.dir.display());
                        println!("  files entries: {}", status.files_entries);
                        println!("  overrides entries: {}", status.overrides_entries);
                    }
                }
            }
            Ok(0)
        }
        Command::Refresh(args) => {
            let mut engine = open_engine(&args.path, args.cartridge_path, false)?;
            let outcome = engine.refresh(false)?;
            let RefreshOutcome::Refreshed { files, cartridges } = outcome else {
                return Err(anyhow!("refresh was superseded"));
            };
            if args.json {
                print_json(&RefreshReport { files, cartridges })?;
            } else {
                println!("refreshed: {files} files across {cartridges} cartridges");
            }
            Ok(0)
        }
    }
}

fn open_engine(
    root: &Path,
    cartridge_path: Option<String>,
    overrides_only: bool,
) -> Result<Engine> {
    let cartridge_path = match cartridge_path {
        Some(path) => path,
        // No flag given: take whatever dw.json declares.
        None => adopt_dw_config(root, "", &StderrNotifier).ok_or_else(|| {
            anyhow!("no cartridge path: pass --cartridge-path or declare cartridgesPath in dw.json")
        })?,
    };
    let settings = Settings {
        cartridge_path,
        overrides_only,
    };
    Ok(Engine::new(
        root,
        settings,
        Box::new(StderrNotifier),
        CacheConfig::from_env(),
    )?)
}

#[derive(Serialize)]
struct CacheStatus {
    dir: PathBuf,
    files_entries: usize,
    overrides_entries: usize,
}

#[derive(Serialize)]
struct RefreshReport {
    files: usize,
    cartridges: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_tree(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let mut line = format!("{}{}", "  ".repeat(depth), node.name);
        if matches!(node.kind, NodeKind::CartridgeRoot { missing: true }) {
            line.push_str("  (missing)");
        }
        if let Some(description) = &node.description {
            line.push_str("  ");
            line.push_str(description);
        }
        println!("{line}");
        render_tree(&node.children, depth + 1);
    }
}

fn render_panel(entries: &[PanelEntry]) {
    for entry in entries {
        println!(
            "{} ({}){}",
            entry.name,
            entry.description,
            if entry.is_selected { " *" } else { "" }
        );
        for child in &entry.children {
            let mut line = format!("  {}", child.name);
            if let Some(description) = &child.description {
                line.push_str(&format!("  {description}"));
            }
            if let Some(line_number) = child.target.line {
                line.push_str(&format!("  line {line_number}"));
            }
            println!("{line}");
        }
    }
}
