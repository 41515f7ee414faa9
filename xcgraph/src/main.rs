//! `xcgraph`: edit a project document from the command line.
//!
//! Each command loads the document, performs one operation, and saves unless
//! `--dry-run` is set.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use xcgraph::core::files::AddFileOutcome;
use xcgraph::core::targets::{DependencyOutcome, NewTarget};
use xcgraph::core::types::{Platform, ProductType};
use xcgraph::exit_codes;
use xcgraph::io::config::{default_config_path, load_config};
use xcgraph::io::document::init_document;
use xcgraph::logging;
use xcgraph::session::ProjectSession;

#[derive(Parser)]
#[command(
    name = "xcgraph",
    version,
    about = "Edit project-description graphs: groups, files, targets, settings"
)]
struct Cli {
    /// Project document to operate on.
    #[arg(short, long, global = true, default_value = "project.xcgraph.json")]
    project: PathBuf,

    /// Tool config (defaults to `xcgraph.toml` next to the document).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Apply the change in memory only; do not save.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new empty project document.
    Init {
        /// Overwrite an existing document.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the group tree, targets and packages.
    List,
    /// Create a group path such as `Features/Login`.
    AddGroup { path: String },
    /// Remove a group and everything below it.
    RemoveGroup { path: String },
    /// Add a file reference and join it to targets.
    AddFile {
        path: String,
        #[arg(short, long, default_value = "")]
        group: String,
        #[arg(short, long = "target")]
        targets: Vec<String>,
    },
    /// Mirror a folder on disk as groups and file references.
    AddFolder {
        path: PathBuf,
        #[arg(short, long, default_value = "")]
        group: String,
        #[arg(short, long = "target")]
        targets: Vec<String>,
        #[arg(short, long)]
        recursive: bool,
    },
    /// Add a synchronized folder joined to targets' sources.
    AddSyncFolder {
        path: String,
        #[arg(short, long, default_value = "")]
        group: String,
        #[arg(short, long = "target")]
        targets: Vec<String>,
    },
    /// Change a file reference's path.
    MoveFile { old: String, new: String },
    /// Remove a file reference and every join to it.
    RemoveFile { query: String },
    /// Create a target with Debug/Release configurations.
    AddTarget {
        name: String,
        #[arg(long, default_value = "app")]
        product_type: ProductType,
        #[arg(long)]
        bundle_id: String,
        #[arg(long, default_value = "ios")]
        platform: Platform,
    },
    /// Copy a target under a new name.
    DuplicateTarget {
        source: String,
        new_name: String,
        #[arg(long)]
        bundle_id: Option<String>,
    },
    /// Remove a target and every dependency on it.
    RemoveTarget { name: String },
    /// Make TARGET depend on DEPENDENCY.
    AddDependency { target: String, dependency: String },
    /// Drop the dependency TARGET -> DEPENDENCY.
    RemoveDependency { target: String, dependency: String },
    /// Link a system framework, optionally embedding it.
    AddFramework {
        name: String,
        #[arg(short, long)]
        target: String,
        #[arg(long)]
        embed: bool,
    },
    /// Add a Swift package (`exact:1.2.3`, `from:1.2.3`, `branch:main`, `1.2.3`).
    AddPackage {
        url: String,
        #[arg(short, long)]
        requirement: String,
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Remove a Swift package by URL.
    RemovePackage { url: String },
    /// Set a build setting on targets (or the project when none given).
    SetSetting {
        key: String,
        value: String,
        #[arg(short, long = "target")]
        targets: Vec<String>,
        #[arg(long)]
        configuration: Option<String>,
    },
    /// Print build settings per configuration.
    GetSettings {
        #[arg(short, long)]
        target: Option<String>,
        #[arg(long)]
        configuration: Option<String>,
    },
    /// Report orphans, dangling and duplicate joins, and invalid paths.
    Validate {
        /// Repair what can be repaired and save.
        #[arg(long)]
        fix: bool,
    },
    /// Remove duplicate joins.
    DedupeJoins,
    /// Snapshot-based transactions spanning several commands.
    Transaction {
        #[command(subcommand)]
        action: TransactionAction,
    },
}

#[derive(Subcommand)]
enum TransactionAction {
    /// Snapshot the document.
    Begin,
    /// Save and discard the snapshot.
    Commit,
    /// Restore the snapshot.
    Rollback,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            exit_codes::for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    if let Command::Init { force } = cli.command {
        init_document(&cli.project, force)?;
        println!("initialized {}", cli.project.display());
        return Ok(exit_codes::OK);
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&cli.project));
    let config = load_config(&config_path)?;
    let mut session = ProjectSession::open(&cli.project, config)?;
    match execute(&mut session, cli.command)? {
        Outcome::Unchanged => Ok(exit_codes::OK),
        Outcome::Changed => {
            persist(&session, cli.dry_run, &cli.project)?;
            Ok(exit_codes::OK)
        }
        Outcome::Findings => Ok(exit_codes::FINDINGS),
    }
}

/// What a command did to the in-memory graph.
enum Outcome {
    Unchanged,
    /// The graph changed and must be saved.
    Changed,
    /// `validate` found issues and `--fix` was not given.
    Findings,
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }
}

fn persist(session: &ProjectSession, dry_run: bool, project: &Path) -> Result<()> {
    if dry_run {
        println!("dry run: {} not saved", project.display());
        return Ok(());
    }
    let report = session.save()?;
    if !report.findings.is_empty() {
        eprintln!("saved with {} validation finding(s)", report.findings.len());
    }
    Ok(())
}

fn execute(session: &mut ProjectSession, command: Command) -> Result<Outcome> {
    match command {
        Command::Init { .. } => Ok(Outcome::Unchanged),
        Command::List => {
            println!("{}", session.outline());
            Ok(Outcome::Unchanged)
        }
        Command::AddGroup { path } => {
            let group = session.add_group(&path)?;
            println!("group {path} ({group})");
            Ok(Outcome::Changed)
        }
        Command::RemoveGroup { path } => {
            let removed = session.remove_group(&path)?;
            println!(
                "removed group {path}: {} group(s), {} file(s)",
                removed.groups_removed, removed.files_removed
            );
            Ok(Outcome::Changed)
        }
        Command::AddFile {
            path,
            group,
            targets,
        } => match session.add_file(&path, &group, &targets)? {
            AddFileOutcome::Added { file, joins } => {
                println!("added {path} ({file}), {} join(s)", joins.len());
                Ok(Outcome::Changed)
            }
            AddFileOutcome::Skipped { existing } => {
                println!("skipped {path}: already present as {existing}");
                Ok(Outcome::Unchanged)
            }
        },
        Command::AddFolder {
            path,
            group,
            targets,
            recursive,
        } => {
            let outcome = session.add_folder(&path, &group, &targets, recursive)?;
            println!(
                "added folder {}: {} file(s), {} skipped",
                path.display(),
                outcome.added.len(),
                outcome.skipped.len()
            );
            Ok(Outcome::Changed)
        }
        Command::AddSyncFolder {
            path,
            group,
            targets,
        } => {
            let id = session.add_synchronized_folder(&path, &group, &targets)?;
            println!("added synchronized folder {path} ({id})");
            Ok(Outcome::Changed)
        }
        Command::MoveFile { old, new } => {
            session.move_file(&old, &new)?;
            println!("moved {old} -> {new}");
            Ok(Outcome::Changed)
        }
        Command::RemoveFile { query } => {
            let removed = session.remove_file(&query)?;
            println!("removed {query}: {} join(s)", removed.joins_removed);
            Ok(Outcome::Changed)
        }
        Command::AddTarget {
            name,
            product_type,
            bundle_id,
            platform,
        } => {
            let id = session.add_target(&NewTarget {
                name: name.clone(),
                product_type,
                bundle_id,
                platform,
            })?;
            println!("added target {name} ({id})");
            Ok(Outcome::Changed)
        }
        Command::DuplicateTarget {
            source,
            new_name,
            bundle_id,
        } => {
            session.duplicate_target(&source, &new_name, bundle_id.as_deref())?;
            println!("duplicated {source} as {new_name}");
            Ok(Outcome::Changed)
        }
        Command::RemoveTarget { name } => {
            let removed = session.remove_target(&name)?;
            println!(
                "removed target {name}, {} dependency edge(s)",
                removed.edges_removed
            );
            Ok(Outcome::Changed)
        }
        Command::AddDependency { target, dependency } => {
            match session.add_dependency(&target, &dependency)? {
                DependencyOutcome::Added(_) => {
                    println!("{target} now depends on {dependency}");
                    Ok(Outcome::Changed)
                }
                DependencyOutcome::AlreadyPresent(_) => {
                    println!("{target} already depends on {dependency}");
                    Ok(Outcome::Unchanged)
                }
            }
        }
        Command::RemoveDependency { target, dependency } => {
            let removed = session.remove_dependency(&target, &dependency)?;
            if removed {
                println!("{target} no longer depends on {dependency}");
            } else {
                println!("{target} did not depend on {dependency}");
            }
            Ok(removed.into())
        }
        Command::AddFramework {
            name,
            target,
            embed,
        } => {
            session.add_framework(&name, &target, embed)?;
            let mode = if embed { "linked and embedded" } else { "linked" };
            println!("{name} {mode} in {target}");
            Ok(Outcome::Changed)
        }
        Command::AddPackage {
            url,
            requirement,
            target,
        } => {
            session.add_swift_package(&url, &requirement, target.as_deref())?;
            println!("added package {url}");
            Ok(Outcome::Changed)
        }
        Command::RemovePackage { url } => {
            let removed = session.remove_swift_package(&url)?;
            println!(
                "removed package {url}, unlinked from {} target(s)",
                removed.targets_unlinked
            );
            Ok(Outcome::Changed)
        }
        Command::SetSetting {
            key,
            value,
            targets,
            configuration,
        } => {
            let changed =
                session.set_build_setting(&key, &value, &targets, configuration.as_deref())?;
            println!("{key} = {value} in {changed} configuration(s)");
            Ok(Outcome::Changed)
        }
        Command::GetSettings {
            target,
            configuration,
        } => {
            let settings =
                session.get_build_settings(target.as_deref(), configuration.as_deref())?;
            for (name, values) in settings {
                println!("[{name}]");
                for (key, value) in values {
                    println!("{key} = {value}");
                }
            }
            Ok(Outcome::Unchanged)
        }
        Command::Validate { fix } => {
            let report = session.validate();
            for finding in &report.findings {
                println!("{finding}");
            }
            if !fix {
                if report.is_clean() {
                    println!("ok");
                    return Ok(Outcome::Unchanged);
                }
                eprintln!("{} validation finding(s)", report.len());
                return Ok(Outcome::Findings);
            }
            let summary = session.repair();
            println!("repaired {} issue(s)", summary.total());
            Ok((summary.total() > 0).into())
        }
        Command::DedupeJoins => {
            let removed = session.dedupe_joins();
            println!("removed {removed} duplicate join(s)");
            Ok((removed > 0).into())
        }
        Command::Transaction { action } => {
            match action {
                TransactionAction::Begin => {
                    session.begin_transaction()?;
                    println!("transaction started");
                }
                TransactionAction::Commit => {
                    session.commit_transaction()?;
                    println!("transaction committed");
                }
                TransactionAction::Rollback => {
                    session.rollback_transaction()?;
                    println!("transaction rolled back");
                }
            }
            Ok(Outcome::Unchanged)
        }
    }
}
