use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xcproj::config::{Config, MANIFEST_EXTENSION};
use xcproj::db::ProjectStore;
use xcproj::disk::{DiskOutcome, LiveDisk};
use xcproj::graph::{AddFileOptions, ProjectGraph};
use xcproj::report::{self, Description};
use xcproj::ProjectError;

#[derive(Parser)]
#[command(name = "xcproj", version)]
#[command(about = "Edit the groups, files and target membership of a project manifest")]
struct Cli {
    /// Path to the .xcproj manifest
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty manifest
    Init {
        /// Project name; the manifest is written to NAME.xcproj
        name: String,

        /// Targets to create
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Give the new targets a resources phase
        #[arg(long)]
        resources: bool,
    },
    /// Show project structure
    List {
        #[arg(long, value_enum, default_value_t = Format::Tree)]
        format: Format,

        /// Show target membership
        #[arg(long)]
        targets: bool,
    },
    /// Add a file to the project
    Add {
        path: PathBuf,

        /// Group path to add file to
        #[arg(short, long)]
        group: Option<String>,

        /// Target to add file to; repeat for several
        #[arg(short, long = "targets", action = ArgAction::Append)]
        targets: Vec<String>,

        /// Create parent groups if they don't exist
        #[arg(long)]
        create_groups: bool,
    },
    /// Remove a file from the project
    Remove {
        path: String,

        /// Also delete file from filesystem
        #[arg(long)]
        delete: bool,
    },
    /// Create a group
    AddGroup {
        path: String,

        /// Create physical folder on disk
        #[arg(long)]
        create_folder: bool,
    },
    /// Remove a group
    RemoveGroup {
        path: String,

        /// Also delete physical folder from disk
        #[arg(long)]
        delete_folder: bool,
    },
    /// Move a file (or, with --group, a group) to a different group
    Move {
        source: String,
        destination: String,

        /// Move a group instead of a file
        #[arg(long)]
        group: bool,
    },
    /// Show detailed information about a file or group
    Info {
        path: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Tree,
    Flat,
    Json,
}

/// Initialize tracing on stderr so stdout stays clean for tree and JSON output
fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn success(message: impl AsRef<str>) {
    println!("✓ {}", message.as_ref());
}

fn error(message: impl AsRef<str>) {
    eprintln!("✗ {}", message.as_ref());
}

fn info(message: impl AsRef<str>) {
    println!("ℹ {}", message.as_ref());
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn report_disk(outcome: &DiskOutcome) {
    match outcome {
        DiskOutcome::Untouched => {}
        DiskOutcome::Created(folders) => {
            for folder in folders {
                success(format!("Folder created on disk: {}", folder.display()));
            }
        }
        DiskOutcome::Deleted(path) => success(format!("Deleted from disk: {}", path.display())),
        DiskOutcome::Failed { path, reason } => {
            error(format!("Could not update {}: {}", path.display(), reason))
        }
    }
}

fn save(store: &mut ProjectStore, graph: &ProjectGraph) -> anyhow::Result<()> {
    store.save(graph)?;
    success("Project saved");
    Ok(())
}

fn init(path: &Path, name: &str, targets: &[String], resources: bool) -> anyhow::Result<()> {
    let mut graph = ProjectGraph::new(name);
    for target in targets {
        graph.add_target(target, resources);
    }
    ProjectStore::create(path, &graph)?;
    success(format!("Project created: {}", path.display()));
    Ok(())
}

fn list(graph: &ProjectGraph, format: Format, show_targets: bool) -> anyhow::Result<()> {
    match format {
        Format::Tree => {
            println!("Project: {}", graph.name());
            println!();
            for line in report::render_tree(graph, graph.root_id(), 0, show_targets) {
                println!("{}", line);
            }
        }
        Format::Flat => {
            for path in report::render_flat(graph) {
                println!("{}", path);
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&report::summary(graph))?),
    }
    Ok(())
}

fn print_description(description: &Description) {
    match description {
        Description::File(file) => {
            println!("File: {}", file.name);
            println!("Type: {}", file.file_type);
            println!("Path: {}", file.path);
            println!(
                "Exists on disk: {}",
                if file.exists { "✓ Yes" } else { "✗ No" }
            );
            println!();
            println!("Targets:");
            if file.targets.is_empty() {
                println!("  (none)");
            }
            for target in &file.targets {
                println!("  ✓ {}", target);
            }
        }
        Description::Group(group) => {
            println!("Group: {}", group.name);
            if let Some(path) = &group.path {
                println!("Path: {}", path);
            }
            println!("Children: {}", group.children_count);
            println!();
            println!("Contents:");
            if group.children.is_empty() {
                println!("  (empty)");
            }
            for child in &group.children {
                println!("  - {}", child);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_filter);

    let cwd = std::env::current_dir()?;
    let open = || -> anyhow::Result<(ProjectStore, ProjectGraph)> {
        let project = config.locate_project(cli.project.as_deref(), &cwd)?;
        let store = ProjectStore::open(&project)?;
        let graph = store.load()?;
        Ok((store, graph))
    };

    match &cli.command {
        Commands::Init {
            name,
            targets,
            resources,
        } => {
            let path = cli
                .project
                .clone()
                .unwrap_or_else(|| cwd.join(format!("{}.{}", name, MANIFEST_EXTENSION)));
            init(&path, name, targets, *resources)?;
        }
        Commands::List { format, targets } => {
            let (_, graph) = open()?;
            list(&graph, *format, *targets)?;
        }
        Commands::Add {
            path,
            group,
            targets,
            create_groups,
        } => {
            if !path.exists() {
                anyhow::bail!("File does not exist: {}", path.display());
            }
            let (mut store, mut graph) = open()?;
            info(format!("Adding file: {}", path.display()));
            info(format!("  Group: {}", group.as_deref().unwrap_or("(root)")));
            if !targets.is_empty() {
                info(format!("  Targets: {}", targets.join(", ")));
            }

            let options = AddFileOptions {
                group: group.clone(),
                targets: targets.clone(),
                create_groups: *create_groups,
            };
            let added = graph.add_file(path, &options);
            if matches!(added, Err(ProjectError::GroupNotFound(_))) {
                info("Use --create-groups to automatically create missing groups");
            }
            let file = added?;
            save(&mut store, &graph)?;
            success(format!("File added: {}", graph.path_of(file)));
        }
        Commands::Remove { path, delete } => {
            info(format!("Removing file: {}", path));
            info(format!("  Delete from disk: {}", yes_no(*delete)));

            let (mut store, mut graph) = open()?;
            let edit = graph.remove_file(path, *delete, &LiveDisk)?;
            save(&mut store, &graph)?;
            success(format!("File removed: {}", path));
            report_disk(&edit.disk);
        }
        Commands::AddGroup {
            path,
            create_folder,
        } => {
            info(format!("Creating group: {}", path));
            info(format!("  Create folder: {}", yes_no(*create_folder)));

            let (mut store, mut graph) = open()?;
            let edit = graph.add_group(path, *create_folder, &LiveDisk);
            save(&mut store, &graph)?;
            success(format!("Group created: {}", path));
            report_disk(&edit.disk);
        }
        Commands::RemoveGroup {
            path,
            delete_folder,
        } => {
            info(format!("Removing group: {}", path));
            info(format!("  Delete folder: {}", yes_no(*delete_folder)));

            let (mut store, mut graph) = open()?;
            let edit = graph.remove_group(path, *delete_folder, &LiveDisk)?;
            save(&mut store, &graph)?;
            success(format!("Group removed: {}", path));
            report_disk(&edit.disk);
        }
        Commands::Move {
            source,
            destination,
            group,
        } => {
            let kind = if *group { "group" } else { "file" };
            info(format!("Moving {}: {}", kind, source));
            info(format!("  To group: {}", destination));

            let (mut store, mut graph) = open()?;
            if *group {
                graph.move_group(source, destination)?;
            } else {
                graph.move_file(source, destination)?;
            }
            save(&mut store, &graph)?;
            success(format!("Moved {} → {}", source, destination));
        }
        Commands::Info { path, json } => {
            let (_, graph) = open()?;
            let description = report::describe(&graph, path, &LiveDisk)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&description)?);
            } else {
                print_description(&description);
            }
        }
    }

    Ok(())
}
