use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diagram_core::{Graph, normalize_edges, normalize_nodes};
use diagram_layout::LayoutEngine;
use diagram_storage::{DiagramStore, SqliteStore};
use diagram_sync::{
    EXPORT_FILE_NAME, NullView, SyncController, SyncSettings, export_saved, load_saved_graph,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit and lay out flow diagrams", long_about = None)]
struct Args {
    /// Path to the SQLite database holding the diagram
    #[arg(long, global = true, default_value = "diagram.db")]
    db: PathBuf,

    /// Path to a JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the saved diagram with a JSON document
    Import { file: PathBuf },
    /// Write the saved diagram as pretty JSON
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Lay out a JSON document and print it, without touching the database
    Layout {
        file: PathBuf,
        /// Container width driving node size and direction
        #[arg(short, long)]
        width: Option<f64>,
    },
    /// Summarize the saved diagram
    Show,
    /// Delete the saved diagram
    Clear,
    /// Replace the saved diagram with the bundled sample
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => SyncSettings::load(path),
        None => SyncSettings::default(),
    };
    tracing::debug!("Using database {}", args.db.display());

    match args.command {
        Command::Layout { file, width } => layout_file(&file, width, &settings),
        Command::Show => show(&args.db, &settings),
        Command::Export { output } => export(&args.db, &settings, output),
        command => {
            let mut controller = open_controller(&args.db, settings)?;
            run(&mut controller, command)
        }
    }
}

fn open_store(db: &Path, settings: &SyncSettings) -> Result<DiagramStore> {
    let backend = SqliteStore::open(db)
        .with_context(|| format!("Failed to open database {}", db.display()))?;
    Ok(DiagramStore::with_key(backend, settings.storage_key.clone()))
}

fn open_controller(db: &Path, settings: SyncSettings) -> Result<SyncController> {
    let store = open_store(db, &settings)?;
    Ok(SyncController::new(store, NullView, settings))
}

fn run(controller: &mut SyncController, command: Command) -> Result<()> {
    match command {
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            controller.import_json(&text)?;
            println!(
                "Imported {} nodes and {} edges from {}",
                controller.graph().node_count(),
                controller.graph().edge_count(),
                file.display()
            );
        }
        Command::Clear => {
            controller.clear_graph();
            println!("Cleared saved diagram under {}", controller.store().key());
        }
        Command::Reset => {
            controller.reset_to_sample()?;
            println!(
                "Loaded sample ({} nodes, {} edges)",
                controller.graph().node_count(),
                controller.graph().edge_count()
            );
        }
        Command::Layout { .. } | Command::Show | Command::Export { .. } => {}
    }
    Ok(())
}

fn layout_file(file: &Path, width: Option<f64>, settings: &SyncSettings) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text).context("Invalid JSON file")?;

    let nodes = normalize_nodes(&raw["nodes"]);
    let edges = normalize_edges(&raw["edges"]);
    let options = settings.layout_options(width.unwrap_or(settings.default_container_width));
    let nodes = LayoutEngine::new().apply_layout(nodes, &edges, &options);

    let graph = Graph::from_parts(nodes, edges);
    println!("{}", serde_json::to_string_pretty(&graph.to_document())?);
    Ok(())
}

fn export(db: &Path, settings: &SyncSettings, output: Option<PathBuf>) -> Result<()> {
    let store = open_store(db, settings)?;
    let Some(json) = export_saved(&store)? else {
        anyhow::bail!("No saved diagram under {}", store.key());
    };
    let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported diagram to {}", path.display());
    Ok(())
}

fn show(db: &Path, settings: &SyncSettings) -> Result<()> {
    let store = open_store(db, settings)?;
    let Some(graph) = load_saved_graph(&store) else {
        println!("No saved diagram under {}", store.key());
        return Ok(());
    };

    println!(
        "{} nodes, {} edges ({} dangling)",
        graph.node_count(),
        graph.edge_count(),
        graph.dangling_edges().len()
    );
    for node in graph.nodes() {
        println!(
            "  {:<24} {:<24} at {}",
            node.id, node.data.label, node.position
        );
    }
    for edge in graph.edges() {
        let label = edge.label.as_deref().unwrap_or("");
        println!("  {} -> {} {}", edge.source, edge.target, label);
    }
    Ok(())
}
