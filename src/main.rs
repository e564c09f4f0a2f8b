use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notegraph::config::Config;
use notegraph::corpus::Corpus;
use notegraph::db::{create_note, list_notes, Db};
use notegraph::graph::{Analysis, Analyzer, EntityType, GraphFilter, RelationType, SourceDocument};
use notegraph::watch::{run_poller, write_graph};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "notegraph")]
#[command(version, about = "Build a knowledge graph from stored notes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze every note once and emit graph JSON
    Analyze {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only entities seen in this document (e.g. doc-3)
        #[arg(long)]
        document: Option<String>,
        /// Only entities of this type
        #[arg(long)]
        entity_type: Option<EntityType>,
        /// Case-insensitive name substring
        #[arg(long)]
        search: Option<String>,
    },
    /// Print entity and relation counts per type
    Stats,
    /// Poll the note store and keep the graph file current
    Watch {
        /// Overrides watch.output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store a file as a note
    Import {
        file: PathBuf,
        /// Defaults to the file name without extension
        #[arg(short, long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.notegraph.log_level),
    )
    .init();

    log::debug!("Database path: {}", config.db_path().display());
    let db = Db::open_migrated(config.db_path()).await?;

    match cli.command {
        Command::Analyze {
            output,
            document,
            entity_type,
            search,
        } => {
            let filter = GraphFilter {
                document_id: document,
                entity_type,
                search,
            };
            run_analyze(&db, &config, &filter, output.as_deref()).await?;
        }
        Command::Stats => run_stats(&db, &config).await?,
        Command::Watch { output } => {
            let output = output.unwrap_or_else(|| config.watch.output.clone());
            let corpus = build_corpus(&config)?;
            log::info!(
                "Watching notes every {} ms, writing {} (Ctrl+C to stop)",
                config.watch.poll_interval_ms,
                output.display()
            );
            run_poller(
                db,
                corpus,
                GraphFilter::default(),
                &output,
                Duration::from_millis(config.watch.poll_interval_ms),
            )
            .await?;
        }
        Command::Import { file, title } => run_import(&db, &file, title).await?,
    }

    Ok(())
}

fn build_corpus(config: &Config) -> Result<Corpus> {
    let analyzer = Analyzer::from_config(&config.analysis)?;
    Ok(Corpus::new(analyzer, config.analysis.min_content_chars))
}

async fn load_corpus(db: &Db, config: &Config) -> Result<Corpus> {
    let mut corpus = build_corpus(config)?;
    let notes = list_notes(db).await?;
    let documents: Vec<SourceDocument> = notes.iter().map(SourceDocument::from).collect();
    corpus.refresh(&documents);
    Ok(corpus)
}

async fn run_analyze(db: &Db, config: &Config, filter: &GraphFilter, output: Option<&Path>) -> Result<()> {
    let corpus = load_corpus(db, config).await?;
    let graph = corpus.graph(filter);

    match output {
        Some(path) => {
            write_graph(path, &graph)?;
            log::info!(
                "Wrote {} nodes and {} links to {}",
                graph.nodes.len(),
                graph.links.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&graph)?),
    }
    Ok(())
}

fn entity_counts(analysis: &Analysis) -> Vec<(EntityType, usize)> {
    EntityType::ALL
        .iter()
        .map(|&t| (t, analysis.entities.iter().filter(|e| e.entity_type == t).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

fn relation_counts(analysis: &Analysis) -> Vec<(RelationType, usize)> {
    RelationType::ALL
        .iter()
        .map(|&t| (t, analysis.relations.iter().filter(|r| r.relation_type == t).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

async fn run_stats(db: &Db, config: &Config) -> Result<()> {
    let corpus = load_corpus(db, config).await?;
    let analysis = corpus.analysis();

    println!("\n=== Notegraph Statistics ===\n");
    println!("Documents analyzed: {}", corpus.document_count());

    if analysis.is_empty() {
        println!("\nNo entities found. Add notes with `notegraph import`.");
        return Ok(());
    }

    println!("\n{:<20} {:>8}", "Entity type", "Count");
    println!("{:-<29}", "");
    for (entity_type, count) in entity_counts(analysis) {
        println!("{:<20} {:>8}", entity_type, count);
    }
    println!("{:<20} {:>8}", "Total", analysis.entities.len());

    println!("\n{:<20} {:>8}", "Relation type", "Count");
    println!("{:-<29}", "");
    for (relation_type, count) in relation_counts(analysis) {
        println!("{:<20} {:>8}", relation_type, count);
    }
    println!("{:<20} {:>8}", "Total", analysis.relations.len());
    println!();
    Ok(())
}

async fn run_import(db: &Db, file: &Path, title: Option<String>) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let title = match title {
        Some(t) => t,
        None => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string()),
    };

    let note = create_note(db, &title, &content).await?;
    log::info!("Imported {} as note {} ({})", file.display(), note.id, note.document_id());
    Ok(())
}
