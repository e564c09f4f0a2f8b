//! Poll the note store and keep a graph JSON file up to date.
//!
//! Every tick lists the notes, refreshes the memoized corpus, and rewrites the
//! output only when a note was analyzed or dropped.

use std::path::Path;
use std::time::Duration;

use crate::corpus::Corpus;
use crate::db::{list_notes, Db};
use crate::error::Result;
use crate::graph::{GraphData, GraphFilter, SourceDocument};

/// Serialize `graph` to `path`, replacing any previous file in one rename.
pub fn write_graph(path: &Path, graph: &GraphData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(graph)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// One poll step. Returns whether the output was written.
pub async fn sync_once(
    db: &Db,
    corpus: &mut Corpus,
    filter: &GraphFilter,
    output: &Path,
    force: bool,
) -> Result<bool> {
    let notes = list_notes(db).await?;
    let documents: Vec<SourceDocument> = notes.iter().map(SourceDocument::from).collect();
    let stats = corpus.refresh(&documents);

    if !force && !stats.changed() {
        log::debug!("watch: no changes in {} notes", notes.len());
        return Ok(false);
    }

    let graph = corpus.graph(filter);
    write_graph(output, &graph)?;
    log::info!(
        "watch: wrote {} ({} nodes, {} links)",
        output.display(),
        graph.nodes.len(),
        graph.links.len()
    );
    Ok(true)
}

/// Poll until Ctrl-C. A failing tick is logged and retried on the next one.
pub async fn run_poller(
    db: Db,
    mut corpus: Corpus,
    filter: GraphFilter,
    output: &Path,
    interval: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut first = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sync_once(&db, &mut corpus, &filter, output, first).await {
                    Ok(_) => first = false,
                    Err(e) => log::error!("watch: refresh failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("watch: interrupted, stopping");
                break;
            }
        }
    }
    Ok(())
}
