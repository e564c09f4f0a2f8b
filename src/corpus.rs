//! Memoized corpus analysis.
//!
//! Each document's isolated analysis is cached under its id together with a
//! SHA-256 of its content. A refresh re-analyzes only documents whose content
//! changed, drops documents that disappeared, then rebuilds the merged view
//! from the cached per-document results. Rebuilding from empty keeps entity
//! frequencies identical no matter how many times a corpus is refreshed.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::graph::{Analysis, Analyzer, GraphData, GraphFilter, SourceDocument};

struct CachedAnalysis {
    content_hash: String,
    analysis: Analysis,
}

/// Counts from one [`Corpus::refresh`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshStats {
    /// New or modified documents that went through extraction.
    pub analyzed: usize,
    /// Unchanged documents served from the cache.
    pub reused: usize,
    /// Cached documents that vanished or became too short.
    pub dropped: usize,
    /// Documents at or under the content threshold, or repeating an earlier id.
    pub skipped: usize,
}

impl RefreshStats {
    pub fn changed(&self) -> bool {
        self.analyzed > 0 || self.dropped > 0
    }
}

pub fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

pub struct Corpus {
    analyzer: Analyzer,
    min_content_chars: usize,
    cache: HashMap<String, CachedAnalysis>,
    merged: Analysis,
}

impl Corpus {
    pub fn new(analyzer: Analyzer, min_content_chars: usize) -> Self {
        Self {
            analyzer,
            min_content_chars,
            cache: HashMap::new(),
            merged: Analysis::default(),
        }
    }

    /// Bring the merged view in line with `documents`, merged in the given order.
    pub fn refresh(&mut self, documents: &[SourceDocument]) -> RefreshStats {
        let mut stats = RefreshStats::default();

        // the first document listed under an id stands for it
        let mut ids = HashSet::new();
        let eligible: Vec<&SourceDocument> = documents
            .iter()
            .filter(|doc| ids.insert(doc.id.as_str()))
            .filter(|doc| doc.content.chars().count() > self.min_content_chars)
            .collect();
        stats.skipped = documents.len() - eligible.len();

        let live: HashSet<&str> = eligible.iter().map(|doc| doc.id.as_str()).collect();
        let before = self.cache.len();
        self.cache.retain(|id, _| live.contains(id.as_str()));
        stats.dropped = before - self.cache.len();

        for doc in &eligible {
            let hash = content_hash(&doc.content);
            if self.cache.get(&doc.id).map_or(false, |c| c.content_hash == hash) {
                stats.reused += 1;
                continue;
            }
            log::debug!("Analyzing {}", doc.id);
            let analysis = self.analyzer.analyze_isolated(&doc.content, &doc.id);
            self.cache.insert(
                doc.id.clone(),
                CachedAnalysis {
                    content_hash: hash,
                    analysis,
                },
            );
            stats.analyzed += 1;
        }

        let mut merged = Analysis::default();
        for doc in &eligible {
            if let Some(cached) = self.cache.get(&doc.id) {
                merged = merged.merge(&cached.analysis);
            }
        }
        self.merged = merged;

        log::info!(
            "Corpus refresh: {} analyzed, {} reused, {} dropped, {} skipped ({} entities, {} relations)",
            stats.analyzed,
            stats.reused,
            stats.dropped,
            stats.skipped,
            self.merged.entities.len(),
            self.merged.relations.len()
        );
        stats
    }

    pub fn analysis(&self) -> &Analysis {
        &self.merged
    }

    pub fn document_count(&self) -> usize {
        self.cache.len()
    }

    pub fn graph(&self, filter: &GraphFilter) -> GraphData {
        filter.graph(&self.merged.entities, &self.merged.relations)
    }
}
