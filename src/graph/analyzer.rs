//! Per-document analysis: text → entities → merge → relations → merge.

use serde::{Deserialize, Serialize};

use super::extraction::EntityExtractor;
use super::lexicon::Lexicon;
use super::merge::{merge_entities, merge_relations};
use super::projection::{build_graph_data, GraphData};
use super::relations::RelationExtractor;
use super::text::extract_text_content;
use super::{Entity, Relation};
use crate::config::AnalysisConfig;
use crate::error::Result;

/// A document as handed over by the store: opaque id plus raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub content: String,
}

/// Accumulated entity/relation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    /// Fold another result into this one, see [`merge_entities`].
    pub fn merge(&self, other: &Analysis) -> Analysis {
        Analysis {
            entities: merge_entities(&self.entities, &other.entities),
            relations: merge_relations(&self.relations, &other.relations),
        }
    }

    pub fn graph_data(&self) -> GraphData {
        build_graph_data(&self.entities, &self.relations)
    }
}

pub struct Analyzer {
    entities: EntityExtractor,
    relations: RelationExtractor,
}

impl Analyzer {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        Ok(Self {
            entities: EntityExtractor::new(lexicon)?,
            relations: RelationExtractor::new(lexicon),
        })
    }

    /// Built-in tables, or the configured lexicon file, with configured limits.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::load(path)?,
            None => Lexicon::default(),
        };
        Ok(Self {
            entities: EntityExtractor::new(&lexicon)?
                .with_name_limits(config.min_name_chars, config.max_name_chars),
            relations: RelationExtractor::new(&lexicon).with_context_chars(config.context_chars),
        })
    }

    pub fn extract_entities(&self, text: &str, document_id: &str) -> Vec<Entity> {
        self.entities.extract(text, document_id)
    }

    pub fn extract_relations(&self, text: &str, entities: &[Entity], document_id: &str) -> Vec<Relation> {
        self.relations.extract(text, entities, document_id)
    }

    /// Analyze one document against the accumulated state and return the new
    /// accumulated state. Inputs are left untouched.
    pub fn analyze_document(
        &self,
        content: &str,
        document_id: &str,
        existing_entities: &[Entity],
        existing_relations: &[Relation],
    ) -> Analysis {
        let text = extract_text_content(content);

        let found = self.extract_entities(&text, document_id);
        let entities = merge_entities(existing_entities, &found);

        let observed = self.extract_relations(&text, &entities, document_id);
        let relations = merge_relations(existing_relations, &observed);

        Analysis {
            entities,
            relations,
        }
    }

    /// The document's own contribution, independent of any other document.
    pub fn analyze_isolated(&self, content: &str, document_id: &str) -> Analysis {
        self.analyze_document(content, document_id, &[], &[])
    }
}

/// Uncached fold of [`Analyzer::analyze_document`] over `documents`, skipping
/// those with `min_content_chars` characters or fewer.
pub fn analyze_corpus(analyzer: &Analyzer, documents: &[SourceDocument], min_content_chars: usize) -> Analysis {
    documents
        .iter()
        .filter(|doc| doc.content.chars().count() > min_content_chars)
        .fold(Analysis::default(), |acc, doc| {
            let next = analyzer.analyze_document(&doc.content, &doc.id, &acc.entities, &acc.relations);
            log::debug!(
                "Analyzed {}: {} entities, {} relations so far",
                doc.id,
                next.entities.len(),
                next.relations.len()
            );
            next
        })
}
