//! Knowledge graph module: entity/relation extraction from note content.
//!
//! Pipeline: flatten content to text, extract typed entities with pattern
//! tables, merge into the corpus set, extract sentence-level relations, then
//! project everything into renderable graph data.

mod analyzer;
mod extraction;
mod lexicon;
mod merge;
mod projection;
mod relations;
mod text;

pub use analyzer::{analyze_corpus, Analysis, Analyzer, SourceDocument};
pub use extraction::{EntityExtractor, MAX_NAME_CHARS, MIN_NAME_CHARS};
pub use lexicon::{KeywordSpec, Lexicon, PatternSpec};
pub use merge::{merge_entities, merge_relations};
pub use projection::{build_graph_data, GraphData, GraphFilter, GraphLink, GraphNode};
pub use relations::{RelationExtractor, CONTEXT_CHARS, DOCUMENT_CONTEXT};
pub use text::{extract_text_content, Block, DocumentContent, RichText};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotegraphError;

/// Closed set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Concept,
    Event,
    Date,
    Unknown,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Person,
        EntityType::Organization,
        EntityType::Location,
        EntityType::Concept,
        EntityType::Event,
        EntityType::Date,
        EntityType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "Person",
            EntityType::Organization => "Organization",
            EntityType::Location => "Location",
            EntityType::Concept => "Concept",
            EntityType::Event => "Event",
            EntityType::Date => "Date",
            EntityType::Unknown => "Unknown",
        }
    }

    /// Node color used by the renderer.
    pub fn color(&self) -> &'static str {
        match self {
            EntityType::Person => "#FF6B6B",
            EntityType::Organization => "#4ECDC4",
            EntityType::Location => "#45B7D1",
            EntityType::Concept => "#96CEB4",
            EntityType::Event => "#FFEAA7",
            EntityType::Date => "#DDA0DD",
            EntityType::Unknown => "#CCCCCC",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = NotegraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NotegraphError::InvalidInput(format!("unknown entity type: {}", s)))
    }
}

/// Closed set of relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationType {
    Related,
    PartOf,
    HasProperty,
    Causes,
    Created,
    Located,
    Participated,
    Similar,
    Opposite,
}

impl RelationType {
    pub const ALL: [RelationType; 9] = [
        RelationType::Related,
        RelationType::PartOf,
        RelationType::HasProperty,
        RelationType::Causes,
        RelationType::Created,
        RelationType::Located,
        RelationType::Participated,
        RelationType::Similar,
        RelationType::Opposite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Related => "Related",
            RelationType::PartOf => "PartOf",
            RelationType::HasProperty => "HasProperty",
            RelationType::Causes => "Causes",
            RelationType::Created => "Created",
            RelationType::Located => "Located",
            RelationType::Participated => "Participated",
            RelationType::Similar => "Similar",
            RelationType::Opposite => "Opposite",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = NotegraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NotegraphError::InvalidInput(format!("unknown relation type: {}", s)))
    }
}

/// A typed, named thing recognized in note text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Stable key, see [`entity_id`].
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Documents the entity was observed in.
    pub document_ids: BTreeSet<String>,
    /// Occurrence counter, summed across merges.
    pub frequency: u64,
}

impl Entity {
    pub fn new(entity_type: EntityType, name: &str, document_id: &str) -> Self {
        Self {
            id: entity_id(entity_type, name),
            name: name.to_string(),
            entity_type,
            document_ids: BTreeSet::from([document_id.to_string()]),
            frequency: 1,
        }
    }

    pub fn in_document(&self, document_id: &str) -> bool {
        self.document_ids.contains(document_id)
    }
}

/// A typed association between two entities, observed in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub document_id: String,
    /// Leading slice of the originating sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Entity key: `<type>:<name>`. Type names never contain `:`, so the
/// prefix up to the first separator always recovers the type.
pub fn entity_id(entity_type: EntityType, name: &str) -> String {
    format!("{}:{}", entity_type, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_is_type_scoped() {
        assert_eq!(entity_id(EntityType::Location, "北京"), "Location:北京");
        assert_ne!(
            entity_id(EntityType::Location, "北京"),
            entity_id(EntityType::Organization, "北京")
        );
    }

    #[test]
    fn test_entity_type_round_trips_through_str() {
        for t in EntityType::ALL {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
        assert_eq!("location".parse::<EntityType>().unwrap(), EntityType::Location);
        assert!("Planet".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_relation_type_parse() {
        assert_eq!("partof".parse::<RelationType>().unwrap(), RelationType::PartOf);
        assert!("Loves".parse::<RelationType>().is_err());
    }

    #[test]
    fn test_entity_serializes_with_camel_case_fields() {
        let entity = Entity::new(EntityType::Person, "张三", "doc-1");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "Person");
        assert_eq!(json["documentIds"][0], "doc-1");
        assert_eq!(json["frequency"], 1);
    }

    #[test]
    fn test_relation_omits_missing_context() {
        let relation = Relation {
            id: "r".to_string(),
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            relation_type: RelationType::Located,
            document_id: "doc-1".to_string(),
            context: None,
        };
        let json = serde_json::to_value(&relation).unwrap();
        assert_eq!(json["type"], "Located");
        assert_eq!(json["sourceId"], "a");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_colors_are_distinct() {
        let colors: BTreeSet<&str> = EntityType::ALL.iter().map(|t| t.color()).collect();
        assert_eq!(colors.len(), EntityType::ALL.len());
    }
}
