//! Renderable projection of the entity/relation sets.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::{Entity, EntityType, Relation, RelationType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Visual size, `sqrt(frequency) * 2 + 3`.
    pub val: f64,
    pub color: String,
    pub document_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    /// Entity id; the renderer resolves it to a node.
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// One node per entity, one link per relation. No filtering happens here.
pub fn build_graph_data(entities: &[Entity], relations: &[Relation]) -> GraphData {
    let nodes = entities
        .iter()
        .map(|entity| GraphNode {
            id: entity.id.clone(),
            name: entity.name.clone(),
            entity_type: entity.entity_type,
            val: (entity.frequency as f64).sqrt() * 2.0 + 3.0,
            color: entity.entity_type.color().to_string(),
            document_ids: entity.document_ids.clone(),
        })
        .collect();

    let links = relations
        .iter()
        .map(|relation| GraphLink {
            source: relation.source_id.clone(),
            target: relation.target_id.clone(),
            relation_type: relation.relation_type,
            context: relation.context.clone(),
        })
        .collect();

    GraphData { nodes, links }
}

/// View narrowing applied before projection. Relations survive only when
/// both of their endpoints do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphFilter {
    pub document_id: Option<String>,
    pub entity_type: Option<EntityType>,
    /// Case-insensitive substring of the entity name.
    pub search: Option<String>,
}

impl GraphFilter {
    pub fn is_empty(&self) -> bool {
        self.document_id.is_none() && self.entity_type.is_none() && self.search.is_none()
    }

    pub fn apply(&self, entities: &[Entity], relations: &[Relation]) -> (Vec<Entity>, Vec<Relation>) {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let kept: Vec<Entity> = entities
            .iter()
            .filter(|e| self.document_id.as_deref().map_or(true, |d| e.in_document(d)))
            .filter(|e| self.entity_type.map_or(true, |t| e.entity_type == t))
            .filter(|e| {
                needle
                    .as_deref()
                    .map_or(true, |n| e.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();

        let ids: HashSet<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        let links = relations
            .iter()
            .filter(|r| ids.contains(r.source_id.as_str()) && ids.contains(r.target_id.as_str()))
            .cloned()
            .collect();

        (kept, links)
    }

    pub fn graph(&self, entities: &[Entity], relations: &[Relation]) -> GraphData {
        let (entities, relations) = self.apply(entities, relations);
        build_graph_data(&entities, &relations)
    }
}
