//! Fold newly extracted entities/relations into an accumulated set by id.

use std::collections::HashMap;

use super::{Entity, Relation};

/// Union by entity id: an incoming entity colliding with an existing one adds
/// its frequency and documents to it. Order is existing entities first, then
/// new ones as first seen. A repeated id within `existing` replaces the earlier
/// entry in place rather than adding to it.
pub fn merge_entities(existing: &[Entity], incoming: &[Entity]) -> Vec<Entity> {
    let mut merged: Vec<Entity> = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(merged.capacity());

    for entity in existing {
        match index.get(&entity.id) {
            Some(&i) => merged[i] = entity.clone(),
            None => {
                index.insert(entity.id.clone(), merged.len());
                merged.push(entity.clone());
            }
        }
    }

    for entity in incoming {
        match index.get(&entity.id) {
            Some(&i) => {
                let target = &mut merged[i];
                target.frequency += entity.frequency;
                target.document_ids.extend(entity.document_ids.iter().cloned());
            }
            None => {
                index.insert(entity.id.clone(), merged.len());
                merged.push(entity.clone());
            }
        }
    }

    merged
}

/// Union by relation id; the first relation seen for an id is kept as is.
pub fn merge_relations(existing: &[Relation], incoming: &[Relation]) -> Vec<Relation> {
    let mut seen = std::collections::HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .iter()
        .chain(incoming)
        .filter(|r| seen.insert(r.id.as_str()))
        .cloned()
        .collect()
}
