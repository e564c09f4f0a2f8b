//! Relation extraction: sentence co-occurrence classified by keyword tables.

use std::collections::HashSet;

use super::lexicon::{KeywordSpec, Lexicon};
use super::{Entity, Relation, RelationType};

/// Context recorded on document-level fallback relations.
pub const DOCUMENT_CONTEXT: &str = "(document-level association)";

/// Characters of the originating sentence kept as context.
pub const CONTEXT_CHARS: usize = 100;

pub struct RelationExtractor {
    keywords: Vec<KeywordSpec>,
    delimiters: Vec<char>,
    context_chars: usize,
}

impl RelationExtractor {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            keywords: lexicon.relation_keywords.clone(),
            delimiters: lexicon.sentence_delimiters.chars().collect(),
            context_chars: CONTEXT_CHARS,
        }
    }

    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    /// Non-trivial sentences of `text`, trimmed.
    pub fn sentences<'s, 't>(&'s self, text: &'t str) -> impl Iterator<Item = &'t str> + 's
    where
        't: 's,
    {
        text.split(move |c: char| self.delimiters.contains(&c))
            .map(str::trim)
            .filter(|s| s.chars().count() >= 2)
    }

    /// First relation type, in table order, with a keyword in `sentence`.
    pub fn classify(&self, sentence: &str) -> RelationType {
        self.keywords
            .iter()
            .find(|spec| {
                spec.keywords
                    .iter()
                    .any(|kw| !kw.is_empty() && sentence.contains(kw.as_str()))
            })
            .map(|spec| spec.relation_type)
            .unwrap_or(RelationType::Related)
    }

    /// Relations observed in `document_id`. `entities` is the corpus-wide set;
    /// only entities attributed to this document take part.
    pub fn extract(&self, text: &str, entities: &[Entity], document_id: &str) -> Vec<Relation> {
        let attributed: Vec<&Entity> = entities.iter().filter(|e| e.in_document(document_id)).collect();
        let mut relations = Vec::new();
        let mut seen = HashSet::new();

        for sentence in self.sentences(text) {
            let present: Vec<&Entity> = attributed
                .iter()
                .copied()
                .filter(|e| sentence.contains(e.name.as_str()))
                .collect();
            if present.len() < 2 {
                continue;
            }

            let relation_type = self.classify(sentence);
            let context: String = sentence.chars().take(self.context_chars).collect();

            for (i, source) in present.iter().enumerate() {
                for target in &present[i + 1..] {
                    let id = relation_id(source, relation_type, target, document_id);
                    if !seen.insert(id.clone()) {
                        continue;
                    }
                    relations.push(Relation {
                        id,
                        source_id: source.id.clone(),
                        target_id: target.id.clone(),
                        relation_type,
                        document_id: document_id.to_string(),
                        context: Some(context.clone()),
                    });
                }
            }
        }

        if relations.is_empty() && attributed.len() >= 2 {
            log::debug!(
                "{}: no sentence co-occurrence, linking {} entities at document level",
                document_id,
                attributed.len()
            );
            for (i, source) in attributed.iter().enumerate() {
                for target in &attributed[i + 1..] {
                    relations.push(Relation {
                        id: format!("{}|document", relation_id(source, RelationType::Related, target, document_id)),
                        source_id: source.id.clone(),
                        target_id: target.id.clone(),
                        relation_type: RelationType::Related,
                        document_id: document_id.to_string(),
                        context: Some(DOCUMENT_CONTEXT.to_string()),
                    });
                }
            }
        }

        log::debug!("{}: {} relations", document_id, relations.len());
        relations
    }
}

fn relation_id(source: &Entity, relation_type: RelationType, target: &Entity, document_id: &str) -> String {
    format!("{}|{}|{}|{}", source.id, relation_type, target.id, document_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EntityExtractor, EntityType};

    fn extractor() -> RelationExtractor {
        RelationExtractor::new(&Lexicon::default())
    }

    fn entity(t: EntityType, name: &str, doc: &str) -> Entity {
        Entity::new(t, name, doc)
    }

    #[test]
    fn test_located_relation_from_keyword() {
        let text = "张三在北京创建了华为公司。华为公司位于深圳市。";
        let entities = EntityExtractor::new(&Lexicon::default()).unwrap().extract(text, "doc-1");
        let relations = extractor().extract(text, &entities, "doc-1");

        let huawei = "Organization:华为公司";
        let located: Vec<&Relation> = relations
            .iter()
            .filter(|r| r.relation_type == RelationType::Located)
            .filter(|r| r.source_id == huawei || r.target_id == huawei)
            .filter(|r| {
                [&r.source_id, &r.target_id]
                    .iter()
                    .any(|id| *id == "Location:深圳" || *id == "Location:北京")
            })
            .collect();
        assert!(!located.is_empty());
        assert_eq!(located[0].context.as_deref(), Some("华为公司位于深圳市"));
    }

    #[test]
    fn test_pair_per_sentence_in_entity_order() {
        let entities = vec![
            entity(EntityType::Person, "张三", "d"),
            entity(EntityType::Location, "北京", "d"),
            entity(EntityType::Organization, "华为公司", "d"),
        ];
        let relations = extractor().extract("张三和北京还有华为公司", &entities, "d");
        assert_eq!(relations.len(), 3);
        assert_eq!(relations[0].source_id, "Person:张三");
        assert_eq!(relations[0].target_id, "Location:北京");
        assert_eq!(relations[2].source_id, "Location:北京");
        assert_eq!(relations[2].target_id, "Organization:华为公司");
        assert!(relations.iter().all(|r| r.relation_type == RelationType::Related));
    }

    #[test]
    fn test_entities_from_other_documents_ignored() {
        let entities = vec![
            entity(EntityType::Location, "北京", "d1"),
            entity(EntityType::Location, "上海", "d2"),
        ];
        let relations = extractor().extract("北京和上海", &entities, "d1");
        assert!(relations.is_empty());
    }

    #[test]
    fn test_document_level_fallback() {
        let text = "北京很大。深圳很美。";
        let entities = EntityExtractor::new(&Lexicon::default()).unwrap().extract(text, "doc-2");
        assert_eq!(entities.len(), 2);

        let relations = extractor().extract(text, &entities, "doc-2");
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].relation_type, RelationType::Related);
        assert_eq!(relations[0].context.as_deref(), Some(DOCUMENT_CONTEXT));
        assert!(relations[0].id.ends_with("|document"));
    }

    #[test]
    fn test_no_fallback_for_single_entity() {
        let entities = vec![entity(EntityType::Location, "北京", "d")];
        assert!(extractor().extract("北京很大。", &entities, "d").is_empty());
    }

    #[test]
    fn test_fallback_id_differs_from_sentence_id() {
        let entities = vec![
            entity(EntityType::Location, "北京", "d"),
            entity(EntityType::Location, "深圳", "d"),
        ];
        let sentence = extractor().extract("北京和深圳", &entities, "d");
        let fallback = extractor().extract("北京。深圳", &entities, "d");
        assert_eq!(sentence.len(), 1);
        assert_eq!(fallback.len(), 1);
        assert_ne!(sentence[0].id, fallback[0].id);
    }

    #[test]
    fn test_keyword_tie_break_uses_table_order() {
        // "属于" (PartOf) and "位于" (Located) both hit; PartOf comes first
        let entities = vec![
            entity(EntityType::Location, "深圳", "d"),
            entity(EntityType::Location, "广东", "d"),
        ];
        let relations = extractor().extract("深圳位于南方，属于广东", &entities, "d");
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].relation_type, RelationType::PartOf);
    }

    #[test]
    fn test_custom_keyword_table_order() {
        let lexicon = Lexicon {
            relation_keywords: vec![
                KeywordSpec {
                    relation_type: RelationType::Opposite,
                    keywords: vec!["versus".to_string()],
                },
                KeywordSpec {
                    relation_type: RelationType::Similar,
                    keywords: vec!["like".to_string()],
                },
            ],
            sentence_delimiters: ".".to_string(),
            ..Lexicon::default()
        };
        let extractor = RelationExtractor::new(&lexicon);
        assert_eq!(extractor.classify("cats like dogs versus mice"), RelationType::Opposite);
        assert_eq!(extractor.classify("cats like dogs"), RelationType::Similar);
        assert_eq!(extractor.classify("cats and dogs"), RelationType::Related);
    }

    #[test]
    fn test_sentence_splitting() {
        let text = "第一句。二！？\n；x；第三句话";
        let sentences: Vec<&str> = extractor().sentences(text).collect();
        assert_eq!(sentences, vec!["第一句", "第三句话"]);
    }

    #[test]
    fn test_sentences_outlive_extractor() {
        let text = String::from("北京很大。深圳很美。");
        let sentences: Vec<&str> = {
            let extractor = RelationExtractor::new(&Lexicon::default());
            extractor.sentences(&text).collect()
        };
        assert_eq!(sentences, vec!["北京很大", "深圳很美"]);
    }

    #[test]
    fn test_context_truncated() {
        let filler = "很".repeat(150);
        let text = format!("北京{}深圳", filler);
        let entities = vec![
            entity(EntityType::Location, "北京", "d"),
            entity(EntityType::Location, "深圳", "d"),
        ];
        let relations = extractor().with_context_chars(10).extract(&text, &entities, "d");
        assert_eq!(relations[0].context.as_ref().unwrap().chars().count(), 10);
        let relations = extractor().extract(&text, &entities, "d");
        assert_eq!(relations[0].context.as_ref().unwrap().chars().count(), CONTEXT_CHARS);
    }

    #[test]
    fn test_repeated_pair_recorded_once() {
        let entities = vec![
            entity(EntityType::Location, "北京", "d"),
            entity(EntityType::Location, "深圳", "d"),
        ];
        let relations = extractor().extract("北京和深圳。北京和深圳。", &entities, "d");
        assert_eq!(relations.len(), 1);
    }

    #[test]
    fn test_empty_text() {
        let entities = vec![entity(EntityType::Location, "北京", "d")];
        assert!(extractor().extract("", &entities, "d").is_empty());
        assert!(extractor().extract("", &[], "d").is_empty());
    }
}
