//! Entity extraction from plain text (regex-based).

use std::collections::HashMap;

use regex::Regex;

use super::lexicon::Lexicon;
use super::{entity_id, Entity, EntityType};
use crate::error::Result;

/// Surface strings outside this many characters are dropped.
pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 20;

struct CompiledPattern {
    entity_type: EntityType,
    regex: Regex,
}

/// Scans text with the typed pattern table and the gazetteer.
pub struct EntityExtractor {
    patterns: Vec<CompiledPattern>,
    gazetteer: Vec<String>,
    min_name_chars: usize,
    max_name_chars: usize,
}

impl EntityExtractor {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let patterns = lexicon
            .entity_patterns
            .iter()
            .map(|spec| -> Result<CompiledPattern> {
                Ok(CompiledPattern {
                    entity_type: spec.entity_type,
                    regex: Regex::new(&spec.pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            gazetteer: lexicon.gazetteer.clone(),
            min_name_chars: MIN_NAME_CHARS,
            max_name_chars: MAX_NAME_CHARS,
        })
    }

    pub fn with_name_limits(mut self, min_chars: usize, max_chars: usize) -> Self {
        self.min_name_chars = min_chars;
        self.max_name_chars = max_chars;
        self
    }

    /// Entities in first-seen order. Repeated hits on one `(type, name)` bump
    /// its frequency; a gazetteer place counts once per call.
    pub fn extract(&self, text: &str, document_id: &str) -> Vec<Entity> {
        let mut found = Found::default();

        for pattern in &self.patterns {
            for surface in surfaces(&pattern.regex, text) {
                self.record(&mut found, pattern.entity_type, surface, document_id);
            }
        }

        for place in &self.gazetteer {
            if !place.is_empty() && text.contains(place.as_str()) {
                self.record(&mut found, EntityType::Location, place, document_id);
            }
        }

        log::debug!(
            "{}: {} entities from {} chars",
            document_id,
            found.entities.len(),
            text.chars().count()
        );
        found.entities
    }

    fn record(&self, found: &mut Found, entity_type: EntityType, surface: &str, document_id: &str) {
        let name = surface.trim();
        let len = name.chars().count();
        if len < self.min_name_chars || len > self.max_name_chars {
            return;
        }

        let id = entity_id(entity_type, name);
        match found.index.get(&id) {
            Some(&i) => {
                let entity = &mut found.entities[i];
                entity.frequency += 1;
                entity.document_ids.insert(document_id.to_string());
            }
            None => {
                found.index.insert(id, found.entities.len());
                found.entities.push(Entity::new(entity_type, name, document_id));
            }
        }
    }
}

#[derive(Default)]
struct Found {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

/// Successive surface strings of `regex` in `text`. The `name` group, when
/// present, is the surface and the rest of the match is context around it.
/// A surface never starts before the end of the previous one, but the context
/// of the next match may overlap it: a trigger word swallowed by a greedy
/// name still introduces the name after it.
fn surfaces<'t>(regex: &Regex, text: &'t str) -> Vec<&'t str> {
    let named = regex.capture_names().any(|n| n == Some("name"));
    let mut out = Vec::new();
    // surfaces start at or after `pos`; matches are searched from `from`
    let mut pos = 0;
    let mut from = 0;

    while from <= text.len() {
        let Some(caps) = regex.captures_at(text, from) else {
            break;
        };
        let (Some(whole), Some(m)) = (caps.get(0), caps.name("name").or_else(|| caps.get(0))) else {
            break;
        };

        if m.start() < pos {
            match next_char(text, whole.start()) {
                Some(next) => {
                    from = next;
                    continue;
                }
                None => break,
            }
        }
        out.push(m.as_str());

        pos = if m.end() > pos {
            m.end()
        } else {
            match next_char(text, pos) {
                Some(next) => next,
                None => break,
            }
        };
        from = if named {
            next_char(text, whole.start()).map_or(pos, |next| next.min(pos))
        } else {
            pos
        };
    }

    out
}

/// Byte offset of the char after the one at `at`.
fn next_char(text: &str, at: usize) -> Option<usize> {
    text[at..].chars().next().map(|c| at + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::lexicon::PatternSpec;

    fn default_extractor() -> EntityExtractor {
        EntityExtractor::new(&Lexicon::default()).unwrap()
    }

    fn find<'a>(entities: &'a [Entity], t: EntityType, name: &str) -> Option<&'a Entity> {
        entities.iter().find(|e| e.entity_type == t && e.name == name)
    }

    fn lexicon_with(patterns: &[(EntityType, &str)], gazetteer: &[&str]) -> Lexicon {
        Lexicon {
            entity_patterns: patterns
                .iter()
                .map(|(t, p)| PatternSpec {
                    entity_type: *t,
                    pattern: p.to_string(),
                })
                .collect(),
            gazetteer: gazetteer.iter().map(|g| g.to_string()).collect(),
            ..Lexicon::default()
        }
    }

    #[test]
    fn test_extract_company_and_places() {
        let text = "张三在北京创建了华为公司。华为公司位于深圳市。";
        let entities = default_extractor().extract(text, "doc-1");

        assert!(find(&entities, EntityType::Organization, "华为公司").is_some());
        assert!(find(&entities, EntityType::Location, "北京").is_some());
        assert!(find(&entities, EntityType::Location, "深圳").is_some());
        assert!(find(&entities, EntityType::Location, "深圳市").is_some());
        for e in &entities {
            assert!(e.in_document("doc-1"));
        }
    }

    #[test]
    fn test_title_prefix_person() {
        let entities = default_extractor().extract("我们采访了教授李明。", "d");
        assert!(find(&entities, EntityType::Person, "李明").is_some());
    }

    #[test]
    fn test_dates() {
        let entities = default_extractor().extract("会议定于2024年3月15日举行", "d");
        assert!(find(&entities, EntityType::Date, "2024年3月15日").is_some());
        assert!(find(&entities, EntityType::Date, "2024年3月").is_some());
        assert!(find(&entities, EntityType::Date, "3月15日").is_some());
    }

    #[test]
    fn test_repeated_match_counts_frequency() {
        let text = "华为公司。华为公司。华为公司。";
        let entities = default_extractor().extract(text, "doc-1");
        let org = find(&entities, EntityType::Organization, "华为公司").unwrap();
        assert_eq!(org.frequency, 3);
        assert_eq!(org.document_ids.len(), 1);
    }

    #[test]
    fn test_gazetteer_counts_once_per_call() {
        let entities = default_extractor().extract("北京，北京，北京", "d");
        let beijing = find(&entities, EntityType::Location, "北京").unwrap();
        assert_eq!(beijing.frequency, 1);
    }

    #[test]
    fn test_overlong_candidate_dropped() {
        let long = format!("{}公司", "甲".repeat(19));
        assert_eq!(long.chars().count(), 21);
        let entities = default_extractor().extract(&long, "d");
        assert!(entities.iter().all(|e| e.entity_type != EntityType::Organization));

        let fits = format!("{}公司", "甲".repeat(18));
        let entities = default_extractor().extract(&fits, "d");
        assert!(find(&entities, EntityType::Organization, &fits).is_some());
    }

    #[test]
    fn test_single_char_candidate_dropped() {
        let extractor =
            EntityExtractor::new(&lexicon_with(&[(EntityType::Concept, "[A-Z]+")], &[])).unwrap();
        let entities = extractor.extract("A BC D", "d");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "BC");
    }

    #[test]
    fn test_custom_name_limits() {
        let extractor = EntityExtractor::new(&lexicon_with(&[(EntityType::Concept, "[A-Z]+")], &[]))
            .unwrap()
            .with_name_limits(1, 2);
        let names: Vec<String> = extractor.extract("A BC DEF", "d").into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["A".to_string(), "BC".to_string()]);
    }

    #[test]
    fn test_trigger_word_reused_by_next_match() {
        // "说" closes the first name and must still be there for the scan after it
        let extractor = EntityExtractor::new(&lexicon_with(
            &[(EntityType::Person, "(?P<name>[a-z]{2,4})(?:说)")],
            &[],
        ))
        .unwrap();
        let names: Vec<String> = extractor.extract("ab说cd说", "d").into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["ab".to_string(), "cd".to_string()]);
    }

    #[test]
    fn test_title_inside_previous_name_still_fires() {
        let entities = default_extractor().extract("教授张三和教授李四", "d");
        let persons: Vec<&str> = entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Person)
            .map(|e| e.name.as_str())
            .collect();
        // the greedy first name swallows half of the second title
        assert_eq!(persons, vec!["张三和教", "李四"]);
    }

    #[test]
    fn test_leading_trigger_overlapping_previous_surface() {
        let extractor = EntityExtractor::new(&lexicon_with(
            &[(EntityType::Concept, "(?:yx)(?P<name>[a-z]{2,3})")],
            &[],
        ))
        .unwrap();
        let names: Vec<String> = extractor.extract("yxabyxcd", "d").into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["aby".to_string(), "cd".to_string()]);
    }

    #[test]
    fn test_leading_trigger_never_rematches_same_surface() {
        let extractor = EntityExtractor::new(&lexicon_with(
            &[(EntityType::Concept, "(?:x)(?P<name>[a-z]{2,4})")],
            &[],
        ))
        .unwrap();
        let entities = extractor.extract("xabxcd", "d");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "abxc");
        assert_eq!(entities[0].frequency, 1);
    }

    #[test]
    fn test_empty_matches_terminate() {
        let extractor =
            EntityExtractor::new(&lexicon_with(&[(EntityType::Concept, "x*")], &[])).unwrap();
        let entities = extractor.extract("中文 xx y", "d");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "xx");
    }

    #[test]
    fn test_same_name_different_types_are_distinct() {
        let extractor = EntityExtractor::new(&lexicon_with(
            &[(EntityType::Concept, "Mercury"), (EntityType::Location, "Mercury")],
            &[],
        ))
        .unwrap();
        let entities = extractor.extract("Mercury", "d");
        assert_eq!(entities.len(), 2);
        assert_ne!(entities[0].id, entities[1].id);
    }

    #[test]
    fn test_deterministic() {
        let text = "李四参与了这次活动。张三和李四都是著名的学者。上海是中国最大的城市之一。";
        let extractor = default_extractor();
        assert_eq!(extractor.extract(text, "d"), extractor.extract(text, "d"));
    }

    #[test]
    fn test_irrelevant_text_yields_nothing() {
        assert!(default_extractor().extract("", "d").is_empty());
        assert!(default_extractor().extract("plain ascii words only", "d").is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let lexicon = lexicon_with(&[(EntityType::Concept, "(unclosed")], &[]);
        assert!(EntityExtractor::new(&lexicon).is_err());
    }
}
