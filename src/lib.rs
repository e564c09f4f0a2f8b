pub mod config;
pub mod error;
pub mod db;
pub mod graph;
pub mod corpus;
pub mod watch;

pub use config::Config;
pub use corpus::{Corpus, RefreshStats};
pub use error::{NotegraphError, Result};
pub use graph::{
    analyze_corpus, build_graph_data, extract_text_content, merge_entities, merge_relations, Analysis, Analyzer,
    Entity, EntityType, GraphData, GraphFilter, Relation, RelationType, SourceDocument,
};
