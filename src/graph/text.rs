//! Flatten note content (plain text or an editor block-tree snapshot) to text.

use serde_json::Value as JsonValue;

/// Rich-text run: the string inserts of a delta, in order. Inserts only
/// split a run where formatting changes, so they concatenate without a gap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub inserts: Vec<String>,
}

impl RichText {
    pub fn text(&self) -> String {
        self.inserts.concat()
    }

    /// Reads `{ delta: [{ insert: "..." }, ...] }`. Embeds, empty inserts and
    /// malformed operations carry no text and are skipped.
    fn from_value(value: &JsonValue) -> Option<Self> {
        let delta = value.get("delta")?.as_array()?;
        let inserts = delta
            .iter()
            .filter_map(|op| op.get("insert").and_then(JsonValue::as_str))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Some(Self { inserts })
    }
}

/// One node of a snapshot's block tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub text: Option<RichText>,
    pub title: Option<RichText>,
    pub children: Vec<Block>,
}

impl Block {
    /// Total conversion from loosely shaped JSON: anything that does not
    /// look like a block field is ignored rather than rejected.
    pub fn from_value(value: &JsonValue) -> Self {
        let props = value.get("props");
        let rich = |key: &str| props.and_then(|p| p.get(key)).and_then(RichText::from_value);

        let children = value
            .get("children")
            .and_then(JsonValue::as_array)
            .map(|nodes| nodes.iter().map(Block::from_value).collect())
            .unwrap_or_default();

        Self {
            text: rich("text"),
            title: rich("title"),
            children,
        }
    }

    /// Depth-first, pre-order: own text, own title, then children.
    fn collect_fragments(&self, out: &mut Vec<String>) {
        for run in [&self.text, &self.title].into_iter().flatten() {
            if !run.inserts.is_empty() {
                out.push(run.text());
            }
        }
        for child in &self.children {
            child.collect_fragments(out);
        }
    }
}

/// Note content as stored by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// JSON snapshot; `None` when it has no `blocks` root.
    Snapshot(Option<Block>),
    PlainText(String),
}

impl DocumentContent {
    /// Any JSON value other than `null` is a snapshot, everything else is text.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<JsonValue>(raw) {
            Ok(JsonValue::Null) | Err(_) => DocumentContent::PlainText(raw.to_string()),
            Ok(value) => DocumentContent::Snapshot(value.get("blocks").map(Block::from_value)),
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            DocumentContent::PlainText(text) => text.clone(),
            DocumentContent::Snapshot(None) => String::new(),
            DocumentContent::Snapshot(Some(root)) => {
                let mut fragments = Vec::new();
                root.collect_fragments(&mut fragments);
                fragments.join(" ")
            }
        }
    }
}

/// Plain text of a note's raw content. Never fails.
pub fn extract_text_content(raw: &str) -> String {
    DocumentContent::parse(raw).plain_text()
}
