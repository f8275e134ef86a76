//! Assembled document types.

use crate::diagnostics::Diagnostic;
use crate::error::{EngineError, Result};
use serde::Serialize;

/// Where a section came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Introduction,
    Clause,
    Paragraph,
}

/// One included clause or paragraph, with references substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub clause_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_id: Option<String>,
    pub title: String,
    pub content: String,
}

impl Section {
    /// `clause` or `clause/paragraph`.
    pub fn id_path(&self) -> String {
        match &self.paragraph_id {
            Some(paragraph_id) => format!("{}/{}", self.clause_id, paragraph_id),
            None => self.clause_id.clone(),
        }
    }
}

/// An assembled document plus the diagnostics met while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assembly {
    pub template_id: String,
    pub title: String,
    /// Included sections in document order.
    pub sections: Vec<Section>,
    /// Missing values, type mismatches and malformed conditions, in
    /// traversal order.
    pub warnings: Vec<Diagnostic>,
}

impl Assembly {
    /// Id paths of the included sections, in order.
    pub fn section_ids(&self) -> Vec<String> {
        self.sections.iter().map(Section::id_path).collect()
    }

    /// Whether a clause or `clause/paragraph` path was included.
    pub fn contains(&self, id_path: &str) -> bool {
        self.sections.iter().any(|s| s.id_path() == id_path)
    }

    /// Render as Markdown: `#` for the document title, `##` for the
    /// Introduction and clauses, `###` for paragraphs. Empty titles and
    /// empty content are omitted.
    pub fn to_markdown(&self) -> String {
        let mut blocks: Vec<String> = Vec::new();
        if !self.title.is_empty() {
            blocks.push(format!("# {}", self.title));
        }

        for section in &self.sections {
            let heading = match section.kind {
                SectionKind::Introduction | SectionKind::Clause => "##",
                SectionKind::Paragraph => "###",
            };
            if !section.title.is_empty() {
                blocks.push(format!("{} {}", heading, section.title));
            }
            let content = section.content.trim_end();
            if !content.is_empty() {
                blocks.push(content.to_string());
            }
        }

        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            EngineError::UserError(format!("failed to serialize assembly: {}", e))
        })
    }
}
