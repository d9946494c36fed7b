//! Table output for retrieval hits and stored documents using comfy-table.

use std::env;

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use super::truncate;
use crate::domain::models::{DocumentId, RetrievalResult};

const EXCERPT_CHARS: usize = 80;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Rank, chunk position, score and a one-line excerpt per hit
    pub fn format_hits(&self, result: &RetrievalResult) -> String {
        let mut table = Self::create_base_table();
        table.set_header(header(&["Rank", "Chunk", "Score", "Excerpt"]));

        for (rank, hit) in result.chunks.iter().enumerate() {
            let score = Cell::new(format!("{:.4}", hit.score)).set_alignment(CellAlignment::Right);
            let score = if self.use_colors {
                score.fg(score_color(hit.score))
            } else {
                score
            };
            let excerpt = truncate(&hit.chunk.text.replace('\n', " "), EXCERPT_CHARS);
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(hit.chunk.position),
                score,
                Cell::new(excerpt),
            ]);
        }

        table.to_string()
    }

    pub fn format_documents(&self, documents: &[(DocumentId, usize)]) -> String {
        let mut table = Self::create_base_table();
        table.set_header(header(&["Document", "Chunks"]));
        for (id, count) in documents {
            table.add_row(vec![
                Cell::new(id),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }

    fn create_base_table() -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

const fn score_color(score: f32) -> Color {
    if score >= 0.5 {
        Color::Green
    } else if score >= 0.2 {
        Color::Yellow
    } else {
        Color::DarkGrey
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, ScoredChunk};

    #[test]
    fn test_format_hits() {
        let result = RetrievalResult {
            chunks: vec![ScoredChunk {
                chunk: Chunk::new(4, "cats are mammals".to_string(), 0),
                score: 0.6667,
            }],
        };
        let rendered = TableFormatter::with_colors(false).format_hits(&result);
        assert!(rendered.contains("Excerpt"));
        assert!(rendered.contains("cats are mammals"));
        assert!(rendered.contains("0.6667"));
    }

    #[test]
    fn test_format_documents() {
        let docs = vec![(DocumentId::new("file:a.txt"), 12)];
        let rendered = TableFormatter::with_colors(false).format_documents(&docs);
        assert!(rendered.contains("file:a.txt"));
        assert!(rendered.contains("12"));
    }
}
