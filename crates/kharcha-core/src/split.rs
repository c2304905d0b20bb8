//! Multi-expense splitting
//!
//! Messages and receipts list several expenses in one of three shapes, checked
//! in this order:
//!
//! 1. `Separator`: blocks delimited by `---` or `===` runs
//! 2. `PerLine`: two or more lines carry a number, so each line is one expense
//! 3. `Paragraph`: blank lines delimit multi-line blocks
//!
//! Each segment goes through [`ExpenseParser::parse`]; segments without an
//! amount are dropped silently.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::models::ParsedExpense;
use crate::parser::ExpenseParser;

static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}|={3,}").expect("valid regex"));

/// Minimum lines with a number before every line counts as its own expense
const PER_LINE_THRESHOLD: usize = 2;

/// How a text was cut into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationTier {
    Separator = 1,
    PerLine = 2,
    Paragraph = 3,
}

impl SegmentationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Separator => "separator",
            Self::PerLine => "per_line",
            Self::Paragraph => "paragraph",
        }
    }
}

impl std::fmt::Display for SegmentationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Segments of a text, in order, and the rule that produced them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segmentation {
    pub tier: SegmentationTier,
    pub segments: Vec<String>,
}

/// Cut text into independently parseable segments
pub fn segment(text: &str) -> Segmentation {
    if BLOCK_SEPARATOR.is_match(text) {
        let segments = BLOCK_SEPARATOR
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        return Segmentation {
            tier: SegmentationTier::Separator,
            segments,
        };
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let numbered = lines
        .iter()
        .filter(|l| l.chars().any(|c| c.is_ascii_digit()))
        .count();

    if numbered >= PER_LINE_THRESHOLD {
        return Segmentation {
            tier: SegmentationTier::PerLine,
            segments: lines.into_iter().map(str::to_string).collect(),
        };
    }

    Segmentation {
        tier: SegmentationTier::Paragraph,
        segments: paragraphs(text),
    }
}

/// Group consecutive non-blank lines, splitting on blank ones
fn paragraphs(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

impl ExpenseParser {
    /// Parse every expense in a multi-expense text, in order of appearance
    pub fn split_and_parse(&self, text: &str) -> Vec<ParsedExpense> {
        let Segmentation { tier, segments } = segment(text);
        debug!(tier = %tier, segments = segments.len(), "Segmented text");

        segments
            .iter()
            .filter_map(|segment| self.parse(segment))
            .collect()
    }
}
