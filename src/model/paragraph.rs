//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

/// A paragraph: an ordered sequence of text runs.
///
/// The paragraph's *logical text* is the concatenation of its run texts.
/// Placeholder tokens are matched against the logical text, so a token may
/// start in one run and end in another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in document order
    pub runs: Vec<TextRun>,

    /// Paragraph style
    pub style: ParagraphStyle,

    /// Index of the paragraph anchor in the source package part, if any.
    #[serde(skip)]
    pub(crate) source: Option<usize>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from a sequence of plain run texts.
    ///
    /// ```
    /// use docfill::Paragraph;
    ///
    /// let p = Paragraph::from_runs(["{F", "IO}"]);
    /// assert_eq!(p.text(), "{FIO}");
    /// assert_eq!(p.runs.len(), 2);
    /// ```
    pub fn from_runs<S: Into<String>>(runs: impl IntoIterator<Item = S>) -> Self {
        Self {
            runs: runs.into_iter().map(TextRun::new).collect(),
            ..Self::default()
        }
    }

    /// Append a plain run.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(TextRun::new(text));
    }

    /// Append a styled run.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Logical text: the concatenation of all run texts.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replace the logical text, collapsing the run structure.
    ///
    /// The first run receives `text` and keeps its own style; every other
    /// run is emptied. A paragraph without runs gains a new default-styled
    /// run. Formatting differences between the original runs are lost.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.runs.split_first_mut() {
            Some((first, rest)) => {
                first.text = text;
                for run in rest {
                    run.text.clear();
                }
            }
            None => self.add_text(text),
        }
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(TextRun::is_empty)
    }

    /// Number of runs carrying text.
    pub fn non_empty_runs(&self) -> usize {
        self.runs.iter().filter(|r| !r.is_empty()).count()
    }
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content (tabs as `\t`, line breaks as `\n`)
    pub text: String,

    /// Text styling
    pub style: TextStyle,

    /// Index of the run anchor within its paragraph anchor, if any.
    #[serde(skip)]
    pub(crate) source: Option<usize>,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                bold: true,
                ..Default::default()
            },
            source: None,
        }
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                italic: true,
                ..Default::default()
            },
            source: None,
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Run formatting as read from `w:rPr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Strikethrough text
    pub strikethrough: bool,

    /// Character style id (`w:rStyle`)
    pub style_id: Option<String>,

    /// Font name (`w:rFonts/@w:ascii`)
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: Option<f32>,

    /// Text color (hex, e.g. "FF0000")
    pub color: Option<String>,
}

impl TextStyle {
    /// Check if any character styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline || self.strikethrough
    }
}

/// Paragraph properties as read from `w:pPr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Paragraph style id (`w:pStyle`)
    pub style_id: Option<String>,

    /// Text alignment
    pub alignment: Alignment,
}

/// Paragraph alignment (`w:jc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left/start alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right/end alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Parse a `w:jc/@w:val` value.
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "distribute" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}
