//! Page layout on top of printpdf
//!
//! Text is placed onto A4 pages first (greedy word wrap, automatic page
//! breaks) and drawn with the built-in Helvetica faces on `finish`.

use crate::error::AnalysisError;
use crate::Result;
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};

/// Page geometry in points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 50.0;

/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;
const LINE_SPACING: f32 = 1.4;
const LAYER_NAME: &str = "Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// One wrapped row at its final position, in points from the bottom-left
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub page: usize,
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

pub struct PdfWriter {
    title: String,
    rows: Vec<PlacedText>,
    page: usize,
    y: f32,
}

impl PdfWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
            page: 0,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    pub fn rows(&self) -> &[PlacedText] {
        &self.rows
    }

    /// Write wrapped text at the cursor, moving down one line per row
    pub fn text(&mut self, font: Font, size: f32, indent: f32, text: &str) {
        let usable = PAGE_WIDTH - 2.0 * MARGIN - indent;
        let max_chars = (usable / (size * AVG_GLYPH_WIDTH)).floor().max(1.0) as usize;

        for row in wrap(&sanitize(text), max_chars) {
            let leading = size * LINE_SPACING;
            if self.y - leading < MARGIN {
                self.new_page();
            }
            self.y -= leading;
            self.rows.push(PlacedText {
                page: self.page,
                font,
                size,
                x: MARGIN + indent,
                y: self.y,
                text: row,
            });
        }
    }

    /// Vertical gap; never starts a page on its own
    pub fn space(&mut self, points: f32) {
        self.y = (self.y - points).max(MARGIN);
    }

    pub fn new_page(&mut self) {
        self.page += 1;
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Draw every placed row and serialize the document
    pub fn finish(self) -> Result<Vec<u8>> {
        let width = Mm::from(Pt(PAGE_WIDTH));
        let height = Mm::from(Pt(PAGE_HEIGHT));

        let (doc, first_page, first_layer) =
            PdfDocument::new(self.title.as_str(), width, height, LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(report_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(report_error)?;

        let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
        for _ in 1..self.page_count() {
            let (page, layer) = doc.add_page(width, height, LAYER_NAME);
            layers.push(doc.get_page(page).get_layer(layer));
        }

        for row in &self.rows {
            let font = match row.font {
                Font::Regular => &regular,
                Font::Bold => &bold,
            };
            layers[row.page].use_text(
                row.text.as_str(),
                row.size,
                Mm::from(Pt(row.x)),
                Mm::from(Pt(row.y)),
                font,
            );
        }
        drop(layers);

        doc.save_to_bytes().map_err(report_error)
    }
}

fn report_error(error: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::ReportError(error.to_string())
}

/// Replace characters the built-in fonts cannot show
fn sanitize(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            '₹' => "Rs. ".chars().collect::<Vec<_>>(),
            '\u{2013}' | '\u{2014}' => vec!['-'],
            '\u{2018}' | '\u{2019}' => vec!['\''],
            '\u{201c}' | '\u{201d}' => vec!['"'],
            '\u{2022}' => vec!['-'],
            '\n' | '\t' => vec![' '],
            c if c.is_ascii() && !c.is_ascii_control() => vec![c],
            _ => vec!['?'],
        })
        .collect()
}

/// Greedy word wrap; words longer than a row are split
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.len() > max_chars {
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
            }
            let rest = word.split_off(max_chars);
            rows.push(word);
            word = rest;
        }

        if row.is_empty() {
            row = word;
        } else if row.len() + 1 + word.len() <= max_chars {
            row.push(' ');
            row.push_str(&word);
        } else {
            rows.push(std::mem::replace(&mut row, word));
        }
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_produces_pdf() {
        let mut pdf = PdfWriter::new("Financial Report");
        pdf.text(Font::Bold, 18.0, 0.0, "Financial Report");
        let bytes = pdf.finish().unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn test_long_text_paginates() {
        let mut pdf = PdfWriter::new("Long");
        for i in 0..120 {
            pdf.text(Font::Regular, 11.0, 0.0, &format!("Line {}", i));
        }

        assert!(pdf.page_count() > 1);
        let last = pdf.rows().last().unwrap();
        assert_eq!(last.page, pdf.page_count() - 1);
        assert!(pdf.rows().iter().all(|row| row.y >= MARGIN));

        let bytes = pdf.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_rows_fit_page_width() {
        let mut pdf = PdfWriter::new("Wrap");
        pdf.text(Font::Regular, 11.0, 14.0, &"word ".repeat(200));

        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN - 14.0) / (11.0 * AVG_GLYPH_WIDTH)) as usize;
        assert!(pdf.rows().len() > 1);
        for row in pdf.rows() {
            assert!(row.text.len() <= max_chars);
            assert_eq!(row.x, MARGIN + 14.0);
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("₹5,000 – (net)"), "Rs. 5,000 - (net)");
        assert_eq!(sanitize("caf\u{e9}"), "caf?");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
