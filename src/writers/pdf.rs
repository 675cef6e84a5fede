//! PDF writer
//!
//! Paragraphs are laid out top to bottom on A4 pages with one-inch margins,
//! Helvetica 10pt on a 12pt leading, and a fixed 12pt gap after every
//! paragraph. Line breaking is greedy on whitespace using an average glyph
//! width, which is close enough for the built-in font.
//!
//! The built-in font only encodes WinAnsi (cp1252). Other characters are
//! replaced with `?` and reported; a TrueType font passed to [`write_pdf`]
//! is embedded instead and renders text unchanged.

use crate::error::{Error, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, Pt};
use std::io::{BufReader, BufWriter};
use std::path::Path;

const PAGE_WIDTH_PT: f32 = 595.28;
const PAGE_HEIGHT_PT: f32 = 841.89;
const MARGIN_PT: f32 = 72.0;
const FONT_SIZE_PT: f32 = 10.0;
const LEADING_PT: f32 = 12.0;
const PARAGRAPH_SPACING_PT: f32 = 12.0;
const AVG_GLYPH_WIDTH_EM: f32 = 0.5;
const LAYER_NAME: &str = "Layer 1";

/// Characters WinAnsiEncoding places in 0x80..=0x9F
const WIN_ANSI_EXTRAS: [char; 27] = [
    '\u{20AC}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{017D}', '\u{2018}',
    '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}',
    '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{017E}', '\u{0178}',
];

/// A line of text placed on a page, `y` measured in points from the bottom
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub page: usize,
    pub y: f32,
    pub text: String,
}

/// One input paragraph after layout
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphBlock {
    pub lines: Vec<PlacedLine>,
}

fn max_chars_per_line() -> usize {
    let usable = PAGE_WIDTH_PT - 2.0 * MARGIN_PT;
    (usable / (FONT_SIZE_PT * AVG_GLYPH_WIDTH_EM)).floor() as usize
}

/// Break `text` into lines of at most `width` characters. Runs of
/// whitespace collapse to single spaces; words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(chars.drain(..width).collect());
        }
        let word_len = chars.len();
        if word_len == 0 {
            continue;
        }
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Lay out `paragraphs` in input order, producing exactly one block per
/// paragraph.
pub fn layout_paragraphs(paragraphs: &[String]) -> Vec<ParagraphBlock> {
    let width = max_chars_per_line();
    let top = PAGE_HEIGHT_PT - MARGIN_PT;
    let mut page = 0;
    let mut cursor = top;

    paragraphs
        .iter()
        .map(|paragraph| {
            let mut lines = Vec::new();
            for text in wrap(paragraph, width) {
                if cursor - LEADING_PT < MARGIN_PT {
                    page += 1;
                    cursor = top;
                }
                cursor -= LEADING_PT;
                lines.push(PlacedLine {
                    page,
                    y: cursor,
                    text,
                });
            }
            cursor -= PARAGRAPH_SPACING_PT;
            ParagraphBlock { lines }
        })
        .collect()
}

fn is_win_ansi(c: char) -> bool {
    matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF) || WIN_ANSI_EXTRAS.contains(&c)
}

/// Replace characters the built-in font cannot encode with `?`. Returns the
/// text and how many characters were replaced.
fn win_ansi_text(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let text = text
        .chars()
        .map(|c| {
            if c.is_whitespace() || is_win_ansi(c) {
                c
            } else {
                replaced += 1;
                '?'
            }
        })
        .collect();
    (text, replaced)
}

/// Write `paragraphs` to a PDF file at `path`, embedding the TrueType font at
/// `font` when given.
pub fn write_pdf(path: &Path, paragraphs: &[String], font: Option<&Path>) -> Result<()> {
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm::from(Pt(PAGE_WIDTH_PT)),
        Mm::from(Pt(PAGE_HEIGHT_PT)),
        LAYER_NAME.to_string(),
    );
    let font_ref = match font {
        Some(font_path) => {
            let file = std::fs::File::open(font_path).map_err(|e| {
                Error::Pdf(format!("Failed to open font {}: {}", font_path.display(), e))
            })?;
            doc.add_external_font(BufReader::new(file))
                .map_err(|e| Error::Pdf(format!("Invalid font {}: {}", font_path.display(), e)))?
        }
        None => doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::Pdf(e.to_string()))?,
    };

    let encoded: Vec<String>;
    let paragraphs: &[String] = if font.is_some() {
        paragraphs
    } else {
        encoded = paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| {
                let (text, replaced) = win_ansi_text(paragraph);
                if replaced > 0 {
                    tracing::warn!(
                        file = %path.display(),
                        paragraph = index,
                        replaced,
                        "Characters outside WinAnsi replaced with '?'; set {} to embed a Unicode font",
                        crate::config::ENV_PDF_FONT
                    );
                }
                text
            })
            .collect();
        &encoded
    };

    let mut pages = vec![(first_page, first_layer)];
    for block in layout_paragraphs(paragraphs) {
        for line in block.lines {
            while line.page >= pages.len() {
                pages.push(doc.add_page(
                    Mm::from(Pt(PAGE_WIDTH_PT)),
                    Mm::from(Pt(PAGE_HEIGHT_PT)),
                    LAYER_NAME,
                ));
            }
            draw_line(&doc, &pages, &font_ref, &line);
        }
    }

    let file = std::fs::File::create(path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| Error::Pdf(e.to_string()))?;
    Ok(())
}

fn draw_line(
    doc: &PdfDocumentReference,
    pages: &[(printpdf::PdfPageIndex, printpdf::PdfLayerIndex)],
    font: &IndirectFontRef,
    line: &PlacedLine,
) {
    let (page, layer) = pages[line.page];
    doc.get_page(page).get_layer(layer).use_text(
        line.text.as_str(),
        FONT_SIZE_PT,
        Mm::from(Pt(MARGIN_PT)),
        Mm::from(Pt(line.y)),
        font,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_block_per_paragraph_in_order() {
        let paragraphs: Vec<String> = vec!["first".into(), "".into(), "third one".into()];
        let blocks = layout_paragraphs(&paragraphs);

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].lines[0].text, "first");
        assert!(blocks[1].lines.is_empty());
        assert_eq!(blocks[2].lines[0].text, "third one");
        assert!(blocks[0].lines[0].y > blocks[2].lines[0].y);
    }

    #[test]
    fn test_paragraph_spacing_is_fixed() {
        let paragraphs: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let blocks = layout_paragraphs(&paragraphs);
        let gap1 = blocks[0].lines[0].y - blocks[1].lines[0].y;
        let gap2 = blocks[1].lines[0].y - blocks[2].lines[0].y;
        assert!((gap1 - gap2).abs() < 0.001);
        assert!((gap1 - (LEADING_PT + PARAGRAPH_SPACING_PT)).abs() < 0.001);
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let long = "word ".repeat(200);
        let blocks = layout_paragraphs(&[long]);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].lines.len() > 1);
        let width = max_chars_per_line();
        assert!(blocks[0].lines.iter().all(|l| l.text.chars().count() <= width));
    }

    #[test]
    fn test_wrap_splits_oversized_words() {
        let lines = wrap(&"x".repeat(25), 10);
        assert_eq!(lines, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_page_breaks() {
        let paragraphs: Vec<String> = (0..200).map(|i| format!("paragraph {}", i)).collect();
        let blocks = layout_paragraphs(&paragraphs);
        assert_eq!(blocks.len(), 200);
        let last = blocks.last().unwrap().lines[0].page;
        assert!(last >= 1);
        assert!(blocks
            .iter()
            .flat_map(|b| &b.lines)
            .all(|l| l.y >= MARGIN_PT && l.y <= PAGE_HEIGHT_PT - MARGIN_PT));
    }

    #[test]
    fn test_write_pdf_produces_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let paragraphs: Vec<String> = (0..120).map(|i| format!("Line {}", i)).collect();
        write_pdf(&path, &paragraphs, None).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_win_ansi_text_keeps_latin1_and_cp1252() {
        let (text, replaced) = win_ansi_text("caf\u{e9} na\u{ef}ve \u{20ac} \u{201c}q\u{201d}");
        assert_eq!(text, "caf\u{e9} na\u{ef}ve \u{20ac} \u{201c}q\u{201d}");
        assert_eq!(replaced, 0);
    }

    #[test]
    fn test_win_ansi_text_replaces_unencodable() {
        let (text, replaced) = win_ansi_text("\u{65e5}\u{672c}\u{8a9e} ok");
        assert_eq!(text, "??? ok");
        assert_eq!(replaced, 3);
    }

    #[test]
    fn test_cjk_paragraph_is_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cjk.pdf");
        let paragraphs = vec!["caf\u{e9}".to_string(), "\u{65e5}\u{672c}\u{8a9e}".to_string()];
        write_pdf(&path, &paragraphs, None).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));

        let (text, _) = win_ansi_text(&paragraphs[1]);
        let blocks = layout_paragraphs(&[text]);
        assert_eq!(blocks[0].lines[0].text, "???");
    }

    #[test]
    fn test_missing_font_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        let err = write_pdf(
            &path,
            &["x".to_string()],
            Some(Path::new("/nonexistent/DejaVuSans.ttf")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
        assert!(!path.exists());
    }
}
