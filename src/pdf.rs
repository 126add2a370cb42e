//! PDF document assembly.
//!
//! Drives the page layout for one report: a grey title band, a subtitle row
//! with the issue count (left) and generation timestamp (right), then one
//! rendered block per issue separated by a light-grey horizontal rule.
//! Pages are A4 portrait with a simple top-down cursor; builtin Helvetica
//! keeps the output free of font files.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use chrono::Local;
use printpdf::*;
use serde::Serialize;
use tracing::{error, info};

use crate::config::RenderOptions;
use crate::issue::Issue;
use crate::partition::partition;
use crate::render::{render_issue, FieldBlock, FieldKind};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;

const TITLE_SIZE_PT: f32 = 16.0;
const BODY_SIZE_PT: f32 = 9.0;
const TITLE_BAND_MM: f32 = 12.0;
const LINE_STEP_MM: f32 = 4.2;

/// Wrap width in characters for 9pt Helvetica across the printable area.
const WRAP_COLS: usize = 100;

/// An output file could not be produced. Fatal for the project being
/// exported; sibling files already written stay on disk.
#[derive(Debug)]
pub struct WriteError {
    pub file: PathBuf,
    pub source: std::io::Error,
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to write {}: {}", self.file.display(), self.source)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// One written output file, for the export report.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub issue_count: usize,
}

/// Computes partitions over the full issue list and emits one PDF per
/// partition. A single partition writes `{project}.pdf`; multiple write
/// `{project}_{n}.pdf` with `n` starting at 1. The first write failure aborts
/// the remaining partitions of this project.
pub fn build_partitioned_documents(
    project: &str,
    issues: &[Issue],
    selection: &[FieldKind],
    opts: &RenderOptions,
    issues_per_pdf: usize,
    output_dir: &Path,
) -> Result<Vec<FileReport>, WriteError> {
    let ranges = partition(issues.len(), issues_per_pdf);
    let single = ranges.len() == 1;
    info!(
        project = project,
        issues = issues.len(),
        documents = ranges.len(),
        "Building documents for project"
    );

    let mut reports = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.into_iter().enumerate() {
        let file_name = if single {
            format!("{project}.pdf")
        } else {
            format!("{project}_{}.pdf", index + 1)
        };
        let path = output_dir.join(&file_name);
        let chunk = &issues[range];
        build_document(&path, project, chunk, selection, opts)?;
        reports.push(FileReport {
            file_name,
            issue_count: chunk.len(),
        });
    }
    Ok(reports)
}

/// Renders one PDF containing a title block, a summary subtitle and one
/// rendered block per issue in input order.
pub fn build_document(
    path: &Path,
    project: &str,
    issues: &[Issue],
    selection: &[FieldKind],
    opts: &RenderOptions,
) -> Result<(), WriteError> {
    let title = format!("{project} Issues");
    let mut composer = PageComposer::new();

    composer.title_block(&title);
    composer.subtitle(
        &format!("Total of issues: {}", issues.len()),
        &format!("Created at: {}", Local::now().format(&opts.datetime_format)),
    );

    for issue in issues {
        let blocks = render_issue(issue, selection, opts);
        composer.issue_block(&blocks);
        composer.separator();
    }

    let mut doc = PdfDocument::new(&title);
    let bytes = doc
        .with_pages(composer.finish())
        .save(&PdfSaveOptions::default(), &mut Vec::new());

    fs::write(path, bytes).map_err(|e| {
        error!(file = %path.display(), error = %e, "Failed to write PDF");
        WriteError {
            file: path.to_path_buf(),
            source: e,
        }
    })?;
    info!(file = %path.display(), issues = issues.len(), "Wrote PDF document");
    Ok(())
}

struct Span {
    text: String,
    bold: bool,
    size: f32,
}

impl Span {
    fn bold(text: impl Into<String>, size: f32) -> Self {
        Span {
            text: text.into(),
            bold: true,
            size,
        }
    }

    fn regular(text: impl Into<String>, size: f32) -> Self {
        Span {
            text: text.into(),
            bold: false,
            size,
        }
    }
}

/// Accumulates drawing ops page by page, breaking to a fresh page whenever
/// the cursor would run past the bottom margin.
struct PageComposer {
    finished: Vec<Vec<Op>>,
    ops: Vec<Op>,
    cursor_y: f32,
}

impl PageComposer {
    fn new() -> Self {
        PageComposer {
            finished: Vec::new(),
            ops: Vec::new(),
            cursor_y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn finish(mut self) -> Vec<PdfPage> {
        if !self.ops.is_empty() || self.finished.is_empty() {
            self.finished.push(mem::take(&mut self.ops));
        }
        self.finished
            .into_iter()
            .map(|ops| PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops))
            .collect()
    }

    fn break_page(&mut self) {
        self.finished.push(mem::take(&mut self.ops));
        self.cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn ensure_room(&mut self, needed_mm: f32) {
        if self.cursor_y - needed_mm < MARGIN_MM && !self.ops.is_empty() {
            self.break_page();
        }
    }

    fn title_block(&mut self, title: &str) {
        let band_top = self.cursor_y;
        let band_bottom = band_top - TITLE_BAND_MM;

        // Grey band behind the centered title.
        self.ops.push(Op::SetFillColor { col: grey(0.87) });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        line_point(MARGIN_MM, band_top),
                        line_point(PAGE_WIDTH_MM - MARGIN_MM, band_top),
                        line_point(PAGE_WIDTH_MM - MARGIN_MM, band_bottom),
                        line_point(MARGIN_MM, band_bottom),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });

        let x = (PAGE_WIDTH_MM - text_width_mm(title, TITLE_SIZE_PT)) / 2.0;
        self.cursor_y = band_bottom + 3.5;
        self.write_spans(x.max(MARGIN_MM), &[Span::bold(title, TITLE_SIZE_PT)]);
        self.cursor_y = band_bottom - 6.0;
    }

    fn subtitle(&mut self, left: &str, right: &str) {
        let y = self.cursor_y;
        self.write_spans(MARGIN_MM, &[Span::regular(left, BODY_SIZE_PT)]);
        // Right-aligned on the same baseline.
        self.cursor_y = y;
        let x = PAGE_WIDTH_MM - MARGIN_MM - text_width_mm(right, BODY_SIZE_PT);
        self.write_spans(x.max(MARGIN_MM), &[Span::regular(right, BODY_SIZE_PT)]);
        self.cursor_y -= LINE_STEP_MM;
    }

    fn issue_block(&mut self, blocks: &[FieldBlock]) {
        for block in blocks {
            let label = format!("{}: ", block.label);
            let width = WRAP_COLS.saturating_sub(label.chars().count()).max(20);

            let mut value_lines = block.value.split('\n');
            let first = value_lines.next().unwrap_or_default();

            let mut chunks = wrap(first, width);
            let head = if chunks.is_empty() {
                String::new()
            } else {
                chunks.remove(0)
            };
            self.ensure_room(LINE_STEP_MM);
            self.write_spans(
                MARGIN_MM,
                &[
                    Span::bold(label, BODY_SIZE_PT),
                    Span::regular(head, BODY_SIZE_PT),
                ],
            );
            for chunk in chunks {
                self.ensure_room(LINE_STEP_MM);
                self.write_spans(MARGIN_MM, &[Span::regular(chunk, BODY_SIZE_PT)]);
            }

            // Remaining lines (comments) carry no label.
            for line in value_lines {
                for chunk in wrap(line, WRAP_COLS) {
                    self.ensure_room(LINE_STEP_MM);
                    self.write_spans(MARGIN_MM, &[Span::regular(chunk, BODY_SIZE_PT)]);
                }
            }
        }
    }

    fn separator(&mut self) {
        self.ensure_room(LINE_STEP_MM + 2.0);
        self.cursor_y -= 1.0;
        self.ops.push(Op::SetOutlineColor { col: grey(0.76) });
        self.ops.push(Op::SetOutlineThickness { pt: Pt(0.4) });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    line_point(MARGIN_MM, self.cursor_y),
                    line_point(PAGE_WIDTH_MM - MARGIN_MM, self.cursor_y),
                ],
                is_closed: false,
            },
        });
        self.cursor_y -= 3.0;
    }

    /// Writes one baseline of text; consecutive spans continue on the same
    /// line, so a bold label can be followed by a regular value.
    fn write_spans(&mut self, x_mm: f32, spans: &[Span]) {
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetFillColor { col: grey(0.0) });
        self.ops.push(Op::SetTextCursor {
            pos: Point::new(Mm(x_mm), Mm(self.cursor_y)),
        });
        for span in spans {
            if span.text.is_empty() {
                continue;
            }
            let font = if span.bold {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            self.ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(span.size),
                font,
            });
            self.ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(span.text.clone())],
                font,
            });
        }
        self.ops.push(Op::EndTextSection);
        self.cursor_y -= LINE_STEP_MM;
    }
}

fn grey(level: f32) -> Color {
    Color::Rgb(Rgb {
        r: level,
        g: level,
        b: level,
        icc_profile: None,
    })
}

fn line_point(x_mm: f32, y_mm: f32) -> LinePoint {
    LinePoint {
        p: Point::new(Mm(x_mm), Mm(y_mm)),
        bezier: false,
    }
}

/// Rough width estimate for Helvetica; close enough for centering and
/// right-alignment of short header strings.
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * 0.5 * 0.352_778
}

/// Greedy word wrap at `cols` characters; words longer than a line are
/// hard-split. Empty input yields no lines.
fn wrap(text: &str, cols: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > cols {
            lines.push(mem::take(&mut current));
            current_len = 0;
        }
        if word_len > cols {
            // Hard-split oversized words across lines.
            let mut chars = word.chars().peekable();
            while chars.peek().is_some() {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                let take = cols - current_len;
                let piece: String = chars.by_ref().take(take).collect();
                current_len += piece.chars().count();
                current.push_str(&piece);
                if chars.peek().is_some() {
                    lines.push(mem::take(&mut current));
                    current_len = 0;
                }
            }
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        // Whitespace-only input still occupies one (blank) line.
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap("alpha beta gamma delta", 11),
            vec!["alpha beta", "gamma delta"]
        );
    }

    #[test]
    fn wrap_hard_splits_oversized_words() {
        let lines = wrap("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_of_empty_text_is_empty() {
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn wrapped_lines_respect_the_column_limit() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        for cols in 5..30 {
            for line in wrap(text, cols) {
                assert!(line.chars().count() <= cols, "{line:?} exceeds {cols}");
            }
        }
    }
}
