//! Document layout engine: places one subject's entries on paginated pages.
//!
//! Fixed-value entries are drawn as a title cell and a value cell side by
//! side. Both cells are wrapped independently, then drawn with the same
//! height so their borders line up. Free-text entries are drawn as a
//! bordered title block above a full-width paragraph, which may continue on
//! the next page. A pair is never split across pages: before anything is
//! placed, the engine checks the remaining height and starts a new page when
//! the entry would not fit.

use std::path::{Path, PathBuf};

use super::canvas::{Anchor, PdfCanvas, Renderer};
use super::logo::Logo;
use super::metrics::{parse_markup, wrap_runs, Font, FontFace, Line, Run};
use crate::config::{
    FeedbackConfig, Labels, PageLayout, BLANK_VALUE, CHECKMARK_GLYPH, PAGE_COUNT_ALIAS,
};
use crate::error::Result;
use crate::types::{CriterionEntry, EntryKind, SubjectRecord};

/// Whether the engine has created its first page yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NoPage,
    OnPage,
}

/// Running position on the current page, in inches from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: f64,
    pub y: f64,
    /// Height left before the page-break trigger.
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellAlign {
    Left,
    Center,
}

/// Lines of a title/value pair drawn on a single page.
struct PairCells<'l> {
    title: &'l [Line],
    value: &'l [Line],
    checkmark: bool,
    bordered: bool,
}

/// Lays out feedback entries on a `Renderer`.
pub struct FeedbackDocument<'a, R: Renderer> {
    renderer: R,
    layout: &'a PageLayout,
    title: String,
    state: PageState,
    cursor: LayoutCursor,
}

impl<'a, R: Renderer> FeedbackDocument<'a, R> {
    pub fn new(renderer: R, layout: &'a PageLayout, title: &str) -> Self {
        Self {
            renderer,
            layout,
            title: title.replace("**", ""),
            state: PageState::NoPage,
            cursor: LayoutCursor {
                x: layout.margin_left,
                y: 0.0,
                remaining: 0.0,
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.state
    }

    #[must_use]
    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn body_font(&self) -> Font {
        Font::new(FontFace::Regular, self.layout.body_font_size)
    }

    fn content_top(&self) -> f64 {
        self.layout.margin_top + self.layout.header_height
    }

    fn move_to(&mut self, y: f64) {
        self.cursor.x = self.layout.margin_left;
        self.cursor.y = y;
        self.cursor.remaining = self.layout.page_break_trigger() - y;
    }

    /// Close the current page (footer) and open a new one (header).
    pub fn start_page(&mut self) {
        if self.state == PageState::OnPage {
            self.draw_footer();
        }
        self.renderer.add_page();
        self.state = PageState::OnPage;
        self.draw_header();
        let top = self.content_top();
        self.move_to(top);
        tracing::debug!(page = self.renderer.page_no(), "Started page");
    }

    /// Whether a block of `height` would cross the page-break trigger.
    #[must_use]
    pub fn will_page_break(&self, height: f64) -> bool {
        self.cursor.y + height > self.layout.page_break_trigger()
    }

    /// Start a page when none exists or when `height` does not fit.
    ///
    /// A block taller than a whole page only needs to start at the top of
    /// a fresh page.
    fn ensure_room(&mut self, height: f64) {
        let needed = height.min(self.layout.usable_height());
        let at_top = self.cursor.y <= self.content_top();
        match self.state {
            PageState::NoPage => self.start_page(),
            PageState::OnPage if !at_top && self.will_page_break(needed) => self.start_page(),
            PageState::OnPage => {}
        }
    }

    fn draw_header(&mut self) {
        let layout = self.layout;
        self.renderer.logo(0.0, 0.0, layout.logo_width);

        let previous = self.renderer.font();
        let font = Font::new(FontFace::Bold, layout.header_font_size);
        self.renderer.set_font(font);
        let center = layout.margin_left + layout.header_indent + layout.header_title_width / 2.0;
        let baseline = baseline(layout.margin_top, layout.header_height, font);
        self.renderer
            .text(center, baseline, Anchor::Center, &self.title);
        self.renderer.set_font(previous);
    }

    fn draw_footer(&mut self) {
        let layout = self.layout;
        let previous = self.renderer.font();
        let font = Font::new(FontFace::Bold, layout.footer_font_size);
        self.renderer.set_font(font);

        let top = layout.page_height - layout.footer_offset;
        let right = layout.margin_left + layout.content_width() - layout.cell_padding;
        let text = format!("Page {} / {PAGE_COUNT_ALIAS}", self.renderer.page_no());
        self.renderer
            .text(right, baseline(top, layout.line_height, font), Anchor::Right, &text);
        self.renderer.set_font(previous);
    }

    /// Draw wrapped lines inside a cell whose text block starts at `top`.
    fn draw_lines(&mut self, lines: &[Line], x: f64, width: f64, top: f64, align: CellAlign) {
        let size = self.layout.body_font_size;
        let line_height = self.layout.line_height;

        for (i, line) in lines.iter().enumerate() {
            let mut pen = match align {
                CellAlign::Left => x + self.layout.cell_padding,
                CellAlign::Center => x + (width - line.width) / 2.0,
            };
            let line_top = top + i as f64 * line_height;
            for run in &line.runs {
                let font = Font::new(run.face, size);
                if self.renderer.font() != font {
                    self.renderer.set_font(font);
                }
                self.renderer
                    .text(pen, baseline(line_top, line_height, font), Anchor::Left, &run.text);
                pen += font.text_width(&run.text);
            }
        }

        let body = self.body_font();
        if self.renderer.font() != body {
            self.renderer.set_font(body);
        }
    }

    fn wrap(&self, text: &str, width: f64) -> Vec<Line> {
        wrap_runs(
            &parse_markup(text),
            self.layout.body_font_size,
            width - 2.0 * self.layout.cell_padding,
        )
    }

    /// Place a title cell and a value cell side by side.
    ///
    /// The value cell is drawn with the title's measured height, grown only
    /// when the value itself needs more lines, so both borders always match.
    /// A pair taller than a whole page starts on a fresh page and continues
    /// on the following ones; each page's part keeps both bordered cells.
    pub fn add_fixed_entry(&mut self, entry: &CriterionEntry) {
        let layout = self.layout;
        let title_lines = self.wrap(&entry.label, layout.title_width);

        let checkmark = entry.is_checkmark();
        let value_lines = if checkmark {
            Vec::new()
        } else {
            let font = self.body_font();
            wrap_runs(
                &[Run::new(entry.value.as_str(), font.face)],
                font.size,
                layout.value_width - 2.0 * layout.cell_padding,
            )
        };
        let rows = title_lines.len().max(value_lines.len()).max(1);
        let height = rows as f64 * layout.line_height;

        self.ensure_room(height.max(2.0 * layout.line_height));
        if rows > self.rows_left() {
            tracing::warn!(
                label = %entry.label,
                lines = rows,
                "Criterion taller than a page, continuing on the next page"
            );
        }

        let mut first = 0;
        while first < rows {
            if first > 0 {
                self.start_page();
            }
            let last = (first + self.rows_left()).min(rows);
            let cells = PairCells {
                title: clamp_slice(&title_lines, first, last),
                value: clamp_slice(&value_lines, first, last),
                checkmark: checkmark && first == 0,
                bordered: !entry.is_spacer(),
            };
            self.draw_pair(&cells);
            first = last;
        }
    }

    /// Whole lines that still fit above the page-break trigger (at least one).
    fn rows_left(&self) -> usize {
        let rows = ((self.cursor.remaining + 1e-9) / self.layout.line_height).floor();
        if rows >= 1.0 {
            rows as usize
        } else {
            1
        }
    }

    /// Draw one page's part of a pair at the cursor and advance past it.
    fn draw_pair(&mut self, cells: &PairCells<'_>) {
        let layout = self.layout;
        let rows = cells.title.len().max(cells.value.len()).max(1);
        let height = rows as f64 * layout.line_height;
        let (x, y) = (self.cursor.x, self.cursor.y);
        let value_x = x + layout.title_width;

        if cells.bordered {
            self.renderer.rect(x, y, layout.title_width, height);
        }
        self.draw_lines(cells.title, x, layout.title_width, y, CellAlign::Left);

        if cells.bordered {
            self.renderer.rect(value_x, y, layout.value_width, height);
        }
        if cells.checkmark {
            let glyph = Font::new(FontFace::Glyph, layout.checkmark_font_size);
            self.renderer.set_font(glyph);
            self.renderer.text(
                value_x + layout.value_width / 2.0,
                baseline(y, height, glyph),
                Anchor::Center,
                &CHECKMARK_GLYPH.to_string(),
            );
            let body = self.body_font();
            self.renderer.set_font(body);
        } else {
            let block = cells.value.len() as f64 * layout.line_height;
            let top = y + (height - block) / 2.0;
            self.draw_lines(cells.value, value_x, layout.value_width, top, CellAlign::Center);
        }

        tracing::debug!(height, page = self.renderer.page_no(), "Placed pair");
        self.move_to(y + height.max(layout.row_nudge));
    }

    /// Place a bordered title block above a full-width paragraph.
    ///
    /// The paragraph continues on following pages when it does not fit; each
    /// page's part gets its own border.
    pub fn add_free_text(&mut self, title: &str, text: &str) {
        let layout = self.layout;
        let width = layout.content_width();
        let title_lines = self.wrap(title, width);
        let title_height = title_lines.len() as f64 * layout.line_height;
        let text = if text.trim().is_empty() { BLANK_VALUE } else { text };
        let body_lines = self.wrap(text, width);

        self.ensure_room((title_height + layout.line_height).max(2.0 * layout.line_height));
        let (x, y) = (self.cursor.x, self.cursor.y);
        self.renderer.rect(x, y, width, title_height);
        self.draw_lines(&title_lines, x, width, y, CellAlign::Left);
        self.move_to(y + title_height);

        let mut segment_top = self.cursor.y;
        for line in &body_lines {
            if self.will_page_break(layout.line_height) && self.cursor.y > segment_top {
                self.renderer
                    .rect(x, segment_top, width, self.cursor.y - segment_top);
                self.start_page();
                segment_top = self.cursor.y;
            }
            let top = self.cursor.y;
            self.draw_lines(std::slice::from_ref(line), x, width, top, CellAlign::Left);
            self.move_to(top + layout.line_height);
        }
        self.renderer
            .rect(x, segment_top, width, self.cursor.y - segment_top);

        tracing::debug!(title, lines = body_lines.len(), page = self.renderer.page_no(), "Placed text block");
        let y = self.cursor.y;
        self.move_to(y + layout.row_nudge);
    }

    pub fn add_entry(&mut self, entry: &CriterionEntry) {
        match entry.kind {
            EntryKind::FixedValue => self.add_fixed_entry(entry),
            EntryKind::FreeText => self.add_free_text(&entry.label, &entry.value),
        }
    }

    /// Lay out a whole record: identity and score, comments, then criteria.
    pub fn render_record(&mut self, record: &SubjectRecord, labels: &Labels) {
        if self.state == PageState::NoPage {
            self.start_page();
        }
        self.add_fixed_entry(&CriterionEntry::fixed(&labels.identifier, &record.identifier));
        self.add_fixed_entry(&CriterionEntry::fixed(&labels.surname, &record.surname));
        self.add_fixed_entry(&CriterionEntry::fixed(&labels.given_name, &record.given_name));
        self.add_fixed_entry(&CriterionEntry::fixed(&labels.score, &record.score_display()));
        self.add_free_text(&labels.comments, &record.comments);

        for entry in &record.criteria {
            self.add_entry(entry);
        }
    }

    /// Close the last page and hand back the renderer.
    pub fn finish(mut self) -> R {
        if self.state == PageState::NoPage {
            self.start_page();
        }
        self.draw_footer();
        self.renderer
    }
}

/// `lines[first..last]`, clamped to the available lines.
fn clamp_slice(lines: &[Line], first: usize, last: usize) -> &[Line] {
    let end = last.min(lines.len());
    lines.get(first.min(end)..end).unwrap_or_default()
}

/// Baseline of a single text line vertically centered in a box.
fn baseline(top: f64, height: f64, font: Font) -> f64 {
    top + height / 2.0 + 0.3 * font.size_in_inches()
}

/// Result of writing one subject's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Written(PathBuf),
    /// The document could not be encoded; nothing was written.
    Skipped { path: PathBuf, reason: String },
}

/// Lay out `record` and write it as a PDF at `path`.
///
/// Encoding failures are logged and reported as `DocumentOutcome::Skipped`;
/// every other failure is returned.
pub fn write_feedback_document(
    record: &SubjectRecord,
    title: &str,
    config: &FeedbackConfig,
    logo: Option<&Logo>,
    path: &Path,
) -> Result<DocumentOutcome> {
    let layout = &config.layout;
    let canvas = PdfCanvas::new(
        layout.page_width,
        layout.page_height,
        Font::new(FontFace::Regular, layout.body_font_size),
    )
    .with_border_width(layout.border_width)
    .with_logo(logo.cloned());

    let mut document = FeedbackDocument::new(canvas, layout, title);
    document.render_record(record, &config.labels);
    let canvas = document.finish();

    match canvas.save(path) {
        Ok(()) => {
            tracing::info!(
                path = %path.display(),
                pages = canvas.pages().len(),
                "Wrote feedback document"
            );
            Ok(DocumentOutcome::Written(path.to_path_buf()))
        }
        Err(err) if err.is_recoverable() => {
            tracing::warn!(path = %path.display(), error = %err, "Skipping document");
            Ok(DocumentOutcome::Skipped {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
        Err(err) => Err(err),
    }
}
