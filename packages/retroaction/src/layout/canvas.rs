//! Drawing surface used by the layout engine.
//!
//! Coordinates are in inches from the top-left corner of the page. The
//! canvas records drawing operations per page; nothing is serialized until
//! `PdfCanvas::save` is called, which is when the total page count becomes
//! known.

use std::path::Path;

use super::logo::Logo;
use super::metrics::Font;
use crate::error::Result;

/// Horizontal alignment of a text run relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The run starts at `x`.
    Left,
    /// The run is centered on `x`.
    Center,
    /// The run ends at `x`.
    Right,
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SetFont(Font),
    Text {
        x: f64,
        baseline: f64,
        anchor: Anchor,
        text: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Logo {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Operations drawn on one page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Primitive drawing operations the layout engine relies on.
pub trait Renderer {
    /// Page size as (width, height) in inches.
    fn page_size(&self) -> (f64, f64);

    /// Start a new page; subsequent drawing goes to it.
    fn add_page(&mut self);

    /// 1-based number of the current page, 0 before the first page.
    fn page_no(&self) -> usize;

    fn set_font(&mut self, font: Font);

    fn font(&self) -> Font;

    fn text(&mut self, x: f64, baseline: f64, anchor: Anchor, text: &str);

    /// Stroke a rectangle outline.
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw the header logo scaled to `width`; returns the drawn height,
    /// 0 when no logo is configured.
    fn logo(&mut self, x: f64, y: f64, width: f64) -> f64;
}

/// In-memory recording of a document, flushed to PDF by `save`.
#[derive(Debug, Clone)]
pub struct PdfCanvas {
    width: f64,
    height: f64,
    border_width: f64,
    font: Font,
    logo: Option<Logo>,
    pages: Vec<Page>,
}

impl PdfCanvas {
    #[must_use]
    pub fn new(width: f64, height: f64, font: Font) -> Self {
        Self {
            width,
            height,
            border_width: 0.0,
            font,
            logo: None,
            pages: Vec::new(),
        }
    }

    /// Line width of rectangle outlines, in inches.
    #[must_use]
    pub fn with_border_width(mut self, border_width: f64) -> Self {
        self.border_width = border_width;
        self
    }

    #[must_use]
    pub fn with_logo(mut self, logo: Option<Logo>) -> Self {
        self.logo = logo;
        self
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn logo_image(&self) -> Option<&Logo> {
        self.logo.as_ref()
    }

    pub(crate) fn border_width(&self) -> f64 {
        self.border_width
    }

    /// Serialize every recorded page to a PDF file at `path`.
    ///
    /// Fails with `RetroactionError::Encoding` before anything is written
    /// when a text run cannot be encoded in its font.
    pub fn save(&self, path: &Path) -> Result<()> {
        super::pdf::write_pdf(self, path)
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

impl Renderer for PdfCanvas {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
        // Each page starts with an explicit font so pages are self-contained.
        let font = self.font;
        self.push(DrawOp::SetFont(font));
    }

    fn page_no(&self) -> usize {
        self.pages.len()
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
        self.push(DrawOp::SetFont(font));
    }

    fn font(&self) -> Font {
        self.font
    }

    fn text(&mut self, x: f64, baseline: f64, anchor: Anchor, text: &str) {
        self.push(DrawOp::Text {
            x,
            baseline,
            anchor,
            text: text.to_string(),
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn logo(&mut self, x: f64, y: f64, width: f64) -> f64 {
        let Some(logo) = &self.logo else {
            return 0.0;
        };
        let height = logo.height_for_width(width);
        self.push(DrawOp::Logo {
            x,
            y,
            width,
            height,
        });
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::FontFace;

    fn canvas() -> PdfCanvas {
        PdfCanvas::new(8.5, 11.0, Font::new(FontFace::Regular, 12.0))
    }

    #[test]
    fn test_pages_start_with_current_font() {
        let mut c = canvas();
        c.add_page();
        c.set_font(Font::new(FontFace::Bold, 16.0));
        c.add_page();

        assert_eq!(c.page_no(), 2);
        assert_eq!(
            c.pages()[1].ops[0],
            DrawOp::SetFont(Font::new(FontFace::Bold, 16.0))
        );
    }

    #[test]
    fn test_logo_is_skipped_without_image() {
        let mut c = canvas();
        c.add_page();

        assert_eq!(c.logo(0.0, 0.0, 2.0), 0.0);
        assert_eq!(c.pages()[0].ops.len(), 1);
    }

    #[test]
    fn test_operations_are_recorded_in_order() {
        let mut c = canvas();
        c.add_page();
        c.rect(0.5, 1.0, 6.0, 0.3);
        c.text(0.54, 1.2, Anchor::Left, "Critère");

        let ops = &c.pages()[0].ops;
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[1], DrawOp::Rect { width, .. } if width == 6.0));
        assert!(matches!(&ops[2], DrawOp::Text { text, .. } if text == "Critère"));
    }
}
