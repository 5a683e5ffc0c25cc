//! Document layout: font metrics, the recording canvas, PDF output and the
//! feedback document engine.

mod canvas;
mod document;
mod logo;
mod metrics;
mod pdf;

pub use canvas::{Anchor, DrawOp, Page, PdfCanvas, Renderer};
pub use document::{
    write_feedback_document, DocumentOutcome, FeedbackDocument, LayoutCursor, PageState,
};
pub use logo::Logo;
pub use metrics::{parse_markup, wrap_runs, wrap_text, Font, FontFace, Line, Run};
pub use pdf::encode_text;
