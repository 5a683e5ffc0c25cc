//! Font metrics of the built-in PDF faces and proportional word wrapping.

use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_normalization::UnicodeNormalization;

/// Points per inch; layout works in inches, PDF in points.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Face of one of the standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    /// Symbol font, used for the checkmark glyph only.
    Glyph,
}

impl FontFace {
    /// PostScript name of the standard font.
    #[must_use]
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Glyph => "Symbol",
        }
    }
}

/// A face at a size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub face: FontFace,
    pub size: f64,
}

impl Font {
    #[must_use]
    pub fn new(face: FontFace, size: f64) -> Self {
        Self { face, size }
    }

    /// Width of `text` in inches.
    #[must_use]
    pub fn text_width(&self, text: &str) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(char_width(self.face, c))).sum();
        f64::from(units) / 1000.0 * self.size / POINTS_PER_INCH
    }

    /// Font size in inches.
    #[must_use]
    pub fn size_in_inches(&self) -> f64 {
        self.size / POINTS_PER_INCH
    }
}

/// Helvetica advance widths for U+0020..=U+007E, in thousandths of an em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advance widths for U+0020..=U+007E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, //
];

/// Advance width of `c` in thousandths of an em.
///
/// Accented Latin letters take the width of their base letter. Characters
/// the fonts cannot encode get an average width; they are rejected when the
/// document is written.
#[must_use]
pub fn char_width(face: FontFace, c: char) -> u16 {
    let table = match face {
        FontFace::Regular => &HELVETICA,
        FontFace::Bold => &HELVETICA_BOLD,
        FontFace::Glyph => return if c == crate::config::CHECKMARK_GLYPH { 549 } else { 500 },
    };

    if let Some(width) = ascii_width(table, c) {
        return width;
    }

    match c {
        '\u{a0}' => 278,
        'Æ' | 'Œ' | '—' | '…' | '‰' | '™' => 1000,
        'æ' => 889,
        'œ' => 944,
        'ß' => 611,
        'Ø' | 'Ð' => 778,
        'ø' => 611,
        'Þ' => 667,
        'ð' | 'þ' | '–' | '€' | '«' | '»' | '§' | '¶' => 556,
        '‘' | '’' | '‚' => 222,
        '“' | '”' | '„' => 333,
        '•' => 350,
        '°' => 400,
        '×' | '÷' | '±' | '¬' => 584,
        _ => c
            .nfd()
            .next()
            .filter(|base| *base != c)
            .and_then(|base| ascii_width(table, base))
            .unwrap_or(556),
    }
}

fn ascii_width(table: &[u16; 95], c: char) -> Option<u16> {
    let code = u32::from(c);
    if (0x20..=0x7e).contains(&code) {
        Some(table[(code - 0x20) as usize])
    } else {
        None
    }
}

/// A stretch of text drawn with a single face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub face: FontFace,
}

impl Run {
    #[must_use]
    pub fn new(text: impl Into<String>, face: FontFace) -> Self {
        Self {
            text: text.into(),
            face,
        }
    }
}

/// Split `**bold**` markup into runs. Unbalanced markers leave the tail bold.
///
/// # Examples
/// ```
/// use retroaction::layout::{parse_markup, FontFace, Run};
///
/// assert_eq!(
///     parse_markup("Critère **A**"),
///     vec![Run::new("Critère ", FontFace::Regular), Run::new("A", FontFace::Bold)]
/// );
/// ```
#[must_use]
pub fn parse_markup(text: &str) -> Vec<Run> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            let face = if i % 2 == 1 {
                FontFace::Bold
            } else {
                FontFace::Regular
            };
            Run::new(part, face)
        })
        .collect()
}

/// A word made of one or more runs, measured at a given size.
#[derive(Debug, Clone)]
struct Word {
    pieces: Vec<Run>,
    width: f64,
    whitespace: f64,
}

impl Fragment for Word {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

impl Word {
    fn new(pieces: Vec<Run>, size: f64) -> Self {
        let width = pieces
            .iter()
            .map(|run| Font::new(run.face, size).text_width(&run.text))
            .sum();
        let last_face = pieces.last().map_or(FontFace::Regular, |run| run.face);
        Self {
            pieces,
            width,
            whitespace: Font::new(last_face, size).text_width(" "),
        }
    }

    /// Break a word wider than `max_width` into chunks that fit.
    fn split_to_fit(self, max_width: f64, size: f64) -> Vec<Word> {
        if self.width <= max_width {
            return vec![self];
        }

        let mut chunks = Vec::new();
        let mut current: Vec<Run> = Vec::new();
        let mut current_width = 0.0;

        for run in self.pieces {
            let font = Font::new(run.face, size);
            for c in run.text.chars() {
                let w = font.text_width(c.encode_utf8(&mut [0; 4]));
                if current_width + w > max_width && current_width > 0.0 {
                    chunks.push(Word::new(std::mem::take(&mut current), size));
                    current_width = 0.0;
                }
                push_char(&mut current, c, run.face);
                current_width += w;
            }
        }
        if !current.is_empty() {
            chunks.push(Word::new(current, size));
        }
        chunks
    }
}

fn push_char(pieces: &mut Vec<Run>, c: char, face: FontFace) {
    match pieces.last_mut() {
        Some(last) if last.face == face => last.text.push(c),
        _ => pieces.push(Run::new(c.to_string(), face)),
    }
}

/// One wrapped line: runs to draw left to right, and its width in inches.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub runs: Vec<Run>,
    pub width: f64,
}

/// Wrap runs into lines no wider than `max_width` inches.
///
/// Explicit newlines start a new line; an empty paragraph still yields one
/// empty line, so a blank cell keeps one line of height.
#[must_use]
pub fn wrap_runs(runs: &[Run], size: f64, max_width: f64) -> Vec<Line> {
    let mut lines = Vec::new();
    for paragraph in split_paragraphs(runs) {
        let words: Vec<Word> = paragraph
            .into_iter()
            .map(|pieces| Word::new(pieces, size))
            .flat_map(|word| word.split_to_fit(max_width, size))
            .collect();

        if words.is_empty() {
            lines.push(Line {
                runs: Vec::new(),
                width: 0.0,
            });
            continue;
        }

        for line_words in wrap_first_fit(&words, &[max_width]) {
            lines.push(assemble_line(line_words));
        }
    }
    lines
}

/// Wrap plain text drawn with a single font.
#[must_use]
pub fn wrap_text(text: &str, font: Font, max_width: f64) -> Vec<Line> {
    wrap_runs(&[Run::new(text, font.face)], font.size, max_width)
}

/// Group characters into paragraphs (split on '\n') of words (split on ' ').
fn split_paragraphs(runs: &[Run]) -> Vec<Vec<Vec<Run>>> {
    let mut paragraphs = vec![Vec::new()];
    let mut word: Vec<Run> = Vec::new();

    for run in runs {
        for c in run.text.chars() {
            match c {
                ' ' | '\n' | '\r' => {
                    if !word.is_empty() {
                        if let Some(paragraph) = paragraphs.last_mut() {
                            paragraph.push(std::mem::take(&mut word));
                        }
                    }
                    if c == '\n' {
                        paragraphs.push(Vec::new());
                    }
                }
                _ => push_char(&mut word, c, run.face),
            }
        }
    }
    if !word.is_empty() {
        if let Some(paragraph) = paragraphs.last_mut() {
            paragraph.push(word);
        }
    }
    paragraphs
}

fn assemble_line(words: &[Word]) -> Line {
    let mut runs: Vec<Run> = Vec::new();
    let mut width = 0.0;

    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            let previous = &words[i - 1];
            width += previous.whitespace;
            let face = previous.pieces.last().map_or(FontFace::Regular, |r| r.face);
            push_char(&mut runs, ' ', face);
        }
        for piece in &word.pieces {
            for c in piece.text.chars() {
                push_char(&mut runs, c, piece.face);
            }
        }
        width += word.width;
    }

    Line { runs, width }
}
