//! PDF serialization of a recorded canvas using the standard Type 1 fonts.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::canvas::{Anchor, DrawOp, Page, PdfCanvas, Renderer};
use super::metrics::{Font, FontFace, POINTS_PER_INCH};
use crate::config::PAGE_COUNT_ALIAS;
use crate::error::{Result, RetroactionError};

const LOGO_NAME: &str = "Im1";

fn resource_name(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Glyph => "F3",
    }
}

/// Encode text for a face: WinAnsi for Helvetica, raw bytes for Symbol.
///
/// Returns the first character that has no code in the font's encoding.
pub fn encode_text(face: FontFace, text: &str) -> std::result::Result<Vec<u8>, char> {
    if face == FontFace::Glyph {
        return text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).map_err(|_| c))
            .collect();
    }

    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if !had_errors {
        return Ok(bytes.into_owned());
    }
    let mut buf = [0; 4];
    let offending = text
        .chars()
        .find(|c| WINDOWS_1252.encode(c.encode_utf8(&mut buf)).2)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Err(offending)
}

/// Write `canvas` to `path`.
///
/// Every page's text is encoded before the file is created, so an encoding
/// failure leaves no partial document behind.
pub(crate) fn write_pdf(canvas: &PdfCanvas, path: &Path) -> Result<()> {
    let total = canvas.pages().len().max(1);
    let (width, height) = canvas.page_size();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold, FontFace::Glyph] {
        let mut font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
        };
        if face != FontFace::Glyph {
            font.set("Encoding", "WinAnsiEncoding");
        }
        fonts.set(resource_name(face), doc.add_object(font));
    }

    let mut resources = dictionary! { "Font" => fonts };
    if let Some(logo) = canvas.logo_image() {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(logo.width),
                "Height" => i64::from(logo.height),
                "ColorSpace" => logo.color_space(),
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            logo.data().to_vec(),
        )
        .with_compression(false);
        let image_id = doc.add_object(image);
        resources.set("XObject", dictionary! { LOGO_NAME => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, page) in canvas.pages().iter().enumerate() {
        let operations = page_operations(page, height, total, canvas.border_width())
            .map_err(|character| RetroactionError::Encoding {
                path: path.to_path_buf(),
                character,
            })?;
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        tracing::trace!(page = index + 1, "Serialized page");
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                points(width).into(),
                points(height).into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("retroaction"),
        "CreationDate" => Object::string_literal(created),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    write_atomically(path, &buffer)
}

fn points(inches: f64) -> Object {
    Object::Real((inches * POINTS_PER_INCH) as f32)
}

/// Build the content stream of one page, resolving the page-count alias.
fn page_operations(
    page: &Page,
    page_height: f64,
    total: usize,
    border_width: f64,
) -> std::result::Result<Vec<Operation>, char> {
    let total = total.to_string();
    let mut font: Option<Font> = None;
    let mut operations = vec![Operation::new("w", vec![points(border_width)])];

    for op in &page.ops {
        match op {
            DrawOp::SetFont(f) => font = Some(*f),
            DrawOp::Text {
                x,
                baseline,
                anchor,
                text,
            } => {
                let Some(font) = font else {
                    continue;
                };
                let text = text.replace(PAGE_COUNT_ALIAS, &total);
                let left = match anchor {
                    Anchor::Left => *x,
                    Anchor::Center => x - font.text_width(&text) / 2.0,
                    Anchor::Right => x - font.text_width(&text),
                };
                let bytes = encode_text(font.face, &text)?;
                operations.extend([
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![resource_name(font.face).into(), Object::Real(font.size as f32)],
                    ),
                    Operation::new("Td", vec![points(left), points(page_height - baseline)]),
                    Operation::new("Tj", vec![Object::String(bytes, StringFormat::Literal)]),
                    Operation::new("ET", vec![]),
                ]);
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
            } => {
                operations.push(Operation::new(
                    "re",
                    vec![
                        points(*x),
                        points(page_height - y - height),
                        points(*width),
                        points(*height),
                    ],
                ));
                operations.push(Operation::new("S", vec![]));
            }
            DrawOp::Logo {
                x,
                y,
                width,
                height,
            } => {
                operations.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            points(*width),
                            0.into(),
                            0.into(),
                            points(*height),
                            points(*x),
                            points(page_height - y - height),
                        ],
                    ),
                    Operation::new("Do", vec![LOGO_NAME.into()]),
                    Operation::new("Q", vec![]),
                ]);
            }
        }
    }
    Ok(operations)
}

/// Write to a temp file first, then sync and rename into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    if let Err(err) = fs::rename(&temp_file, path) {
        let _ = fs::remove_file(&temp_file);
        return Err(err.into());
    }
    Ok(())
}
