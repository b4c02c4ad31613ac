//! PDF output using lopdf.
//!
//! JPEG data is embedded as-is (`DCTDecode`). PNG data is decoded and stored
//! as Flate-compressed samples, with a soft mask when it carries
//! transparency. Text uses the standard Helvetica faces.

use super::emitter::{PageSink, TextStyle};
use super::metrics::FontMetrics;
use crate::detect::{jpeg_component_count, SourceFormat};
use crate::error::{Error, Result};
use crate::layout::Rect;
use crate::raster::PreparedImage;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Distance between wrapped baselines, as a multiple of the font size.
const LINE_SPACING: f64 = 1.2;

/// Millimetres to PDF points.
fn pt(mm: f64) -> f32 {
    (mm * 72.0 / 25.4) as f32
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Encode text for a WinAnsi Type1 font; characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

struct PageBuilder {
    width: f64,
    height: f64,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// A [`PageSink`] that builds a PDF document in memory.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    font_regular: ObjectId,
    font_bold: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<PageBuilder>,
    images: HashMap<String, (String, ObjectId)>,
    title: String,
}

impl PdfWriter {
    /// Create an empty PDF with the given document title.
    pub fn new(title: impl Into<String>) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            pages_id,
            font_regular,
            font_bold,
            page_ids: Vec::new(),
            current: None,
            images: HashMap::new(),
            title: title.into(),
        }
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current.is_some())
    }

    fn page(&mut self) -> Result<&mut PageBuilder> {
        self.current
            .as_mut()
            .ok_or_else(|| Error::Render("no page has been started".to_string()))
    }

    fn flush_page(&mut self) -> Result<()> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };

        let content = Content {
            operations: page.operations,
        }
        .encode()?;
        let content_id = self.doc.add_object(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            deflate(&content)?,
        ));

        let resources = dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => self.font_regular,
                FONT_BOLD => self.font_bold,
            },
            "XObject" => page.xobjects,
        };
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            pt(page.width).into(),
            pt(page.height).into(),
        ];
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box,
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn embed(&mut self, key: &str, image: &PreparedImage) -> Result<(String, ObjectId)> {
        if let Some(existing) = self.images.get(key) {
            return Ok(existing.clone());
        }

        let id = match image.format {
            SourceFormat::Jpeg => self.embed_jpeg(image)?,
            SourceFormat::Png => self.embed_png(image)?,
            SourceFormat::Other => {
                return Err(Error::UnsupportedImage(format!(
                    "'{}' must be PNG or JPEG to embed",
                    key
                )))
            }
        };
        let name = format!("Im{}", self.images.len() + 1);
        self.images.insert(key.to_string(), (name.clone(), id));
        Ok((name, id))
    }

    fn embed_jpeg(&mut self, image: &PreparedImage) -> Result<ObjectId> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        match jpeg_component_count(&image.data)? {
            1 => dict.set("ColorSpace", "DeviceGray"),
            3 => dict.set("ColorSpace", "DeviceRGB"),
            4 => {
                dict.set("ColorSpace", "DeviceCMYK");
                // Adobe CMYK JPEGs store inverted samples
                let decode: Vec<Object> =
                    [1, 0, 1, 0, 1, 0, 1, 0].iter().map(|&v| v.into()).collect();
                dict.set("Decode", decode);
            }
            n => {
                return Err(Error::UnsupportedImage(format!(
                    "JPEG with {} color components",
                    n
                )))
            }
        }
        Ok(self.doc.add_object(Stream::new(dict, image.data.clone())))
    }

    fn embed_png(&mut self, image: &PreparedImage) -> Result<ObjectId> {
        let decoded =
            image::load_from_memory_with_format(&image.data, image::ImageFormat::Png)
                .map_err(|e| Error::ImageDecode(e.to_string()))?;

        let (samples, color_space) = match &decoded {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => {
                (decoded.to_luma8().into_raw(), "DeviceGray")
            }
            _ => (decoded.to_rgb8().into_raw(), "DeviceRGB"),
        };

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };

        if decoded.color().has_alpha() {
            let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
            if alpha.iter().any(|&a| a < u8::MAX) {
                let mask_id = self.doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => i64::from(image.width),
                        "Height" => i64::from(image.height),
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                        "Filter" => "FlateDecode",
                    },
                    deflate(&alpha)?,
                ));
                dict.set("SMask", mask_id);
            }
        }

        Ok(self.doc.add_object(Stream::new(dict, deflate(&samples)?)))
    }

    /// Close the last page and assemble the document catalog.
    pub fn finish(mut self) -> Result<Document> {
        self.flush_page()?;

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(win_ansi(&self.title)),
            "Producer" => Object::string_literal(format!("gigsheets {}", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(created),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        Ok(self.doc)
    }

    /// Finish the document and serialize it.
    pub fn write_to<W: Write>(self, writer: &mut W) -> Result<()> {
        let mut doc = self.finish()?;
        doc.save_to(writer)?;
        Ok(())
    }

    /// Finish the document and write it to `path`.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl PageSink for PdfWriter {
    fn begin_page(&mut self, width: f64, height: f64) -> Result<()> {
        self.flush_page()?;
        self.current = Some(PageBuilder {
            width,
            height,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    fn draw_image(&mut self, key: &str, image: &PreparedImage, rect: Rect) -> Result<()> {
        let (name, id) = self.embed(key, image)?;
        let page = self.page()?;
        let bottom = page.height - rect.bottom();

        page.xobjects.set(name.as_bytes().to_vec(), id);
        page.operations.push(Operation::new("q", vec![]));
        page.operations.push(Operation::new(
            "cm",
            vec![
                pt(rect.width).into(),
                0.into(),
                0.into(),
                pt(rect.height).into(),
                pt(rect.x).into(),
                pt(bottom).into(),
            ],
        ));
        page.operations
            .push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        page.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, rect: Rect, style: TextStyle) -> Result<()> {
        let page = self.page()?;
        let font = if style.bold { FONT_BOLD } else { FONT_REGULAR };
        let metrics = FontMetrics::helvetica(style.bold, style.size);
        let lines = metrics.wrap(&win_ansi(text), pt(rect.width));

        // Lines are centered as a block; a single line sits mid-cell
        let font_mm = f64::from(style.size) * 25.4 / 72.0;
        let leading = LINE_SPACING * font_mm;
        let top = rect.y + (rect.height - leading * lines.len() as f64) / 2.0;
        let [r, g, b] = style.color.map(|c| f32::from(c) / 255.0);

        page.operations.push(Operation::new("BT", vec![]));
        page.operations
            .push(Operation::new("Tf", vec![font.into(), style.size.into()]));
        page.operations
            .push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        for (i, line) in lines.into_iter().enumerate() {
            let baseline = top + leading * (i as f64 + 0.5) + 0.3 * font_mm;
            page.operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    pt(rect.x).into(),
                    pt(page.height - baseline).into(),
                ],
            ));
            page.operations
                .push(Operation::new("Tj", vec![Object::string_literal(line)]));
        }
        page.operations.push(Operation::new("ET", vec![]));
        Ok(())
    }
}
