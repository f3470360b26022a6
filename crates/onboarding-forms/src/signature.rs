//! Signature compositing
//!
//! Places a drawn signature (base64 PNG) inside a form's signature rectangle
//! and prints the signing date next to it.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use flate2::{write::ZlibEncoder, Compression};
use lopdf::content::Operation;
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, info};

use crate::actions::StampAction;
use crate::dates::{format_us, resolve_signature_date, DatePolicy};
use crate::error::FormError;
use crate::page::{add_resource, append_operations, check_upload, page_id};
use crate::registry::{FieldKey, FieldRegistry, FormType, Rect};
use crate::stamp::{stamp, StampStyle};

/// Resource name of the composited signature image
const SIGNATURE_XOBJECT: &str = "ImOnbSig";

/// Decoded signature pixels: 8-bit RGB plus a matching alpha plane
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Vec<u8>,
}

impl SignatureImage {
    /// Decode a base64 PNG, with or without a `data:image/png;base64,` prefix
    pub fn from_base64(data: &str) -> Result<Self, FormError> {
        let payload = match data.trim().split_once(',') {
            Some((header, payload)) if header.starts_with("data:") => payload,
            _ => data.trim(),
        };
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| FormError::InvalidSignatureImage(format!("not base64: {}", e)))?;
        Self::from_png(&bytes)
    }

    pub fn from_png(bytes: &[u8]) -> Result<Self, FormError> {
        let invalid = |e: png::DecodingError| FormError::InvalidSignatureImage(e.to_string());

        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info().map_err(invalid)?;
        let mut buffer = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buffer).map_err(invalid)?;
        let pixels = &buffer[..frame.buffer_size()];

        if frame.width == 0 || frame.height == 0 {
            return Err(FormError::InvalidSignatureImage(
                "image has no pixels".to_string(),
            ));
        }

        let count = (frame.width as usize) * (frame.height as usize);
        let mut rgb = Vec::with_capacity(count * 3);
        let mut alpha = Vec::with_capacity(count);
        match frame.color_type {
            png::ColorType::Rgba => {
                for px in pixels.chunks_exact(4) {
                    rgb.extend_from_slice(&px[..3]);
                    alpha.push(px[3]);
                }
            }
            png::ColorType::Rgb => {
                rgb.extend_from_slice(pixels);
                alpha.resize(count, u8::MAX);
            }
            png::ColorType::GrayscaleAlpha => {
                for px in pixels.chunks_exact(2) {
                    rgb.extend_from_slice(&[px[0], px[0], px[0]]);
                    alpha.push(px[1]);
                }
            }
            png::ColorType::Grayscale => {
                for &gray in pixels {
                    rgb.extend_from_slice(&[gray, gray, gray]);
                }
                alpha.resize(count, u8::MAX);
            }
            png::ColorType::Indexed => {
                return Err(FormError::InvalidSignatureImage(
                    "palette image was not expanded".to_string(),
                ));
            }
        }

        Ok(Self {
            width: frame.width,
            height: frame.height,
            rgb,
            alpha,
        })
    }

    /// Largest rectangle with the image's aspect ratio that fits `target`,
    /// centered in it
    pub fn fit_within(&self, target: &Rect) -> Rect {
        let scale = (target.width() / f64::from(self.width))
            .min(target.height() / f64::from(self.height));
        let width = f64::from(self.width) * scale;
        let height = f64::from(self.height) * scale;
        let x0 = target.x0 + (target.width() - width) / 2.0;
        let y0 = target.y0 + (target.height() - height) / 2.0;
        Rect::new(x0, y0, x0 + width, y0 + height)
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, FormError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| FormError::Pdf(e.to_string()))?;
    encoder.finish().map_err(|e| FormError::Pdf(e.to_string()))
}

/// Image XObject with an SMask carrying the alpha channel
fn image_xobject(doc: &mut Document, image: &SignatureImage) -> Result<Object, FormError> {
    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(&image.alpha)?,
    ));
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
            "SMask" => smask_id,
        },
        deflate(&image.rgb)?,
    ));
    Ok(Object::Reference(image_id))
}

/// Adds signatures to documents of one form type
#[derive(Debug, Clone)]
pub struct SignatureCompositor<'a> {
    registry: &'a FieldRegistry,
    form: FormType,
    date_policy: DatePolicy,
    style: StampStyle,
}

impl<'a> SignatureCompositor<'a> {
    pub fn new(registry: &'a FieldRegistry, form: FormType, date_policy: DatePolicy) -> Self {
        Self {
            registry,
            form,
            date_policy,
            style: StampStyle::default(),
        }
    }

    pub fn with_style(mut self, style: StampStyle) -> Self {
        self.style = style;
        self
    }

    /// Composite `signature_image_base64` onto page `page_num` of `pdf_bytes`
    /// and date it. A missing date means today. `pdf_bytes` comes from the
    /// caller, so an unreadable or short document is `InvalidDocument`.
    pub fn add_signature(
        &self,
        pdf_bytes: &[u8],
        signature_image_base64: &str,
        signature_date: Option<&str>,
        page_num: u32,
    ) -> Result<Vec<u8>, FormError> {
        let date = resolve_signature_date(signature_date, self.date_policy)?;
        let image = SignatureImage::from_base64(signature_image_base64)?;
        self.registry.signature_field(self.form, page_num)?;
        check_upload(pdf_bytes, page_num)?;
        self.composite(pdf_bytes, &image, date, page_num)
    }

    /// Same as [`add_signature`](Self::add_signature) with the date and image
    /// already resolved
    pub fn composite(
        &self,
        pdf_bytes: &[u8],
        image: &SignatureImage,
        date: NaiveDate,
        page_num: u32,
    ) -> Result<Vec<u8>, FormError> {
        let spec = self.registry.signature_field(self.form, page_num)?;
        let placed = image.fit_within(&spec.rect);

        let date_action = StampAction::write(FieldKey::SignatureDate(self.form), format_us(date));
        if self.registry.spec(date_action.key)?.page != page_num {
            return Err(FormError::RegistryConflict(format!(
                "{} is not on page {} with its signature",
                date_action.field_name, page_num
            )));
        }
        let (dated, _) = stamp(pdf_bytes, &[date_action], self.registry, &self.style)?;

        let mut doc = Document::load_mem(&dated)?;
        let id = page_id(&doc, page_num)?;
        let xobject = image_xobject(&mut doc, image)?;
        add_resource(&mut doc, id, "XObject", SIGNATURE_XOBJECT, xobject)?;
        append_operations(
            &mut doc,
            id,
            vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(placed.width() as f32),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(placed.height() as f32),
                        Object::Real(placed.x0 as f32),
                        Object::Real(placed.y0 as f32),
                    ],
                ),
                Operation::new("Do", vec![SIGNATURE_XOBJECT.into()]),
                Operation::new("Q", vec![]),
            ],
        )?;
        debug!(field = %spec.name, page = page_num, "Composited signature image");

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| FormError::Pdf(e.to_string()))?;

        if output.len() <= pdf_bytes.len() {
            return Err(FormError::Pdf(format!(
                "signed document ({} bytes) is not larger than its input ({} bytes)",
                output.len(),
                pdf_bytes.len()
            )));
        }
        info!(
            form = %self.form,
            page = page_num,
            date = %format_us(date),
            "Signature added"
        );
        Ok(output)
    }
}
