//! PDF assembly from a finished layout.
//!
//! Layout coordinates are top-left based in millimetres; PDF user space is
//! bottom-left based in points, so every placement is flipped and scaled on
//! the way out. Captures are embedded once each as JPEG image XObjects.

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::layout::PageLayout;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::encode_jpeg;

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

pub(crate) fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Render `layout` with the matching `captures` (same order) to PDF bytes.
///
/// `quality` is the JPEG quality used for embedded captures. Failures are
/// reported against `group`.
pub fn render_pdf(
    group: &str,
    layout: &PageLayout,
    captures: &[DynamicImage],
    quality: u8,
) -> PipelineResult<Vec<u8>> {
    let render_error = |message: String| PipelineError::Render {
        group: group.to_string(),
        message,
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let page_w = mm_to_pt(layout.page.width);
    let page_h = mm_to_pt(layout.page.height);

    let mut image_ids = Vec::with_capacity(captures.len());
    for capture in captures {
        image_ids.push(embed_jpeg(&mut doc, capture, quality).map_err(render_error)?);
    }

    let mut kids = Vec::with_capacity(layout.page_count);
    for page in 0..layout.page_count {
        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();

        for placement in layout.on_page(page) {
            let name = format!("Im{}", placement.index);
            let w = mm_to_pt(placement.width);
            let h = mm_to_pt(placement.height);
            let x = 0.0;
            let y = page_h - mm_to_pt(placement.y) - h;

            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    Object::Real(w),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(h),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ));
            operations.push(Operation::new(
                "Do",
                vec![Object::Name(name.as_bytes().to_vec())],
            ));
            operations.push(Operation::new("Q", vec![]));

            let image_id = image_ids.get(placement.index).copied().ok_or_else(|| {
                render_error(format!("no capture for placement {}", placement.index))
            })?;
            xobjects.set(name.into_bytes(), image_id);
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| render_error(format!("content stream: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => xobjects,
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(page_w),
            Object::Real(page_h),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| render_error(format!("write: {}", e)))?;
    Ok(bytes)
}

fn embed_jpeg(doc: &mut Document, capture: &DynamicImage, quality: u8) -> Result<ObjectId, String> {
    let jpeg = encode_jpeg(capture, quality).map_err(|e| format!("jpeg: {}", e))?;
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => capture.width() as i64,
            "Height" => capture.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    )
    .with_compression(false);
    Ok(doc.add_object(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::PageSize;

    const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };

    #[test]
    fn test_mm_to_pt() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
        assert!((mm_to_pt(210.0) - 595.2756).abs() < 1e-3);
    }

    #[test]
    fn test_render_empty_layout_has_one_blank_page() {
        let layout = PageLayout::build(&[], A4, 20.0);
        let bytes = render_pdf("empty", &layout, &[], 92).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_one_page_per_layout_page() {
        let captures = vec![
            DynamicImage::new_rgb8(210, 200),
            DynamicImage::new_rgb8(210, 200),
            DynamicImage::new_rgb8(210, 200),
        ];
        let sizes: Vec<(u32, u32)> = captures.iter().map(|c| (c.width(), c.height())).collect();
        let layout = PageLayout::build(&sizes, A4, 20.0);
        assert_eq!(layout.page_count, 3);

        let bytes = render_pdf("calendar", &layout, &captures, 92).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_render_missing_capture_is_an_error() {
        let sizes = [(210, 200), (210, 200)];
        let layout = PageLayout::build(&sizes, A4, 20.0);
        let captures = vec![DynamicImage::new_rgb8(210, 200)];

        let err = render_pdf("calendar", &layout, &captures, 92).unwrap_err();
        assert!(matches!(err, PipelineError::Render { group, .. } if group == "calendar"));
    }
}
