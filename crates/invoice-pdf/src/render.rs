//! # PDF Encoding
//!
//! Converts an [`InvoiceLayout`] into PDF bytes with printpdf's built-in
//! Helvetica fonts. Layout coordinates are measured from the top of the
//! page; PDF coordinates from the bottom, so every y is flipped here.

use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, Color as PdfColor, Line, LinePoint, Mm, Op, PdfDocument, PdfPage,
    PdfSaveOptions, Point, Pt, Rgb, TextItem,
};
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};
use crate::layout::{layout_invoice, Color, InvoiceLayout, LayoutPage, Weight, PAGE_HEIGHT};
use invoice_core::InvoiceWithRelations;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;

/// Renders `invoice` with the current time in the footer.
pub fn render_invoice(invoice: &InvoiceWithRelations) -> RenderResult<Vec<u8>> {
    render_invoice_at(invoice, Utc::now())
}

/// Renders `invoice` with a fixed "Generated on" date.
pub fn render_invoice_at(
    invoice: &InvoiceWithRelations,
    generated_at: DateTime<Utc>,
) -> RenderResult<Vec<u8>> {
    let layout = layout_invoice(invoice, generated_at);
    debug!(
        number = %invoice.invoice.number,
        pages = layout.page_count(),
        "Rendering invoice PDF"
    );
    encode(&invoice.invoice.number, &layout)
}

/// Encodes a finished layout.
pub fn encode(title: &str, layout: &InvoiceLayout) -> RenderResult<Vec<u8>> {
    if layout.pages.is_empty() {
        return Err(RenderError::RenderFailed("layout has no pages".to_string()));
    }

    let pages: Vec<PdfPage> = layout
        .pages
        .iter()
        .map(|page| PdfPage::new(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), page_ops(page)))
        .collect();

    let mut doc = PdfDocument::new(&format!("Invoice {}", title));
    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);

    if !warnings.is_empty() {
        warn!(count = warnings.len(), "PDF encoder reported warnings");
    }

    if !bytes.starts_with(b"%PDF") {
        return Err(RenderError::RenderFailed(
            "encoder produced no PDF header".to_string(),
        ));
    }

    Ok(bytes)
}

fn page_ops(page: &LayoutPage) -> Vec<Op> {
    let mut ops = Vec::with_capacity(page.texts.len() * 6 + page.rules.len() * 3);

    for rule in &page.rules {
        ops.push(Op::SetOutlineColor {
            col: pdf_color(rule.color),
        });
        ops.push(Op::SetOutlineThickness { pt: Pt(1.0) });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    LinePoint {
                        p: point(rule.x1, flip(rule.y)),
                        bezier: false,
                    },
                    LinePoint {
                        p: point(rule.x2, flip(rule.y)),
                        bezier: false,
                    },
                ],
                is_closed: false,
            },
        });
    }

    for run in &page.texts {
        let font = match run.weight {
            Weight::Regular => BuiltinFont::Helvetica,
            Weight::Bold => BuiltinFont::HelveticaBold,
        };

        ops.push(Op::StartTextSection);
        ops.push(Op::SetFillColor {
            col: pdf_color(run.color),
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(run.size),
            font,
        });
        // Baseline sits roughly one font size below the top of the line
        ops.push(Op::SetTextCursor {
            pos: point(run.x, flip(run.y + run.size)),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(run.text.clone())],
            font,
        });
        ops.push(Op::EndTextSection);
    }

    ops
}

fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}

fn point(x: f32, y: f32) -> Point {
    Point { x: Pt(x), y: Pt(y) }
}

fn pdf_color(color: Color) -> PdfColor {
    let (r, g, b) = color.fractions();
    PdfColor::Rgb(Rgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::sample_invoice;
    use invoice_core::types::parse_date;
    use invoice_core::{InvoiceStatus, Money};

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_invoice(&sample_invoice(2, InvoiceStatus::Paid)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_multi_page_render() {
        let generated = parse_date("2026-10-17").unwrap();
        let invoice = sample_invoice(40, InvoiceStatus::Cancelled);
        let bytes = render_invoice_at(&invoice, generated).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    fn generated() -> DateTime<Utc> {
        parse_date("2026-10-17").unwrap()
    }

    fn contains(bytes: &[u8], needle: &str) -> bool {
        bytes
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    /// Counts `/Type /Page` dictionaries, ignoring `/Pages` and whitespace.
    fn page_objects(bytes: &[u8]) -> usize {
        let mut count = 0;
        for start in 0..bytes.len() {
            let Some(rest) = bytes[start..].strip_prefix(b"/Type".as_slice()) else {
                continue;
            };
            let rest = &rest[rest.iter().take_while(|b| b.is_ascii_whitespace()).count()..];
            if let Some(after) = rest.strip_prefix(b"/Page".as_slice()) {
                if !after.first().is_some_and(|b| b.is_ascii_alphanumeric()) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Fill colors set by `r g b rg` operators in the content streams.
    fn fill_colors(bytes: &[u8]) -> Vec<(f32, f32, f32)> {
        let text = String::from_utf8_lossy(bytes);
        let tokens: Vec<&str> = text.split_ascii_whitespace().collect();
        tokens
            .windows(4)
            .filter(|w| w[3] == "rg")
            .filter_map(|w| {
                Some((
                    w[0].parse().ok()?,
                    w[1].parse().ok()?,
                    w[2].parse().ok()?,
                ))
            })
            .collect()
    }

    fn uses_fill(bytes: &[u8], color: Color) -> bool {
        let (r, g, b) = color.fractions();
        fill_colors(bytes).iter().any(|&(fr, fg, fb)| {
            (fr - r).abs() < 1e-3 && (fg - g).abs() < 1e-3 && (fb - b).abs() < 1e-3
        })
    }

    fn assert_every_run_encoded(invoice: &InvoiceWithRelations, bytes: &[u8]) {
        let layout = layout_invoice(invoice, generated());
        for run in layout.text_runs() {
            assert!(contains(bytes, &run.text), "missing {:?} in PDF", run.text);
        }
    }

    #[test]
    fn test_single_item_invoice_text_survives_encoding() {
        let mut invoice = sample_invoice(1, InvoiceStatus::Paid);
        invoice.items[0].description = "Web Development Services".to_string();
        invoice.items[0].quantity = 40;
        invoice.items[0].unit_price = Money::from_cents(2_500);
        invoice.items[0].total = Money::from_cents(100_000);
        invoice.invoice.total_amount = Money::from_cents(100_000);

        let bytes = render_invoice_at(&invoice, generated()).unwrap();

        for expected in [
            "Acme Corporation",
            "INV-2024-001",
            "Web Development Services",
            "40",
            "$25.00",
            "$1000.00",
            "Total Amount:",
            "Generated on Oct 17, 2026",
        ] {
            assert!(contains(&bytes, expected), "missing {:?} in PDF", expected);
        }
        assert_every_run_encoded(&invoice, &bytes);
        assert_eq!(page_objects(&bytes), 1);
        assert!(uses_fill(&bytes, Color::GREEN));
        assert!(!uses_fill(&bytes, Color::RED));
    }

    #[test]
    fn test_two_page_invoice_encodes_both_pages() {
        let invoice = sample_invoice(20, InvoiceStatus::Sent);
        let bytes = render_invoice_at(&invoice, generated()).unwrap();

        assert_eq!(page_objects(&bytes), 2);
        for item in &invoice.items {
            assert!(contains(&bytes, &item.description), "missing {:?}", item.description);
        }
        assert!(contains(&bytes, "$100.00"));
        assert!(contains(&bytes, "$2000.00"));
        assert_every_run_encoded(&invoice, &bytes);
    }

    #[test]
    fn test_cancelled_status_is_filled_red() {
        let invoice = sample_invoice(3, InvoiceStatus::Cancelled);
        let bytes = render_invoice_at(&invoice, generated()).unwrap();

        assert!(contains(&bytes, "CANCELLED"));
        assert!(contains(&bytes, "Acme Corporation"));
        assert!(contains(&bytes, "$300.00"));
        assert!(uses_fill(&bytes, Color::RED));
        assert_every_run_encoded(&invoice, &bytes);
    }

    #[test]
    fn test_empty_layout_fails() {
        let err = encode("INV-0", &InvoiceLayout { pages: Vec::new() }).unwrap_err();
        assert!(matches!(err, RenderError::RenderFailed(_)));
    }

    #[test]
    fn test_flip() {
        assert_eq!(flip(0.0), PAGE_HEIGHT);
        assert_eq!(flip(PAGE_HEIGHT), 0.0);
    }
}
