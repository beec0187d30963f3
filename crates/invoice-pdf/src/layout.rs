//! # Invoice Layout
//!
//! Pure placement of every piece of text and every rule on the page.
//! Nothing here touches PDF encoding, so the layout can be inspected (and
//! its text re-extracted) without parsing a PDF.
//!
//! ## Page Map (A4, points from the top-left corner)
//! ```text
//!  y=50   INVOICE (20pt, blue)
//!  y=75   Invoice Management System
//!
//!  y=130  Bill To:                         Invoice Number:  INV-2024-001
//!  y=145                                   Invoice Date:    Jan 15, 2024
//!  y=150  Acme Corporation
//!  y=160                                   Due Date:        Feb 15, 2024
//!  y=165  contact@acme.com
//!  y=175                                   Status:          PAID (green)
//!  y=180  Tax Number: TAX-001-ACME
//!  y=195  123 Business St, ...
//!
//!  y=280  Description          Qty     Unit Price     Total
//!  y=295  ─────────────────────────────────────────────────
//!  y=310  row, +25 per item (new page at 50 once past 700)
//!         ─────────────────────────────────────────────────
//!  +20                          Total Amount:  $1500.00
//!
//!  y=750          Thank you for your business!
//!  y=765          Generated on Oct 17, 2026
//! ```

use chrono::{DateTime, Utc};
use invoice_core::{InvoiceStatus, InvoiceWithRelations};

// =============================================================================
// Page Geometry
// =============================================================================

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;

/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;

const MARGIN: f32 = 50.0;
const TABLE_TOP: f32 = 280.0;
const ROW_HEIGHT: f32 = 25.0;
const PAGE_BREAK_AFTER: f32 = 700.0;
const RULE_END: f32 = 550.0;
const FOOTER_WIDTH: f32 = 500.0;

const COL_DESCRIPTION: f32 = 50.0;
const COL_QUANTITY: f32 = 280.0;
const COL_UNIT_PRICE: f32 = 370.0;
const COL_TOTAL: f32 = 460.0;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

// =============================================================================
// Primitives
// =============================================================================

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::hex(0x000000);
    pub const BRAND_BLUE: Color = Color::hex(0x2563eb);
    pub const GRAY: Color = Color::hex(0x6b7280);
    pub const TABLE_HEADER: Color = Color::hex(0x4b5563);
    pub const RULE: Color = Color::hex(0xe5e7eb);
    pub const BLUE: Color = Color::hex(0x3b82f6);
    pub const GREEN: Color = Color::hex(0x10b981);
    pub const RED: Color = Color::hex(0xef4444);

    /// Builds a color from `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Color {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn fractions(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Color used for the status value in the metadata block.
pub fn status_color(status: InvoiceStatus) -> Color {
    match status {
        InvoiceStatus::Draft => Color::GRAY,
        InvoiceStatus::Sent => Color::BLUE,
        InvoiceStatus::Paid => Color::GREEN,
        InvoiceStatus::Cancelled => Color::RED,
    }
}

/// Font weight; maps to Helvetica / Helvetica-Bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// One line of text at a fixed position. `y` is the top of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub weight: Weight,
    pub color: Color,
}

/// A horizontal 1pt rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub color: Color,
}

/// Everything drawn on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub texts: Vec<TextRun>,
    pub rules: Vec<Rule>,
}

/// The laid out invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLayout {
    pub pages: Vec<LayoutPage>,
}

impl InvoiceLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text runs, page by page, in drawing order.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(|page| page.texts.iter())
    }

    /// The text of every run joined by newlines.
    pub fn extract_text(&self) -> String {
        self.text_runs()
            .map(|run| run.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First run whose text equals `text`.
    pub fn find(&self, text: &str) -> Option<&TextRun> {
        self.text_runs().find(|run| run.text == text)
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Formats a date as `Jan 15, 2024`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Lays out `invoice`, stamping the footer with `generated_at`.
pub fn layout_invoice(invoice: &InvoiceWithRelations, generated_at: DateTime<Utc>) -> InvoiceLayout {
    let mut builder = Builder::new();

    header(&mut builder);
    invoice_info(&mut builder, invoice);
    customer_info(&mut builder, invoice);
    let position = item_table(&mut builder, invoice);
    total(&mut builder, invoice, position);
    footer(&mut builder, generated_at);

    builder.finish()
}

fn header(b: &mut Builder) {
    b.text("INVOICE", MARGIN, 50.0, 20.0, Weight::Bold, Color::BRAND_BLUE);
    b.text(
        "Invoice Management System",
        MARGIN,
        75.0,
        10.0,
        Weight::Regular,
        Color::BLACK,
    );
}

fn invoice_info(b: &mut Builder, invoice: &InvoiceWithRelations) {
    let top = 130.0;
    let inv = &invoice.invoice;

    let rows = [
        ("Invoice Number:", inv.number.clone(), 450.0, Color::BLACK),
        ("Invoice Date:", format_date(inv.date), 460.0, Color::BLACK),
        ("Due Date:", format_date(inv.due_date), 460.0, Color::BLACK),
        ("Status:", inv.status.to_string(), 460.0, status_color(inv.status)),
    ];

    for (i, (label, value, value_x, color)) in rows.into_iter().enumerate() {
        let y = top + 15.0 * i as f32;
        b.text(label, 350.0, y, 10.0, Weight::Bold, Color::BLACK);
        b.text(&value, value_x, y, 10.0, Weight::Regular, color);
    }
}

fn customer_info(b: &mut Builder, invoice: &InvoiceWithRelations) {
    let customer = &invoice.customer;

    b.text("Bill To:", MARGIN, 130.0, 12.0, Weight::Bold, Color::BLACK);
    b.text(&customer.name, MARGIN, 150.0, 10.0, Weight::Regular, Color::BLACK);
    b.text(&customer.email, MARGIN, 165.0, 10.0, Weight::Regular, Color::BLACK);

    if let Some(tax_number) = &customer.tax_number {
        b.text(
            &format!("Tax Number: {}", tax_number),
            MARGIN,
            180.0,
            10.0,
            Weight::Regular,
            Color::BLACK,
        );
    }

    if let Some(address) = &customer.address {
        let top = if customer.tax_number.is_some() { 195.0 } else { 180.0 };
        b.wrapped(address, MARGIN, top, 250.0, 10.0);
    }
}

/// Draws the table and returns the y of the closing rule.
fn item_table(b: &mut Builder, invoice: &InvoiceWithRelations) -> f32 {
    for (label, x) in [
        ("Description", COL_DESCRIPTION),
        ("Qty", COL_QUANTITY),
        ("Unit Price", COL_UNIT_PRICE),
        ("Total", COL_TOTAL),
    ] {
        b.text(label, x, TABLE_TOP, 10.0, Weight::Bold, Color::TABLE_HEADER);
    }
    b.rule(TABLE_TOP + 15.0);

    let mut position = TABLE_TOP + 30.0;

    for item in &invoice.items {
        b.wrapped(&item.description, COL_DESCRIPTION, position, 210.0, 9.0);
        b.text(
            &item.quantity.to_string(),
            COL_QUANTITY,
            position,
            9.0,
            Weight::Regular,
            Color::BLACK,
        );
        b.text(
            &item.unit_price.to_string(),
            COL_UNIT_PRICE,
            position,
            9.0,
            Weight::Regular,
            Color::BLACK,
        );
        b.text(
            &item.total.to_string(),
            COL_TOTAL,
            position,
            9.0,
            Weight::Regular,
            Color::BLACK,
        );

        position += ROW_HEIGHT;

        if position > PAGE_BREAK_AFTER {
            b.new_page();
            position = MARGIN;
        }
    }

    b.rule(position);
    position
}

fn total(b: &mut Builder, invoice: &InvoiceWithRelations, position: f32) {
    let y = position + 20.0;
    b.text("Total Amount:", COL_UNIT_PRICE, y, 12.0, Weight::Bold, Color::BLACK);
    b.text(
        &invoice.invoice.total_amount.to_string(),
        COL_TOTAL,
        y,
        14.0,
        Weight::Bold,
        Color::BRAND_BLUE,
    );
}

fn footer(b: &mut Builder, generated_at: DateTime<Utc>) {
    b.centered("Thank you for your business!", 750.0, 8.0, Color::GRAY);
    b.centered(
        &format!("Generated on {}", format_date(generated_at)),
        765.0,
        8.0,
        Color::GRAY,
    );
}

// =============================================================================
// Builder
// =============================================================================

struct Builder {
    pages: Vec<LayoutPage>,
}

impl Builder {
    fn new() -> Self {
        Builder {
            pages: vec![LayoutPage::default()],
        }
    }

    fn current(&mut self) -> &mut LayoutPage {
        if self.pages.is_empty() {
            self.pages.push(LayoutPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, weight: Weight, color: Color) {
        self.current().texts.push(TextRun {
            text: text.to_string(),
            x,
            y,
            size,
            weight,
            color,
        });
    }

    /// Regular black text wrapped to `width`, one run per line.
    fn wrapped(&mut self, text: &str, x: f32, y: f32, width: f32, size: f32) {
        let line_height = size * 1.2;
        for (i, line) in wrap(text, width, size).into_iter().enumerate() {
            self.text(
                &line,
                x,
                y + line_height * i as f32,
                size,
                Weight::Regular,
                Color::BLACK,
            );
        }
    }

    /// Centers within the footer band starting at the left margin.
    fn centered(&mut self, text: &str, y: f32, size: f32, color: Color) {
        let width = text_width(text, size);
        let x = MARGIN + ((FOOTER_WIDTH - width) / 2.0).max(0.0);
        self.text(text, x, y, size, Weight::Regular, color);
    }

    fn rule(&mut self, y: f32) {
        self.current().rules.push(Rule {
            x1: MARGIN,
            x2: RULE_END,
            y,
            color: Color::RULE,
        });
    }

    fn finish(self) -> InvoiceLayout {
        InvoiceLayout { pages: self.pages }
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Greedy word wrap. Words longer than a line are kept whole.
fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * AVG_GLYPH_WIDTH)) as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use invoice_core::types::parse_date;
    use invoice_core::{Customer, Invoice, InvoiceItem, Money};

    pub(crate) fn sample_invoice(item_count: usize, status: InvoiceStatus) -> InvoiceWithRelations {
        let now = parse_date("2024-01-15").unwrap();
        let items: Vec<InvoiceItem> = (0..item_count)
            .map(|i| InvoiceItem {
                id: format!("item-{}", i),
                invoice_id: "inv-1".to_string(),
                description: format!("Service line {}", i + 1),
                quantity: 1,
                unit_price: Money::from_cents(10_000),
                total: Money::from_cents(10_000),
            })
            .collect();

        InvoiceWithRelations {
            invoice: Invoice {
                id: "inv-1".to_string(),
                customer_id: "cust-1".to_string(),
                number: "INV-2024-001".to_string(),
                date: now,
                due_date: parse_date("2024-02-15").unwrap(),
                status,
                total_amount: items.iter().map(|i| i.total).sum(),
                created_at: now,
                updated_at: now,
            },
            customer: Customer {
                id: "cust-1".to_string(),
                name: "Acme Corporation".to_string(),
                email: "contact@acme.com".to_string(),
                tax_number: Some("TAX-001-ACME".to_string()),
                address: Some("123 Business St, New York, NY 10001".to_string()),
                created_at: now,
                updated_at: now,
            },
            items,
        }
    }

    fn generated() -> DateTime<Utc> {
        parse_date("2026-10-17").unwrap()
    }

    #[test]
    fn test_single_page_contains_every_field() {
        let invoice = sample_invoice(2, InvoiceStatus::Paid);
        let layout = layout_invoice(&invoice, generated());

        assert_eq!(layout.page_count(), 1);
        let text = layout.extract_text();
        for expected in [
            "INVOICE",
            "Invoice Management System",
            "INV-2024-001",
            "Jan 15, 2024",
            "Feb 15, 2024",
            "PAID",
            "Acme Corporation",
            "contact@acme.com",
            "Tax Number: TAX-001-ACME",
            "Service line 2",
            "$100.00",
            "$200.00",
            "Thank you for your business!",
            "Generated on Oct 17, 2026",
        ] {
            assert!(text.contains(expected), "missing {:?}", expected);
        }

        assert_eq!(layout.find("PAID").unwrap().color, Color::GREEN);
        assert_eq!(layout.find("$200.00").unwrap().x, COL_TOTAL);
    }

    #[test]
    fn test_address_moves_up_without_tax_number() {
        let mut invoice = sample_invoice(1, InvoiceStatus::Draft);
        invoice.customer.tax_number = None;

        let layout = layout_invoice(&invoice, generated());
        let address = layout.find("123 Business St, New York, NY 10001").unwrap();
        assert_eq!(address.y, 180.0);
        assert!(!layout.extract_text().contains("Tax Number"));
    }

    #[test]
    fn test_rows_paginate_past_700() {
        let invoice = sample_invoice(20, InvoiceStatus::Sent);
        let layout = layout_invoice(&invoice, generated());

        assert_eq!(layout.page_count(), 2);

        // 310 + 16 * 25 = 710 > 700, so row 17 opens page two at the margin
        let first_page = &layout.pages[0];
        assert!(first_page.texts.iter().any(|t| t.text == "Service line 16"));
        let row_17 = layout.pages[1]
            .texts
            .iter()
            .find(|t| t.text == "Service line 17")
            .unwrap();
        assert_eq!(row_17.y, 50.0);

        // Total and footer land on the last page
        assert!(layout.pages[1].texts.iter().any(|t| t.text == "$2000.00"));
        assert!(layout.pages[1]
            .texts
            .iter()
            .any(|t| t.text == "Thank you for your business!"));
    }

    #[test]
    fn test_cancelled_status_is_red() {
        let layout = layout_invoice(&sample_invoice(1, InvoiceStatus::Cancelled), generated());
        assert_eq!(layout.find("CANCELLED").unwrap().color, Color::RED);
        assert_eq!(
            layout_invoice(&sample_invoice(1, InvoiceStatus::Draft), generated())
                .find("DRAFT")
                .unwrap()
                .color,
            Color::GRAY
        );
    }

    #[test]
    fn test_layout_is_deterministic() {
        let invoice = sample_invoice(3, InvoiceStatus::Sent);
        assert_eq!(
            layout_invoice(&invoice, generated()),
            layout_invoice(&invoice, generated())
        );
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a b c", 1000.0, 10.0), vec!["a b c"]);
        // 20 chars per line at size 10 over 100pt
        let lines = wrap("123 Business Street, New York, NY 10001", 100.0, 10.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert!(wrap("   ", 100.0, 10.0).is_empty());
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::hex(0x2563eb), Color { r: 0x25, g: 0x63, b: 0xeb });
        assert_eq!(Color::BLACK.fractions(), (0.0, 0.0, 0.0));
    }
}
