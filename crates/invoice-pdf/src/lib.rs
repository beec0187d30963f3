//! # invoice-pdf: Invoice PDF Rendering
//!
//! ## Pipeline
//! ```text
//! InvoiceWithRelations ──► layout_invoice() ──► InvoiceLayout ──► encode() ──► Vec<u8>
//!                            (pure, testable)     pages of runs      (printpdf)
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let bytes = invoice_pdf::render_invoice(&invoice)?;
//! // "invoice-INV-2024-001.pdf"
//! ```
//!
//! Encoding is CPU-bound; async callers run it on the blocking pool.

pub mod error;
pub mod layout;
pub mod render;

pub use error::{RenderError, RenderResult};
pub use layout::{layout_invoice, InvoiceLayout, LayoutPage, TextRun};
pub use render::{render_invoice, render_invoice_at};

/// Download filename for an invoice PDF.
pub fn pdf_filename(number: &str) -> String {
    format!("invoice-{}.pdf", number)
}
