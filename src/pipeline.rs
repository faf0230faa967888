//! Order → layout → PDF bytes → sink.

use log::info;
use thiserror::Error;

use crate::layout::{InvoiceLayoutEngine, LayoutError};
use crate::order::Order;
use crate::render::{PdfRenderer, RenderError};
use crate::sink::{DocumentSink, SavedDocument, SinkError};

/// Failure of a single invoice generation attempt.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("failed to lay out invoice")]
    Layout(#[from] LayoutError),
    #[error("failed to render invoice")]
    Render(#[from] RenderError),
    #[error("failed to save invoice")]
    Save(#[from] SinkError),
}

/// Lays out, renders, and saves the invoice for `order` as `file_name`.
///
/// Nothing reaches the sink unless layout and rendering both succeed.
pub fn generate_invoice<S>(
    order: &Order,
    engine: &InvoiceLayoutEngine,
    renderer: &PdfRenderer,
    sink: &mut S,
    file_name: &str,
) -> Result<SavedDocument, InvoiceError>
where
    S: DocumentSink + ?Sized,
{
    let document = engine.layout(order)?;
    let pdf = renderer.render(&document)?;
    let saved = sink.save(file_name, &pdf.bytes)?;
    info!(
        "invoice {} generated: {} page(s) saved to {}",
        order.invoice_number,
        pdf.page_count,
        saved.location.display()
    );
    Ok(saved)
}
