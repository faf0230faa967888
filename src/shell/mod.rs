//! Presentation shell: view state, its text rendering, and the actions a user
//! can trigger from it.

mod state;
mod view;

use log::warn;

pub use state::{Selection, ViewEvent, ViewState};
pub use view::{action_label, render_view};

use crate::layout::InvoiceLayoutEngine;
use crate::pipeline::generate_invoice;
use crate::render::PdfRenderer;
use crate::sink::DocumentSink;

/// Generates the invoice of the selected order and returns the event that
/// records the outcome. A failure only affects this attempt.
///
/// Returns `None` when no order is selected.
pub fn generate_selected<S>(
    state: &ViewState,
    engine: &InvoiceLayoutEngine,
    renderer: &PdfRenderer,
    sink: &mut S,
    file_name: &str,
) -> Option<ViewEvent>
where
    S: DocumentSink + ?Sized,
{
    let order = state.selected_order()?;
    let event = match generate_invoice(order, engine, renderer, sink, file_name) {
        Ok(_) => ViewEvent::InvoiceSaved,
        Err(err) => {
            let message = error_chain(&err);
            warn!("invoice {} not generated: {}", order.invoice_number, message);
            ViewEvent::InvoiceFailed(message)
        }
    };
    Some(event)
}

/// Joins an error and its sources into one line.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
