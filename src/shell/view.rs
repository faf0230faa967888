use std::fmt::Write as _;

use crate::money::{format_currency, format_quantity};
use crate::order::Order;

use super::state::{Selection, ViewState};

const MISSING: &str = "(missing)";

/// Caption of the generate action for the current selection.
pub fn action_label(selection: &Selection) -> &'static str {
    if selection.downloaded() {
        "PDF Downloaded"
    } else {
        "Generate PDF"
    }
}

/// Renders `state` as the text of the invoice preview.
pub fn render_view(state: &ViewState, currency_label: &str) -> String {
    match state {
        ViewState::Loading => "Loading...\n".to_owned(),
        ViewState::LoadFailed { message } => format!("Error fetching API: {message}\n"),
        ViewState::Empty => "No orders available.\n".to_owned(),
        ViewState::Ready(selection) => render_selection(selection, currency_label),
    }
}

fn render_selection(selection: &Selection, currency_label: &str) -> String {
    let mut out = String::from("Invoice Preview\n\n");

    for (index, order) in selection.orders().iter().enumerate() {
        let marker = if index == selection.selected_index() { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} [{index}] {}", order.selection_label());
    }
    out.push('\n');

    render_details(&mut out, selection.selected());
    out.push('\n');
    render_items(&mut out, selection.selected(), currency_label);
    out.push('\n');

    let _ = writeln!(out, "[{}]", action_label(selection));
    if let Some(error) = selection.last_error() {
        let _ = writeln!(out, "Last attempt failed: {error}");
    }
    out
}

fn render_details(out: &mut String, order: &Order) {
    let party = order.bill_to.as_ref();
    let field = |value: Option<&String>| value.map_or(MISSING, String::as_str).to_owned();

    let _ = writeln!(out, "Invoice Number: {}", order.invoice_number);
    let _ = writeln!(out, "Name: {}", field(party.map(|p| &p.name)));
    let _ = writeln!(out, "Email: {}", field(party.map(|p| &p.email)));
    let _ = writeln!(out, "Address: {}", field(party.map(|p| &p.address)));
    let _ = writeln!(out, "Date: {}", order.date);
    let _ = writeln!(out, "Status: {}", order.status);
}

fn render_items(out: &mut String, order: &Order, currency_label: &str) {
    out.push_str("Order Items\n");
    let Some(items) = order.items.as_deref() else {
        let _ = writeln!(out, "  {MISSING}");
        return;
    };

    let rows: Vec<[String; 4]> = items
        .iter()
        .map(|item| {
            [
                item.item.clone(),
                format_quantity(item.quantity),
                format_currency(currency_label, item.unit_price),
                format_currency(currency_label, item.line_total()),
            ]
        })
        .collect();

    let header = ["Item", "Quantity", "Unit Price", "Total"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| {
        format!(
            "| {:<w0$} | {:<w1$} | {:<w2$} | {:<w3$} |\n",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        )
    };

    out.push_str(&line(header));
    for row in &rows {
        let [item, quantity, price, total] = row;
        out.push_str(&line([item, quantity, price, total].map(String::as_str)));
    }
}
