//! Invoice layout engine.
//!
//! [`InvoiceLayoutEngine::layout`] turns one [`Order`] into an
//! [`InvoiceDocument`]: a header, the bill-to and invoice detail columns, a
//! paginated item table, the totals block, and a footer.  Every block after the
//! table is positioned from the table's actual end, so a table that spills onto
//! further pages pushes the totals along with it.
//!
//! The engine is a pure function of the order and its settings; it performs no
//! I/O and keeps no state between calls.

mod flow;
mod table;

use log::debug;
use thiserror::Error;

use crate::metrics::pt_to_mm;
use crate::money::{
    format_currency, format_quantity, InvoiceTotals, DEFAULT_CURRENCY_LABEL, DEFAULT_TAX_AMOUNT,
};
use crate::model::{
    BlockAnchors, FontWeight, HorizontalAlignment, InvoiceDocument, PagePosition, PageSize,
    Primitive, Rgb, Rule, TextRun,
};
use crate::order::{LineItem, Order, Party};

pub use flow::PageFlow;
pub use table::{Column, GridTable, TableStyle};

const MARGIN_LEFT: f64 = 14.0;
const MARGIN_TOP: f64 = 14.0;
const MARGIN_BOTTOM: f64 = 14.0;
const RULE_END_X: f64 = 200.0;
const RULE_THICKNESS: f64 = 0.2;

const TITLE_BASELINE: f64 = 22.0;
const TITLE_SIZE: f64 = 18.0;
const SUBTITLE_BASELINE: f64 = 30.0;
const SUBTITLE_SIZE: f64 = 14.0;
const HEADER_RULE_Y: f64 = 32.0;

const DETAILS_SIZE: f64 = 12.0;
const DETAILS_RIGHT_X: f64 = 120.0;
const DETAILS_FIRST_BASELINE: f64 = 40.0;
const DETAILS_LINE_STEP: f64 = 6.0;

const TABLE_START_Y: f64 = 70.0;
const COLUMN_WIDTHS: [f64; 4] = [82.0, 20.0, 40.0, 40.0];
const COLUMN_TITLES: [&str; 4] = ["Item", "Qty", "Unit Price", "Total"];

const TOTALS_GAP: f64 = 10.0;
const TOTALS_LABEL_X: f64 = 143.0;
const TOTALS_AMOUNT_X: f64 = 165.0;
const TAX_OFFSET: f64 = 6.0;
const TOTAL_OFFSET: f64 = 15.0;
const TOTALS_SIZE: f64 = 12.0;
const TOTAL_SIZE: f64 = 14.0;

const FOOTER_OFFSET: f64 = 35.0;
const FOOTER_LINE_STEP: f64 = 7.0;
const FOOTER_SIZE: f64 = 11.0;
const FOOTER_COLOR: Rgb = Rgb(80, 80, 80);

const ACCENT: Rgb = Rgb(34, 139, 34);

/// Errors raised while laying out an invoice.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The order lacks a field the invoice cannot be drawn without.
    #[error("order {invoice_number} is missing `{field}`")]
    MissingField {
        invoice_number: String,
        field: &'static str,
    },
    /// A line item carries a quantity or price that cannot be billed.
    #[error("order {invoice_number}, item {row} (`{item}`): {reason}")]
    InvalidLineItem {
        invoice_number: String,
        row: usize,
        item: String,
        reason: String,
    },
    /// The configured tax amount is negative or not a number.
    #[error("tax amount {0} must be a finite, non-negative number")]
    InvalidTax(f64),
}

/// Presentation parameters of the invoice.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSettings {
    /// Printed as the document title in the header block.
    pub company_name: String,
    /// Prefix of every currency amount.
    pub currency_label: String,
    /// Flat amount added to the subtotal.
    pub tax_amount: f64,
    /// Centered lines below the totals block.
    pub footer_lines: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            company_name: "Siddha AI".to_owned(),
            currency_label: DEFAULT_CURRENCY_LABEL.to_owned(),
            tax_amount: DEFAULT_TAX_AMOUNT,
            footer_lines: default_footer_lines(),
        }
    }
}

/// The two boilerplate lines printed at the bottom of every invoice.
pub fn default_footer_lines() -> Vec<String> {
    vec![
        "If you have any questions, feel free to contact us.".to_owned(),
        "Thank you for your business!".to_owned(),
    ]
}

/// Lays out invoices for orders on A4 pages.
#[derive(Clone, Debug, Default)]
pub struct InvoiceLayoutEngine {
    settings: LayoutSettings,
}

impl InvoiceLayoutEngine {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    /// Computes the totals of `order` after validating its line items.
    pub fn totals(&self, order: &Order) -> Result<InvoiceTotals, LayoutError> {
        let (_, items) = self.validate(order)?;
        Ok(InvoiceTotals::compute(items, self.settings.tax_amount))
    }

    /// Table cells for `item`: name, quantity, unit price, line total.
    pub fn table_row(&self, item: &LineItem) -> Vec<String> {
        let label = &self.settings.currency_label;
        vec![
            item.item.clone(),
            format_quantity(item.quantity),
            format_currency(label, item.unit_price),
            format_currency(label, item.line_total()),
        ]
    }

    fn validate<'a>(&self, order: &'a Order) -> Result<(&'a Party, &'a [LineItem]), LayoutError> {
        let tax = self.settings.tax_amount;
        if !tax.is_finite() || tax < 0.0 {
            return Err(LayoutError::InvalidTax(tax));
        }

        let missing = |field| LayoutError::MissingField {
            invoice_number: order.invoice_number.clone(),
            field,
        };
        let bill_to = order.bill_to.as_ref().ok_or_else(|| missing("billTo"))?;
        let items = order.items.as_deref().ok_or_else(|| missing("items"))?;

        for (row, item) in items.iter().enumerate() {
            let reason = if !item.quantity.is_finite() || item.quantity < 0.0 {
                Some(format!("quantity {} is not a non-negative number", item.quantity))
            } else if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                Some(format!("unit price {} is not a non-negative number", item.unit_price))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(LayoutError::InvalidLineItem {
                    invoice_number: order.invoice_number.clone(),
                    row: row + 1,
                    item: item.item.clone(),
                    reason,
                });
            }
        }

        Ok((bill_to, items))
    }

    /// Lays out the invoice for `order`.
    pub fn layout(&self, order: &Order) -> Result<InvoiceDocument, LayoutError> {
        let (bill_to, items) = self.validate(order)?;
        let totals = InvoiceTotals::compute(items, self.settings.tax_amount);
        let page_size = PageSize::A4;
        let mut flow = PageFlow::new(page_size, MARGIN_TOP, MARGIN_BOTTOM);

        self.draw_header(&mut flow);
        self.draw_details(&mut flow, order, bill_to);

        let mut table = GridTable::new(
            MARGIN_LEFT,
            COLUMN_TITLES
                .iter()
                .zip(COLUMN_WIDTHS)
                .map(|(title, width)| Column::new(*title, width))
                .collect(),
            TableStyle::default(),
        );
        for item in items {
            table.push_row(self.table_row(item));
        }
        let table_end = table.place(&mut flow, TABLE_START_Y);
        debug!(
            "invoice {}: {} item rows, table ends on page {} at y={:.2}",
            order.invoice_number,
            items.len(),
            table_end.page + 1,
            table_end.y
        );

        let totals_start = self.place_closing_blocks(&mut flow, table_end);
        self.draw_totals(&mut flow, totals_start.y, &totals);
        let footer_end = self.draw_footer(&mut flow, totals_start.y, page_size);

        let anchors = BlockAnchors {
            table_end,
            totals_start,
            footer_end,
        };
        Ok(InvoiceDocument::new(
            format!("Invoice {}", order.invoice_number),
            page_size,
            flow.into_pages(),
            anchors,
        ))
    }

    fn draw_header(&self, flow: &mut PageFlow) {
        let page = flow.current();
        page.push_text(
            TextRun::new(
                self.settings.company_name.clone(),
                MARGIN_LEFT,
                TITLE_BASELINE,
                TITLE_SIZE,
            )
            .bold(),
        );
        page.push_text(TextRun::new(
            "INVOICE",
            MARGIN_LEFT,
            SUBTITLE_BASELINE,
            SUBTITLE_SIZE,
        ));
        page.push(Primitive::Rule(Rule {
            from: (MARGIN_LEFT, HEADER_RULE_Y),
            to: (RULE_END_X, HEADER_RULE_Y),
            thickness: RULE_THICKNESS,
            color: Rgb::BLACK,
        }));
    }

    fn draw_details(&self, flow: &mut PageFlow, order: &Order, bill_to: &Party) {
        let left = [
            "Bill To:".to_owned(),
            bill_to.name.clone(),
            bill_to.email.clone(),
            bill_to.address.clone(),
        ];
        let right = [
            "Invoice Details:".to_owned(),
            format!("Invoice : {}", order.invoice_number),
            format!("Date: {}", order.date),
            format!("Status: {}", order.status),
        ];

        let page = flow.current();
        for (index, (left, right)) in left.into_iter().zip(right).enumerate() {
            let baseline = DETAILS_FIRST_BASELINE + index as f64 * DETAILS_LINE_STEP;
            page.push_text(TextRun::new(left, MARGIN_LEFT, baseline, DETAILS_SIZE));
            page.push_text(TextRun::new(right, DETAILS_RIGHT_X, baseline, DETAILS_SIZE));
        }
    }

    /// Height the totals and footer occupy below the table end, down to the
    /// descenders of the last footer line.
    fn closing_blocks_height(&self) -> f64 {
        let footer_lines = self.settings.footer_lines.len().max(1) - 1;
        TOTALS_GAP
            + FOOTER_OFFSET
            + footer_lines as f64 * FOOTER_LINE_STEP
            + pt_to_mm(FOOTER_SIZE) * 0.25
    }

    /// Returns the anchor of the totals block: `TOTALS_GAP` below the table, or
    /// the top of a new page when totals and footer do not fit below it.
    fn place_closing_blocks(&self, flow: &mut PageFlow, table_end: PagePosition) -> PagePosition {
        if flow.fits(table_end.y, self.closing_blocks_height()) {
            return flow.position(table_end.y + TOTALS_GAP);
        }
        let top = flow.break_page();
        debug!("totals block moved to page {}", flow.page_index() + 1);
        flow.position(top + TOTALS_GAP)
    }

    fn draw_totals(&self, flow: &mut PageFlow, anchor: f64, totals: &InvoiceTotals) {
        let label = &self.settings.currency_label;
        let lines = [
            ("Subtotal:", totals.subtotal, 0.0, TOTALS_SIZE, Rgb::BLACK, FontWeight::Regular),
            ("Tax:", totals.tax, TAX_OFFSET, TOTALS_SIZE, Rgb::BLACK, FontWeight::Regular),
            ("Total:", totals.total, TOTAL_OFFSET, TOTAL_SIZE, ACCENT, FontWeight::Bold),
        ];

        let page = flow.current();
        for (caption, amount, offset, size, color, weight) in lines {
            let baseline = anchor + offset;
            page.push_text(
                TextRun::new(caption, TOTALS_LABEL_X, baseline, size)
                    .with_color(color)
                    .with_weight(weight),
            );
            page.push_text(
                TextRun::new(format_currency(label, amount), TOTALS_AMOUNT_X, baseline, size)
                    .with_color(color)
                    .with_weight(weight),
            );
        }
    }

    fn draw_footer(&self, flow: &mut PageFlow, anchor: f64, page_size: PageSize) -> PagePosition {
        let center = page_size.width / 2.0;
        let mut baseline = anchor + FOOTER_OFFSET;
        let page = flow.current();
        for (index, line) in self.settings.footer_lines.iter().enumerate() {
            baseline = anchor + FOOTER_OFFSET + index as f64 * FOOTER_LINE_STEP;
            page.push_text(
                TextRun::new(line.clone(), center, baseline, FOOTER_SIZE)
                    .with_color(FOOTER_COLOR)
                    .with_alignment(HorizontalAlignment::Center),
            );
        }
        flow.position(baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(1_i64, "INV-001")
            .with_date("2024-01-01")
            .with_status("Paid")
            .with_bill_to(Party::new("Acme", "a@acme.com", "1 Main St"))
            .with_items(vec![LineItem::new("Widget", 2.0, 50.0)])
    }

    #[test]
    fn table_row_formats_currency_and_quantity() {
        let engine = InvoiceLayoutEngine::default();
        assert_eq!(
            engine.table_row(&LineItem::new("Widget", 2.0, 50.0)),
            vec!["Widget", "2", "INR 50.00", "INR 100.00"]
        );
    }

    #[test]
    fn header_and_details_use_fixed_positions() {
        let document = InvoiceLayoutEngine::default()
            .layout(&sample_order())
            .expect("layout succeeds");
        let page = &document.pages()[0];

        let title = page.find_text("Siddha AI").expect("title present");
        assert_eq!(title.baseline(), 22.0);
        assert_eq!(title.font_size_pt(), 18.0);
        assert_eq!(page.find_text("INVOICE").map(TextRun::baseline), Some(30.0));

        let name = page.find_text("Acme").expect("bill-to name present");
        let number = page.find_text("Invoice : INV-001").expect("number present");
        assert_eq!(name.baseline(), 46.0);
        assert_eq!(number.baseline(), name.baseline());
        assert_eq!(number.x(), 120.0);
        assert_eq!(page.find_text("Status: Paid").map(TextRun::baseline), Some(58.0));
    }

    #[test]
    fn totals_follow_table_end() {
        let document = InvoiceLayoutEngine::default()
            .layout(&sample_order())
            .expect("layout succeeds");
        let anchors = document.anchors();
        assert_eq!(anchors.totals_start.page, anchors.table_end.page);
        assert!((anchors.totals_start.y - (anchors.table_end.y + 10.0)).abs() < 1e-9);

        let page = &document.pages()[0];
        let subtotal = page.find_text("INR 100.00").expect("line total or subtotal");
        assert!(subtotal.baseline() > 70.0);
        let total = page.find_text("INR 110.00").expect("total present");
        assert!((total.baseline() - (anchors.totals_start.y + 15.0)).abs() < 1e-9);
        assert_eq!(total.font_size_pt(), 14.0);
        assert_eq!(
            page.find_text("Tax:").map(TextRun::baseline),
            Some(anchors.totals_start.y + 6.0)
        );
    }

    #[test]
    fn footer_lines_are_centered_below_totals() {
        let document = InvoiceLayoutEngine::default()
            .layout(&sample_order())
            .expect("layout succeeds");
        let anchors = document.anchors();
        let page = &document.pages()[0];
        let thanks = page
            .find_text("Thank you for your business!")
            .expect("footer present");
        assert_eq!(thanks.alignment(), HorizontalAlignment::Center);
        assert_eq!(thanks.x(), 105.0);
        assert!((thanks.baseline() - (anchors.totals_start.y + 42.0)).abs() < 1e-9);
        assert_eq!(anchors.footer_end.y, thanks.baseline());
    }

    #[test]
    fn missing_bill_to_fails_fast() {
        let mut order = sample_order();
        order.bill_to = None;
        let err = InvoiceLayoutEngine::default().layout(&order).unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingField {
                invoice_number: "INV-001".to_owned(),
                field: "billTo",
            }
        );
        assert_eq!(err.to_string(), "order INV-001 is missing `billTo`");
    }

    #[test]
    fn missing_items_fails_fast() {
        let mut order = sample_order();
        order.items = None;
        let err = InvoiceLayoutEngine::default().layout(&order).unwrap_err();
        assert!(matches!(err, LayoutError::MissingField { field: "items", .. }));
    }

    #[test]
    fn negative_price_is_rejected() {
        let order = sample_order().with_items(vec![
            LineItem::new("Widget", 1.0, 5.0),
            LineItem::new("Refund", 1.0, -5.0),
        ]);
        let err = InvoiceLayoutEngine::default().layout(&order).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidLineItem { row: 2, .. }));
    }

    #[test]
    fn invalid_tax_is_rejected() {
        let settings = LayoutSettings {
            tax_amount: f64::NAN,
            ..LayoutSettings::default()
        };
        let err = InvoiceLayoutEngine::new(settings)
            .totals(&sample_order())
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidTax(_)));
    }

    #[test]
    fn custom_settings_flow_into_the_document() {
        let settings = LayoutSettings {
            company_name: "Northwind".to_owned(),
            currency_label: "USD".to_owned(),
            tax_amount: 2.5,
            footer_lines: vec!["Net 30".to_owned()],
        };
        let document = InvoiceLayoutEngine::new(settings)
            .layout(&sample_order())
            .expect("layout succeeds");
        let page = &document.pages()[0];
        assert!(page.find_text("Northwind").is_some());
        assert!(page.find_text("USD 102.50").is_some());
        assert!(page.find_text("Net 30").is_some());
        assert_eq!(document.title(), "Invoice INV-001");
    }
}
