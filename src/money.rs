//! Invoice arithmetic and number formatting.

use crate::order::LineItem;

/// Flat tax added to every invoice unless configured otherwise.
pub const DEFAULT_TAX_AMOUNT: f64 = 10.0;

/// Currency label printed in front of every amount unless configured otherwise.
pub const DEFAULT_CURRENCY_LABEL: &str = "INR";

/// Subtotal, tax, and total of an invoice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl InvoiceTotals {
    /// Sums the line totals and adds the flat `tax` amount.
    pub fn compute(items: &[LineItem], tax: f64) -> Self {
        let subtotal = items.iter().map(LineItem::line_total).sum::<f64>();
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

/// Formats `amount` with exactly two decimals behind `label`, e.g. `INR 12.50`.
pub fn format_currency(label: &str, amount: f64) -> String {
    // `-0.00` would otherwise leak out of tiny negative rounding residue.
    let rounded = format!("{:.2}", amount);
    let rounded = if rounded == "-0.00" { "0.00".to_owned() } else { rounded };
    if label.is_empty() {
        rounded
    } else {
        format!("{label} {rounded}")
    }
}

/// Formats a quantity the way it was supplied: `2`, `2.5`, `0.125`.
pub fn format_quantity(quantity: f64) -> String {
    if quantity == 0.0 {
        return "0".to_owned();
    }
    format!("{quantity}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_has_two_decimals() {
        assert_eq!(format_currency("INR", 12.5), "INR 12.50");
        assert_eq!(format_currency("INR", 100.0), "INR 100.00");
        assert_eq!(format_currency("INR", 0.005), "INR 0.01");
        assert_eq!(format_currency("", 3.0), "3.00");
    }

    #[test]
    fn currency_formatting_is_idempotent() {
        let first = format_currency("INR", 1234.567);
        let second = format_currency("INR", 1234.567);
        assert_eq!(first, second);
        assert_eq!(first, "INR 1234.57");
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(format_currency("INR", -0.0), "INR 0.00");
        assert_eq!(format_currency("INR", -0.001), "INR 0.00");
    }

    #[test]
    fn quantity_keeps_its_own_precision() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(-0.0), "0");
    }

    #[test]
    fn totals_add_flat_tax() {
        let items = vec![
            LineItem::new("Widget", 2.0, 50.0),
            LineItem::new("Gadget", 3.0, 19.99),
        ];
        let totals = InvoiceTotals::compute(&items, DEFAULT_TAX_AMOUNT);
        assert!((totals.subtotal - 159.97).abs() < 0.005);
        assert_eq!(totals.tax, 10.0);
        assert!((totals.total - (totals.subtotal + 10.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_items_total_equals_tax() {
        let totals = InvoiceTotals::compute(&[], DEFAULT_TAX_AMOUNT);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.total, 10.0);
        assert_eq!(format_currency("INR", totals.subtotal), "INR 0.00");
        assert_eq!(format_currency("INR", totals.total), "INR 10.00");
    }
}
