//! Order records as delivered by the order management API.
//!
//! The structures mirror the JSON payload one to one (camelCase field names).
//! `billTo` and `items` are optional on purpose: a single malformed record must
//! not poison the whole list, so the check happens when an invoice is laid out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an order. The API hands out numbers, but strings are accepted too.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderId {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

/// The party an invoice is billed to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub email: String,
    pub address: String,
}

impl Party {
    /// Creates a party from its three display fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
        }
    }
}

/// A single billed line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    /// Creates a line item.
    pub fn new(item: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            item: item.into(),
            quantity,
            unit_price,
        }
    }

    /// Quantity multiplied by unit price.
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// An order snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub invoice_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub bill_to: Option<Party>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
}

impl Order {
    /// Creates an order with the given identifier and invoice number and no other content.
    pub fn new(id: impl Into<OrderId>, invoice_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            invoice_number: invoice_number.into(),
            date: String::new(),
            status: String::new(),
            bill_to: None,
            items: None,
        }
    }

    /// Sets the invoice date and returns the updated order.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the status and returns the updated order.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the billed party and returns the updated order.
    pub fn with_bill_to(mut self, bill_to: Party) -> Self {
        self.bill_to = Some(bill_to);
        self
    }

    /// Replaces the line items and returns the updated order.
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = LineItem>,
    {
        self.items = Some(items.into_iter().collect());
        self
    }

    /// Line items, or an empty slice when the record carries none.
    pub fn items_or_empty(&self) -> &[LineItem] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Label shown in selection lists: `<invoiceNumber> - <billTo.name>`.
    pub fn selection_label(&self) -> String {
        let name = self
            .bill_to
            .as_ref()
            .map(|party| party.name.as_str())
            .unwrap_or("(missing)");
        format!("{} - {}", self.invoice_number, name)
    }
}

/// Decodes a JSON array of orders.
pub fn orders_from_json(bytes: &[u8]) -> Result<Vec<Order>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": 1,
            "invoiceNumber": "INV-001",
            "date": "2024-01-01",
            "status": "Paid",
            "billTo": {"name": "Acme", "email": "a@acme.com", "address": "1 Main St"},
            "items": [{"item": "Widget", "quantity": 2, "unitPrice": 50.0}]
        },
        {"id": "b-2", "invoiceNumber": "INV-002", "date": "2024-01-02", "status": "Due"}
    ]"#;

    #[test]
    fn decodes_camel_case_payload() {
        let orders = orders_from_json(SAMPLE.as_bytes()).expect("valid payload");
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, OrderId::Number(1));
        assert_eq!(orders[0].invoice_number, "INV-001");
        assert_eq!(orders[0].bill_to.as_ref().map(|p| p.name.as_str()), Some("Acme"));
        assert_eq!(orders[0].items_or_empty()[0].unit_price, 50.0);
    }

    #[test]
    fn missing_bill_to_and_items_decode_as_none() {
        let orders = orders_from_json(SAMPLE.as_bytes()).expect("valid payload");
        assert_eq!(orders[1].id.to_string(), "b-2");
        assert!(orders[1].bill_to.is_none());
        assert!(orders[1].items.is_none());
        assert_eq!(orders[1].selection_label(), "INV-002 - (missing)");
    }

    #[test]
    fn line_total_multiplies_quantity_and_price() {
        assert_eq!(LineItem::new("Bolt", 3.0, 2.5).line_total(), 7.5);
    }
}
