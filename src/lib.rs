//! Core entry point for the order_invoice crate.
//!
//! Orders come from an [`repository::OrderRepository`], the
//! [`layout::InvoiceLayoutEngine`] turns the selected one into an
//! [`model::InvoiceDocument`], [`render::PdfRenderer`] serializes it, and a
//! [`sink::DocumentSink`] stores the bytes.

pub mod config;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod money;
pub mod order;
pub mod pipeline;
pub mod render;
pub mod repository;
pub mod shell;
pub mod sink;
