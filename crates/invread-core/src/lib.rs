//! Core library for the invoice reader.
//!
//! This crate provides:
//! - The data model returned by the Vision Parser extraction API
//! - The normalized error body shared by the relay and its clients
//! - Relay and client configuration
//! - Rendering of extracted invoices into a human-readable summary

pub mod error;
pub mod models;
pub mod presenter;

pub use error::{InvreadError, Result};
pub use models::config::{ClientConfig, InvreadConfig, RelayConfig};
pub use models::invoice::{
    ConfidenceRange, ExtractedField, ExtractedInvoice, FieldEntry, FieldValue, ParseResponse,
};
pub use models::response::ErrorBody;
pub use presenter::{InvoiceSummary, format_currency, format_long_date};
