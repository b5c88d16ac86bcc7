//! Rendering of extracted invoices for display.
//!
//! Formatting is fixed to US English and the Gregorian calendar.

mod format;
mod summary;

pub use format::{INVALID_DATE, format_currency, format_long_date, parse_date};
pub use summary::{InvoiceSummary, NOT_AVAILABLE, SummaryLine, SummarySection};
