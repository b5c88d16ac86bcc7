//! Labeled summary of an extracted invoice.

use std::fmt;

use crate::models::invoice::{ConfidenceRange, ExtractedInvoice};

use super::format::{format_currency, format_long_date};

/// Shown for optional contact fields the provider left empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single `label: value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
}

/// A titled group of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySection {
    pub title: &'static str,
    pub lines: Vec<SummaryLine>,
}

/// Display-ready view of an [`ExtractedInvoice`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSummary {
    pub sections: Vec<SummarySection>,
    pub confidence: Option<ConfidenceRange>,
}

fn line(label: &'static str, value: impl Into<String>) -> SummaryLine {
    SummaryLine {
        label,
        value: value.into(),
    }
}

fn or_not_available(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

impl InvoiceSummary {
    pub fn from_invoice(invoice: &ExtractedInvoice) -> Self {
        let currency = invoice.display_currency();

        let merchant = SummarySection {
            title: "Merchant Details",
            lines: vec![
                line("Name", invoice.merchant_name.value.as_str()),
                line("Address", invoice.merchant_address.value.as_str()),
                line("Phone", or_not_available(Some(invoice.merchant_phone.value.as_str()))),
                line("Email", or_not_available(invoice.merchant_email.value.as_deref())),
            ],
        };

        let location = SummarySection {
            title: "Location",
            lines: vec![
                line("City", invoice.merchant_city.value.as_str()),
                line("State", invoice.merchant_state.value.as_str()),
                line("Country", invoice.merchant_country.value.as_str()),
                line("Postal Code", invoice.merchant_postal_code.value.as_str()),
            ],
        };

        let details = SummarySection {
            title: "Invoice Details",
            lines: vec![
                line("Date", format_long_date(&invoice.date_time.value)),
                line("Currency", invoice.currency_code.value.as_str()),
                line("Tax Amount", format_currency(invoice.tax_amount.value, currency)),
                line("Total Amount", format_currency(invoice.total_amount.value, currency)),
            ],
        };

        Self {
            sections: vec![merchant, location, details],
            confidence: invoice.confidence_range(),
        }
    }

    /// Look up the value rendered for a label.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter())
            .find(|l| l.label == label)
            .map(|l| l.value.as_str())
    }
}

impl fmt::Display for InvoiceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extracted Information")?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.title)?;
            for line in &section.lines {
                writeln!(f, "  {}: {}", line.label, line.value)?;
            }
        }
        if let Some(range) = &self.confidence {
            writeln!(f)?;
            writeln!(f, "Confidence: {}", range)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::ExtractedField;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn sample() -> ExtractedInvoice {
        ExtractedInvoice {
            total_amount: ExtractedField::new(Decimal::new(15000, 2), 0.98),
            tax_amount: ExtractedField::new(Decimal::new(1125, 2), 0.99),
            date_time: ExtractedField::new("2024-01-15".to_string(), 0.99),
            currency_code: ExtractedField::new("USD".to_string(), 0.99),
            merchant_name: ExtractedField::new("Acme Builders".to_string(), 0.99),
            merchant_address: ExtractedField::new("1 Main St".to_string(), 0.99),
            merchant_country: ExtractedField::new("US".to_string(), 0.99),
            merchant_state: ExtractedField::new("TX".to_string(), 0.99),
            merchant_city: ExtractedField::new("Austin".to_string(), 0.99),
            merchant_postal_code: ExtractedField::new("78701".to_string(), 0.99),
            merchant_phone: ExtractedField::new(String::new(), 0.99),
            merchant_email: ExtractedField::new(None, 0.99),
        }
    }

    #[test]
    fn test_summary_values() {
        let summary = InvoiceSummary::from_invoice(&sample());

        assert_eq!(summary.value("Total Amount"), Some("$150.00"));
        assert_eq!(summary.value("Tax Amount"), Some("$11.25"));
        assert_eq!(summary.value("Date"), Some("January 15, 2024"));
        assert_eq!(summary.value("Phone"), Some(NOT_AVAILABLE));
        assert_eq!(summary.value("Email"), Some(NOT_AVAILABLE));
        assert_eq!(summary.value("Postal Code"), Some("78701"));
    }

    #[test]
    fn test_missing_currency_formats_as_usd() {
        let mut invoice = sample();
        invoice.currency_code.value = String::new();
        invoice.merchant_email.value = Some("billing@acme.test".to_string());

        let summary = InvoiceSummary::from_invoice(&invoice);
        assert_eq!(summary.value("Currency"), Some(""));
        assert_eq!(summary.value("Total Amount"), Some("$150.00"));
        assert_eq!(summary.value("Email"), Some("billing@acme.test"));
    }

    #[test]
    fn test_display() {
        let text = InvoiceSummary::from_invoice(&sample()).to_string();

        let expected = "\
Extracted Information

Merchant Details
  Name: Acme Builders
  Address: 1 Main St
  Phone: N/A
  Email: N/A

Location
  City: Austin
  State: TX
  Country: US
  Postal Code: 78701

Invoice Details
  Date: January 15, 2024
  Currency: USD
  Tax Amount: $11.25
  Total Amount: $150.00

Confidence: 98%–99%
";
        assert_eq!(text, expected);
    }
}
