//! Invoice data as returned by the Vision Parser `simple` response type.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// A value extracted by the provider together with its confidence score.
///
/// Fields the provider did not return keep `confidence: None` and are left
/// out of the confidence range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: FieldValue"))]
pub struct ExtractedField<T> {
    /// Extracted value. `null`, missing and unusable values become `T::default()`.
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: T,

    /// Confidence score (0.0 - 1.0).
    #[serde(
        default,
        deserialize_with = "lenient_confidence",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<f64>,
}

impl<T> ExtractedField<T> {
    pub fn new(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence: Some(confidence),
        }
    }
}

/// Conversion from an arbitrary JSON value returned by the provider.
///
/// The payload is untrusted, so a single odd value must not reject the
/// whole response.
pub trait FieldValue: Default + Sized {
    fn from_json(value: Value) -> Self;
}

impl FieldValue for String {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

impl FieldValue for Option<String> {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => None,
            other => Some(String::from_json(other)),
        }
    }
}

impl FieldValue for Decimal {
    fn from_json(value: Value) -> Self {
        let text = match &value {
            Value::Null => return Decimal::ZERO,
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => String::new(),
        };

        match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
            Ok(amount) => amount.normalize(),
            Err(_) => {
                debug!(value = %value, "amount is not numeric, using zero");
                Decimal::ZERO
            }
        }
    }
}

fn lenient_value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FieldValue,
{
    Ok(T::from_json(Value::deserialize(deserializer)?))
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let confidence = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if confidence.is_none() && !value.is_null() {
        debug!(value = %value, "ignoring non-numeric confidence");
    }
    Ok(confidence)
}

/// Fields extracted from a single invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedInvoice {
    /// Invoice total.
    pub total_amount: ExtractedField<Decimal>,

    /// Tax portion of the total.
    pub tax_amount: ExtractedField<Decimal>,

    /// Invoice date as written by the provider (usually ISO 8601).
    pub date_time: ExtractedField<String>,

    /// ISO 4217 currency code, may be empty.
    pub currency_code: ExtractedField<String>,

    pub merchant_name: ExtractedField<String>,
    pub merchant_address: ExtractedField<String>,
    pub merchant_country: ExtractedField<String>,
    pub merchant_state: ExtractedField<String>,
    pub merchant_city: ExtractedField<String>,
    pub merchant_postal_code: ExtractedField<String>,
    pub merchant_phone: ExtractedField<String>,

    /// Merchant email, absent on most invoices.
    pub merchant_email: ExtractedField<Option<String>>,
}

/// Success body of the relay: the provider response passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub data: ExtractedInvoice,
}

/// One extracted field flattened to text.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// Provider field name, e.g. `totalAmount`.
    pub name: &'static str,
    pub value: String,
    /// `None` when the provider did not return the field.
    pub confidence: Option<f64>,
}

/// Lowest and highest confidence across the returned fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceRange {
    pub min: f64,
    pub max: f64,
}

impl ConfidenceRange {
    /// Minimum as a whole percentage.
    pub fn min_percent(&self) -> f64 {
        (self.min * 100.0).round()
    }

    /// Maximum as a whole percentage.
    pub fn max_percent(&self) -> f64 {
        (self.max * 100.0).round()
    }
}

impl std::fmt::Display for ConfidenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%–{}%", self.min_percent(), self.max_percent())
    }
}

impl ExtractedInvoice {
    /// Every field as a flat entry, in provider order.
    pub fn entries(&self) -> Vec<FieldEntry> {
        let text = |name, field: &ExtractedField<String>| FieldEntry {
            name,
            value: field.value.clone(),
            confidence: field.confidence,
        };
        let amount = |name, field: &ExtractedField<Decimal>| FieldEntry {
            name,
            value: field.value.to_string(),
            confidence: field.confidence,
        };

        vec![
            amount("totalAmount", &self.total_amount),
            amount("taxAmount", &self.tax_amount),
            text("dateTime", &self.date_time),
            text("currencyCode", &self.currency_code),
            text("merchantName", &self.merchant_name),
            text("merchantAddress", &self.merchant_address),
            text("merchantCountry", &self.merchant_country),
            text("merchantState", &self.merchant_state),
            text("merchantCity", &self.merchant_city),
            text("merchantPostalCode", &self.merchant_postal_code),
            text("merchantPhone", &self.merchant_phone),
            FieldEntry {
                name: "merchantEmail",
                value: self.merchant_email.value.clone().unwrap_or_default(),
                confidence: self.merchant_email.confidence,
            },
        ]
    }

    /// Confidence of every field the provider returned, in provider order.
    pub fn confidences(&self) -> impl Iterator<Item = f64> {
        self.entries()
            .into_iter()
            .filter_map(|entry| entry.confidence)
    }

    /// Compute the confidence range, ignoring non-finite scores.
    pub fn confidence_range(&self) -> Option<ConfidenceRange> {
        self.confidences()
            .filter(|c| c.is_finite())
            .fold(None, |range, c| match range {
                None => Some(ConfidenceRange { min: c, max: c }),
                Some(r) => Some(ConfidenceRange {
                    min: r.min.min(c),
                    max: r.max.max(c),
                }),
            })
    }

    /// Currency code to format amounts with, falling back to USD.
    pub fn display_currency(&self) -> &str {
        let code = self.currency_code.value.trim();
        if code.is_empty() { "USD" } else { code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "data": {
            "totalAmount": {"value": 150.00, "confidence": 0.98},
            "taxAmount": {"value": 12.5, "confidence": 0.985},
            "dateTime": {"value": "2024-01-15T00:00:00", "confidence": 0.99},
            "currencyCode": {"value": "USD", "confidence": 0.99},
            "merchantName": {"value": "Acme Builders", "confidence": 0.99},
            "merchantAddress": {"value": "1 Main St", "confidence": 0.98},
            "merchantCountry": {"value": "US", "confidence": 0.99},
            "merchantState": {"value": "TX", "confidence": 0.99},
            "merchantCity": {"value": "Austin", "confidence": 0.99},
            "merchantPostalCode": {"value": "78701", "confidence": 0.99},
            "merchantPhone": {"value": "", "confidence": 0.99},
            "merchantEmail": {"value": null, "confidence": 0.99}
        }
    }"#;

    #[test]
    fn test_parse_simple_response() {
        let response: ParseResponse = serde_json::from_str(SAMPLE).unwrap();
        let data = response.data;

        assert_eq!(data.total_amount.value, Decimal::new(150, 0));
        assert_eq!(data.tax_amount.value, Decimal::new(125, 1));
        assert_eq!(data.merchant_name.value, "Acme Builders");
        assert_eq!(data.merchant_email.value, None);
        assert_eq!(data.merchant_phone.value, "");
    }

    #[test]
    fn test_null_and_missing_values_default() {
        let json = r#"{"merchantName": {"value": null, "confidence": 0.4}, "taxAmount": {}}"#;
        let data: ExtractedInvoice = serde_json::from_str(json).unwrap();

        assert_eq!(data.merchant_name, ExtractedField::new(String::new(), 0.4));
        assert_eq!(data.tax_amount.value, Decimal::ZERO);
        assert_eq!(data.tax_amount.confidence, None);
        assert_eq!(data.currency_code.value, "");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"merchantName": {"value": "X", "confidence": 1.0}, "lineItems": []}"#;
        let data: ExtractedInvoice = serde_json::from_str(json).unwrap();
        assert_eq!(data.merchant_name.value, "X");
    }

    #[test]
    fn test_confidence_range() {
        let response: ParseResponse = serde_json::from_str(SAMPLE).unwrap();
        let range = response.data.confidence_range().unwrap();

        assert_eq!(range.min, 0.98);
        assert_eq!(range.max, 0.99);
        assert_eq!(range.to_string(), "98%–99%");
    }

    #[test]
    fn test_confidence_range_skips_nan() {
        let mut data = ExtractedInvoice::default();
        data.total_amount.confidence = Some(f64::NAN);
        data.tax_amount.confidence = Some(0.5);
        data.merchant_name.confidence = Some(0.75);

        let range = data.confidence_range().unwrap();
        assert_eq!(range.min, 0.5);
        assert_eq!(range.max, 0.75);
    }

    #[test]
    fn test_confidence_range_only_counts_returned_fields() {
        let json = r#"{"data": {"totalAmount": {"value": 150.00, "confidence": 0.98},
  "currencyCode": {"value": "USD", "confidence": 0.99}}}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();

        let range = response.data.confidence_range().unwrap();
        assert_eq!(range.to_string(), "98%–99%");
        assert_eq!(response.data.merchant_name.confidence, None);
    }

    #[test]
    fn test_confidence_range_empty_payload() {
        let response: ParseResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert_eq!(response.data.confidence_range(), None);
    }

    #[test]
    fn test_mismatched_value_types_are_tolerated() {
        let json = r#"{"data": {
            "merchantPostalCode": {"value": 78701, "confidence": 0.97},
            "merchantPhone": {"value": 5551234, "confidence": 0.9},
            "merchantName": {"value": true, "confidence": 0.5},
            "totalAmount": {"value": "150.00", "confidence": 0.98},
            "taxAmount": {"value": "n/a", "confidence": 0.4}
        }}"#;
        let data = serde_json::from_str::<ParseResponse>(json).unwrap().data;

        assert_eq!(data.merchant_postal_code.value, "78701");
        assert_eq!(data.merchant_phone.value, "5551234");
        assert_eq!(data.merchant_name.value, "true");
        assert_eq!(data.total_amount.value, Decimal::new(150, 0));
        assert_eq!(data.tax_amount.value, Decimal::ZERO);
        assert_eq!(data.tax_amount.confidence, Some(0.4));
    }

    #[test]
    fn test_null_confidence_treated_as_missing() {
        let json = r#"{"data": {
            "merchantEmail": {"value": null, "confidence": null},
            "merchantCity": {"value": "Austin", "confidence": 0.9}
        }}"#;
        let data = serde_json::from_str::<ParseResponse>(json).unwrap().data;

        assert_eq!(data.merchant_email, ExtractedField { value: None, confidence: None });
        let range = data.confidence_range().unwrap();
        assert_eq!(range.min, 0.9);
        assert_eq!(range.max, 0.9);
    }

    #[test]
    fn test_entries() {
        let response: ParseResponse = serde_json::from_str(SAMPLE).unwrap();
        let entries = response.data.entries();

        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].name, "totalAmount");
        assert_eq!(entries[0].value, "150");
        assert_eq!(entries[11].name, "merchantEmail");
        assert_eq!(entries[11].value, "");
    }

    #[test]
    fn test_confidences() {
        let mut data = ExtractedInvoice::default();
        data.merchant_city.confidence = Some(0.6);
        data.merchant_email.confidence = Some(0.7);

        let confidences: Vec<f64> = data.confidences().collect();
        assert_eq!(confidences, vec![0.6, 0.7]);
    }

    #[test]
    fn test_display_currency_defaults_to_usd() {
        let mut data = ExtractedInvoice::default();
        assert_eq!(data.display_currency(), "USD");

        data.currency_code.value = "EUR".to_string();
        assert_eq!(data.display_currency(), "EUR");
    }
}
