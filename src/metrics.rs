//! Headline metric extraction from normalized document text.
//!
//! [`RegexMetricExtractor`] scans lower-cased text with one pattern per
//! [`MetricKey`]. Each pattern is a label phrase, an optional colon, an
//! optional `$`, then a number with optional thousands separators and at most
//! two decimals. Patterns are unanchored: `"revenue 2023: 1,000"` yields
//! `2023` for revenue. A stricter strategy can be plugged in through the
//! [`MetricExtractor`] trait.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The fixed metric vocabulary, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Revenue,
    NetIncome,
    TotalAssets,
    TotalLiabilities,
    Cash,
    Expenses,
}

impl MetricKey {
    pub const ALL: [MetricKey; 6] = [
        MetricKey::Revenue,
        MetricKey::NetIncome,
        MetricKey::TotalAssets,
        MetricKey::TotalLiabilities,
        MetricKey::Cash,
        MetricKey::Expenses,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Revenue => "revenue",
            MetricKey::NetIncome => "net_income",
            MetricKey::TotalAssets => "total_assets",
            MetricKey::TotalLiabilities => "total_liabilities",
            MetricKey::Cash => "cash",
            MetricKey::Expenses => "expenses",
        }
    }

    /// Display label: `net_income` → `Net Income`.
    pub fn label(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn pattern(self) -> String {
        let label = match self {
            MetricKey::Revenue => r"revenue[s]?",
            MetricKey::NetIncome => r"net\s+income",
            MetricKey::TotalAssets => r"total\s+assets",
            MetricKey::TotalLiabilities => r"total\s+liabilities",
            MetricKey::Cash => r"cash\s*(?:and\s+equivalents)?",
            MetricKey::Expenses => r"(?:total\s+)?expenses?",
        };
        format!(r"(?i){}\s*:?\s*\$?({})", label, AMOUNT)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ASCII digits, optional `,ddd` groups, optional two-place decimals.
const AMOUNT: &str = r"[0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?";

static PATTERNS: Lazy<Vec<(MetricKey, Regex)>> = Lazy::new(|| {
    MetricKey::ALL
        .iter()
        .map(|&key| (key, Regex::new(&key.pattern()).expect("valid metric regex")))
        .collect()
});

/// One match is stored as a scalar; several are kept in text order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl MetricValue {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(MetricValue::Scalar),
            _ => Some(MetricValue::Series(values)),
        }
    }

    /// The value shown on the metrics panel: the scalar, or the first match.
    pub fn headline(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::Series(values) => values.first().copied(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match self {
            MetricValue::Scalar(v) => vec![*v],
            MetricValue::Series(values) => values.clone(),
        }
    }
}

/// Extracted metrics. A missing key means "not found", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<MetricKey, MetricValue>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: MetricKey, value: MetricValue) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: MetricKey) -> Option<&MetricValue> {
        self.0.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, &MetricValue)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strategy seam: text in, metrics out.
pub trait MetricExtractor {
    fn extract(&self, text: &str) -> MetricSet;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMetricExtractor;

impl MetricExtractor for RegexMetricExtractor {
    fn extract(&self, text: &str) -> MetricSet {
        let lowered = text.to_lowercase();
        let mut metrics = MetricSet::new();

        for (key, re) in PATTERNS.iter() {
            let values: Vec<f64> = re
                .captures_iter(&lowered)
                .filter_map(|caps| caps.get(1))
                .filter_map(|m| parse_amount(m.as_str()))
                .collect();
            if let Some(value) = MetricValue::from_values(values) {
                tracing::debug!(metric = %key, ?value, "metric found");
                metrics.insert(*key, value);
            }
        }

        metrics
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

/// `1234.5` → `$1,234.50`.
pub fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> MetricSet {
        RegexMetricExtractor.extract(text)
    }

    #[test]
    fn single_revenue_is_scalar() {
        let m = extract("Revenue: $1,234.56");
        assert_eq!(m.get(MetricKey::Revenue), Some(&MetricValue::Scalar(1234.56)));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn repeated_revenue_is_series_in_text_order() {
        let m = extract("Revenue: $500\nQ2 Revenues: 1,200.00\n");
        assert_eq!(
            m.get(MetricKey::Revenue),
            Some(&MetricValue::Series(vec![500.0, 1200.0]))
        );
    }

    #[test]
    fn no_phrases_yields_empty_set() {
        assert!(extract("Quarterly update: the team grew by 4 people.").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn every_metric_is_recognized() {
        let text = "\
            Total Revenue: $10,000\n\
            Net Income: $2,500.75\n\
            Total Assets: 50,000\n\
            Total Liabilities: $20,000\n\
            Cash and equivalents: $7,000\n\
            Total Expenses: 7,499.25\n";
        let m = extract(text);
        assert_eq!(m.get(MetricKey::Revenue), Some(&MetricValue::Scalar(10000.0)));
        assert_eq!(m.get(MetricKey::NetIncome), Some(&MetricValue::Scalar(2500.75)));
        assert_eq!(m.get(MetricKey::TotalAssets), Some(&MetricValue::Scalar(50000.0)));
        assert_eq!(
            m.get(MetricKey::TotalLiabilities),
            Some(&MetricValue::Scalar(20000.0))
        );
        assert_eq!(m.get(MetricKey::Cash), Some(&MetricValue::Scalar(7000.0)));
        assert_eq!(m.get(MetricKey::Expenses), Some(&MetricValue::Scalar(7499.25)));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = extract("NET   INCOME 42");
        assert_eq!(m.get(MetricKey::NetIncome), Some(&MetricValue::Scalar(42.0)));
    }

    #[test]
    fn unanchored_patterns_keep_false_positives() {
        // The year after the label is taken as the amount.
        let m = extract("Revenue 2023: 1,000");
        assert_eq!(m.get(MetricKey::Revenue), Some(&MetricValue::Scalar(2023.0)));

        // "expense" inside a longer word still matches.
        let m = extract("nonexpense 12");
        assert_eq!(m.get(MetricKey::Expenses), Some(&MetricValue::Scalar(12.0)));
    }

    #[test]
    fn decimals_are_cut_at_two_places() {
        let m = extract("cash: 1,234,567.891");
        assert_eq!(m.get(MetricKey::Cash), Some(&MetricValue::Scalar(1234567.89)));

        let m = extract("cash: 1234,56");
        assert_eq!(m.get(MetricKey::Cash), Some(&MetricValue::Scalar(1234.0)));
    }

    #[test]
    fn iteration_follows_vocabulary_order() {
        let m = extract("expenses: 1\ncash: 2\nrevenue: 3");
        let keys: Vec<_> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![MetricKey::Revenue, MetricKey::Cash, MetricKey::Expenses]
        );
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let m = extract("Net income: 10\nRevenue: 1\nRevenue: 2");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json, serde_json::json!({"revenue": [1.0, 2.0], "net_income": 10.0}));
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(MetricKey::NetIncome.label(), "Net Income");
        assert_eq!(MetricKey::TotalLiabilities.label(), "Total Liabilities");
        assert_eq!(MetricKey::Cash.label(), "Cash");
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(1234.56), "$1,234.56");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(12.0), "$12.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-999.5), "$-999.50");
    }

    #[test]
    fn headline_is_first_value() {
        assert_eq!(MetricValue::Series(vec![3.0, 4.0]).headline(), Some(3.0));
        assert_eq!(MetricValue::Scalar(9.0).headline(), Some(9.0));
    }

    #[test]
    fn amounts_are_ascii_digits_only() {
        let metrics = RegexMetricExtractor.extract("Revenue: \u{0663}\u{0664}\nCash: \u{FF15}");
        assert!(metrics.is_empty());
    }
}
