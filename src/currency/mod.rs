//! Display helpers for monetary amounts.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn symbol(&self) -> &str {
        match self.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "AUD" => "A$",
            other => other,
        }
    }

    pub fn minor_units(&self) -> u8 {
        match self.as_str() {
            "JPY" => 0,
            "KWD" | "BHD" => 3,
            _ => 2,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Decimal and grouping marks used when rendering amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    pub decimal: char,
    pub grouping: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            decimal: '.',
            grouping: ',',
        }
    }
}

impl Separators {
    /// Separators conventionally used by a BCP 47 language tag such as `de-DE`.
    pub fn for_locale(tag: &str) -> Self {
        let tag = tag.trim().replace('_', "-").to_ascii_lowercase();
        let (language, region) = match tag.split_once('-') {
            Some((language, region)) => (language, region),
            None => (tag.as_str(), ""),
        };
        match (language, region) {
            ("de", "ch") | ("it", "ch") => Self { decimal: '.', grouping: '\'' },
            ("de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr", _) => {
                Self { decimal: ',', grouping: '.' }
            }
            ("fr" | "ru" | "pl" | "cs" | "sv" | "nb" | "fi" | "uk", _) => {
                Self { decimal: ',', grouping: ' ' }
            }
            _ => Self::default(),
        }
    }
}

/// Renders `amount` with the currency symbol, the locale's separators and the
/// given precision (the currency's minor units when `None`).
pub fn format_amount(
    amount: f64,
    code: &CurrencyCode,
    separators: &Separators,
    precision: Option<u8>,
) -> String {
    let precision = precision.unwrap_or_else(|| code.minor_units());
    let body = format_number(amount.abs(), precision, separators);
    let sign = if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let symbol = code.symbol();
    if symbol.chars().count() > 2 {
        format!("{sign}{symbol} {body}")
    } else {
        format!("{sign}{symbol}{body}")
    }
}

fn format_number(value: f64, precision: u8, separators: &Separators) -> String {
    let body = format!("{:.*}", precision as usize, value);
    match body.split_once('.') {
        Some((int_part, fraction)) => format!(
            "{}{}{}",
            group_digits(int_part, separators.grouping),
            separators.decimal,
            fraction
        ),
        None => group_digits(&body, separators.grouping),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dollars_with_two_decimals() {
        let usd = CurrencyCode::default();
        let en = Separators::default();
        assert_eq!(format_amount(20.0, &usd, &en, None), "$20.00");
        assert_eq!(format_amount(0.6570841889, &usd, &en, None), "$0.66");
        assert_eq!(format_amount(1234567.5, &usd, &en, None), "$1,234,567.50");
        assert_eq!(format_amount(-3.5, &usd, &en, None), "-$3.50");
    }

    #[test]
    fn respects_currency_minor_units_and_codes() {
        let en = Separators::default();
        assert_eq!(format_amount(1500.0, &CurrencyCode::new("jpy"), &en, None), "¥1,500");
        assert_eq!(format_amount(9.99, &CurrencyCode::new("CHF"), &en, None), "CHF 9.99");
        assert_eq!(format_amount(9.994, &CurrencyCode::new("EUR"), &en, Some(1)), "€10.0");
    }

    #[test]
    fn locale_selects_separators() {
        let eur = CurrencyCode::new("EUR");
        let de = Separators::for_locale("de-DE");
        let fr = Separators::for_locale("fr_FR");
        assert_eq!(format_amount(1234567.5, &eur, &de, None), "€1.234.567,50");
        assert_eq!(format_amount(-1234.5, &eur, &fr, None), "-€1 234,50");
        assert_eq!(Separators::for_locale("de-CH").grouping, '\'');
        assert_eq!(Separators::for_locale("en-GB"), Separators::default());
        assert_eq!(Separators::for_locale("unknown"), Separators::default());
    }
}
