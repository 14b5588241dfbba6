//! Value formatting
//!
//! Turns the animated number into display text. Rounding happens here only;
//! the animator keeps full precision between frames.

use countup_core::{parse_float_prefix, DisplayTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Caller-supplied formatter
#[derive(Clone)]
pub struct CustomFormat(Rc<dyn Fn(f64) -> String>);

impl CustomFormat {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFormat(..)")
    }
}

/// How a value is rendered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// Grouped, no fractional digits
    #[default]
    Int,
    /// Grouped, up to two fractional digits with trailing zeros trimmed
    Decimal,
    /// Full override; grouping and rounding are skipped
    #[serde(skip)]
    Custom(CustomFormat),
}

impl NumberFormat {
    /// Wrap a caller-supplied formatter
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + 'static,
    {
        NumberFormat::Custom(CustomFormat::new(f))
    }

    /// Interpret a format name
    ///
    /// Exactly `"int"` selects [`NumberFormat::Int`]; any other name,
    /// including `"INT"` or `" int"`, renders with fractional digits.
    pub fn from_name(name: &str) -> Self {
        if name == "int" {
            NumberFormat::Int
        } else {
            NumberFormat::Decimal
        }
    }

    fn max_fraction_digits(&self) -> usize {
        match self {
            NumberFormat::Decimal => 2,
            _ => 0,
        }
    }
}

/// Separators used when rendering and reading numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    #[serde(default = "default_group_separator")]
    pub group_separator: char,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
}

fn default_group_separator() -> char {
    ','
}

fn default_decimal_separator() -> char {
    '.'
}

impl NumberLocale {
    pub fn new(group_separator: char, decimal_separator: char) -> Self {
        Self {
            group_separator,
            decimal_separator,
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::new(default_group_separator(), default_decimal_separator())
    }
}

/// Render `value` according to `format`
///
/// # Example
///
/// ```
/// use countup_animation::{format_value, NumberFormat, NumberLocale};
///
/// let locale = NumberLocale::default();
/// assert_eq!(format_value(1234.7, &NumberFormat::Int, &locale), "1,235");
/// assert_eq!(format_value(1234.5, &NumberFormat::Decimal, &locale), "1,234.5");
/// ```
pub fn format_value(value: f64, format: &NumberFormat, locale: &NumberLocale) -> String {
    if let NumberFormat::Custom(custom) = format {
        return custom.call(value);
    }

    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value < 0.0 { "-∞" } else { "∞" };
        return text.to_string();
    }

    let digits = format.max_fraction_digits();
    let scale = 10f64.powi(digits as i32);
    // Half away from zero
    let rounded = (value.abs() * scale).round() / scale;
    let rendered = format!("{:.*}", digits, rounded);

    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (rendered.as_str(), ""),
    };

    let mut out = String::with_capacity(rendered.len() + rendered.len() / 3 + 1);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    push_grouped(&mut out, int_part, locale.group_separator);
    if !frac_part.is_empty() {
        out.push(locale.decimal_separator);
        out.push_str(frac_part);
    }
    out
}

fn push_grouped(out: &mut String, digits: &str, separator: char) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}

/// Read the number a target currently displays
///
/// Grouping separators are stripped and the leading numeric prefix is
/// parsed. Unparsable text reads as `0`.
pub fn read_displayed_number(target: &dyn DisplayTarget, locale: &NumberLocale) -> f64 {
    let text = target.text();
    let mut normalized: String = text
        .chars()
        .filter(|c| *c != locale.group_separator)
        .collect();
    if locale.decimal_separator != '.' {
        normalized = normalized.replace(locale.decimal_separator, ".");
    }

    match parse_float_prefix(&normalized) {
        Some(value) if !value.is_nan() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countup_core::prelude::*;

    fn en() -> NumberLocale {
        NumberLocale::default()
    }

    #[test]
    fn test_int_format() {
        assert_eq!(format_value(1234.7, &NumberFormat::Int, &en()), "1,235");
        assert_eq!(format_value(999.4, &NumberFormat::Int, &en()), "999");
        assert_eq!(format_value(2.5, &NumberFormat::Int, &en()), "3");
        assert_eq!(format_value(1_000_000.0, &NumberFormat::Int, &en()), "1,000,000");
        assert_eq!(format_value(-98765.2, &NumberFormat::Int, &en()), "-98,765");
    }

    #[test]
    fn test_decimal_format() {
        assert_eq!(format_value(1234.5, &NumberFormat::Decimal, &en()), "1,234.5");
        assert_eq!(format_value(1234.0, &NumberFormat::Decimal, &en()), "1,234");
        assert_eq!(format_value(0.125, &NumberFormat::Decimal, &en()), "0.13");
        assert_eq!(format_value(7.12345, &NumberFormat::Decimal, &en()), "7.12");
        assert_eq!(format_value(-0.5, &NumberFormat::Decimal, &en()), "-0.5");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_value(-0.4, &NumberFormat::Int, &en()), "0");
        assert_eq!(format_value(-0.001, &NumberFormat::Decimal, &en()), "0");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_value(f64::NAN, &NumberFormat::Int, &en()), "NaN");
        assert_eq!(format_value(f64::INFINITY, &NumberFormat::Decimal, &en()), "∞");
        assert_eq!(format_value(f64::NEG_INFINITY, &NumberFormat::Int, &en()), "-∞");
    }

    #[test]
    fn test_custom_format_bypasses_rounding() {
        let format = NumberFormat::custom(|v| format!("${:.3}", v));
        assert_eq!(format_value(1234.5678, &format, &en()), "$1234.568");
    }

    #[test]
    fn test_other_locale() {
        let de = NumberLocale::new('.', ',');
        assert_eq!(format_value(1234.5, &NumberFormat::Decimal, &de), "1.234,5");
    }

    #[test]
    fn test_format_from_name() {
        assert!(matches!(NumberFormat::from_name("int"), NumberFormat::Int));
        assert!(matches!(NumberFormat::from_name("decimal"), NumberFormat::Decimal));
        assert!(matches!(NumberFormat::from_name("percent"), NumberFormat::Decimal));
        assert!(matches!(NumberFormat::from_name("INT"), NumberFormat::Decimal));
        assert!(matches!(NumberFormat::from_name(" int"), NumberFormat::Decimal));
    }

    #[test]
    fn test_read_displayed_number() {
        assert_eq!(read_displayed_number(&TextBuffer::with_text("1,234"), &en()), 1234.0);
        assert_eq!(read_displayed_number(&TextBuffer::with_text("12.5%"), &en()), 12.5);
        assert_eq!(read_displayed_number(&TextBuffer::with_text("n/a"), &en()), 0.0);
        assert_eq!(read_displayed_number(&TextBuffer::new(), &en()), 0.0);

        let de = NumberLocale::new('.', ',');
        assert_eq!(read_displayed_number(&TextBuffer::with_text("1.234,5"), &de), 1234.5);
    }
}
