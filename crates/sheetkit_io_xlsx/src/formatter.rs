//! Value formatter: renders field values as cell text.
//!
//! Temporal values use date patterns written with the usual pattern letters
//! (`yyyy-MM-dd HH:mm:ss`). Patterns are translated to `chrono` strftime
//! items; a pattern that cannot be translated, or that asks for fields the
//! value does not have, falls back to the default of the value's kind.

use std::fmt::{self, Write};

use crate::conf::{C_PATTERN_DATE, C_PATTERN_DATE_TIME, C_PATTERN_TIME};
use crate::record::EnumFieldValue;

/// One translated piece of a date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumPatternItem {
    /// strftime format text.
    Strftime(String),
    /// Fraction of second truncated to this many digits (1..=9).
    Fraction(usize),
    /// strftime field left-padded with zeros to a minimum width.
    ZeroPadded {
        /// strftime specifier rendering the unpadded field.
        spec: &'static str,
        /// Minimum width.
        n_width: usize,
    },
}

/// Render `value` as text, applying `pattern` to temporal kinds.
pub fn format_field_value(value: &EnumFieldValue<'_>, pattern: Option<&str>) -> String {
    match value {
        EnumFieldValue::Null | EnumFieldValue::Record(_) => String::new(),
        EnumFieldValue::Text(v) => v.to_string(),
        EnumFieldValue::Integer(n) => n.to_string(),
        EnumFieldValue::Float(n) => format_float(*n),
        EnumFieldValue::Boolean(b) => b.to_string(),
        EnumFieldValue::Date(v) => {
            format_temporal(pattern, C_PATTERN_DATE, |c_fmt| render_display(v.format(c_fmt)))
        }
        EnumFieldValue::Time(v) => {
            format_temporal(pattern, C_PATTERN_TIME, |c_fmt| render_display(v.format(c_fmt)))
        }
        EnumFieldValue::DateTime(v) => format_temporal(pattern, C_PATTERN_DATE_TIME, |c_fmt| {
            render_display(v.format(c_fmt))
        }),
        EnumFieldValue::Timestamp(v) => format_temporal(pattern, C_PATTERN_DATE_TIME, |c_fmt| {
            render_display(v.format(c_fmt))
        }),
    }
}

/// Shortest round-trip decimal, always with a fraction digit; scientific
/// notation (`1.0E7`) outside `[1e-3, 1e7)`.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let c_sign = if n < 0.0 { "-" } else { "" };
        return format!("{c_sign}Infinity");
    }

    let n_abs = n.abs();
    if n_abs == 0.0 || (1e-3..1e7).contains(&n_abs) {
        let c_text = n.to_string();
        return if c_text.contains('.') {
            c_text
        } else {
            format!("{c_text}.0")
        };
    }

    let c_sci = format!("{n:e}");
    let (c_mantissa, c_exponent) = c_sci.split_once('e').unwrap_or((c_sci.as_str(), "0"));
    if c_mantissa.contains('.') {
        format!("{c_mantissa}E{c_exponent}")
    } else {
        format!("{c_mantissa}.0E{c_exponent}")
    }
}

fn format_temporal(
    pattern: Option<&str>,
    pattern_default: &str,
    render: impl Fn(&str) -> Option<String>,
) -> String {
    if let Some(c_pattern) = pattern {
        let c_text = convert_date_pattern(c_pattern)
            .and_then(|l_items| render_pattern_items(&l_items, &render));
        if let Some(c_text) = c_text {
            return c_text;
        }
        log::debug!("date pattern {c_pattern:?} not applicable, using {pattern_default:?}");
    }

    convert_date_pattern(pattern_default)
        .and_then(|l_items| render_pattern_items(&l_items, &render))
        .unwrap_or_default()
}

fn render_pattern_items(
    l_items: &[EnumPatternItem],
    render: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let mut c_text = String::new();
    for item in l_items {
        match item {
            EnumPatternItem::Strftime(c_fmt) => c_text.push_str(&render(c_fmt)?),
            EnumPatternItem::Fraction(n_digits) => {
                let c_nanos = render("%9f")?;
                c_text.push_str(c_nanos.get(..*n_digits)?);
            }
            EnumPatternItem::ZeroPadded { spec, n_width } => {
                let c_field = render(spec)?;
                write!(c_text, "{c_field:0>n_width$}", n_width = *n_width).ok()?;
            }
        }
    }
    Some(c_text)
}

// Display errors (e.g. hour requested from a date) surface as `None` instead of panicking.
fn render_display(value: impl fmt::Display) -> Option<String> {
    let mut c_text = String::new();
    write!(c_text, "{value}").ok()?;
    Some(c_text)
}

/// Translate a date pattern into strftime pieces.
///
/// Returns `None` for letters without a translation or an unterminated quote.
pub fn convert_date_pattern(pattern: &str) -> Option<Vec<EnumPatternItem>> {
    let l_chars: Vec<char> = pattern.chars().collect();
    let mut l_items = Vec::new();
    let mut c_fmt = String::with_capacity(pattern.len() * 2);
    let mut n_idx = 0;

    while n_idx < l_chars.len() {
        let chr = l_chars[n_idx];

        if chr == '\'' {
            if l_chars.get(n_idx + 1) == Some(&'\'') {
                c_fmt.push('\'');
                n_idx += 2;
                continue;
            }
            let mut n_idx_end = n_idx + 1;
            loop {
                match l_chars.get(n_idx_end) {
                    None => return None,
                    Some('\'') if l_chars.get(n_idx_end + 1) == Some(&'\'') => {
                        c_fmt.push('\'');
                        n_idx_end += 2;
                    }
                    Some('\'') => break,
                    Some(c) => {
                        push_literal(&mut c_fmt, *c);
                        n_idx_end += 1;
                    }
                }
            }
            n_idx = n_idx_end + 1;
            continue;
        }

        if chr.is_ascii_alphabetic() {
            let mut n_run = 1;
            while l_chars.get(n_idx + n_run) == Some(&chr) {
                n_run += 1;
            }
            let item = derive_pattern_item(chr, n_run)?;
            match item {
                EnumPatternItem::Strftime(c_token) => c_fmt.push_str(&c_token),
                _ => {
                    if !c_fmt.is_empty() {
                        l_items.push(EnumPatternItem::Strftime(std::mem::take(&mut c_fmt)));
                    }
                    l_items.push(item);
                }
            }
            n_idx += n_run;
            continue;
        }

        push_literal(&mut c_fmt, chr);
        n_idx += 1;
    }

    if !c_fmt.is_empty() {
        l_items.push(EnumPatternItem::Strftime(c_fmt));
    }
    Some(l_items)
}

fn push_literal(c_fmt: &mut String, chr: char) {
    if chr == '%' {
        c_fmt.push_str("%%");
    } else {
        c_fmt.push(chr);
    }
}

fn derive_pattern_item(chr: char, n_run: usize) -> Option<EnumPatternItem> {
    let token = match (chr, n_run) {
        ('S', 1..=9) => return Some(EnumPatternItem::Fraction(n_run)),
        ('D', 2) => {
            return Some(EnumPatternItem::ZeroPadded {
                spec: "%-j",
                n_width: 2,
            });
        }
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('a', 1) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('D', 1) => "%-j",
        ('D', 3) => "%j",
        _ => return None,
    };
    Some(EnumPatternItem::Strftime(token.to_string()))
}
