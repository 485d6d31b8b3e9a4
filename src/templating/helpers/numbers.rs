//! Number helpers: `formatNumber`, `currency`, `percentage`.
//!
//! Formatting works on [`Decimal`] so that `19.99` stays `19.99` and rounding
//! is exact. Midpoints round away from zero (`0.125` → `0.13`).

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{HelperArgs, HelperOutput};
use crate::constants::{DEFAULT_NUMBER_FORMAT, EMPTY_CURRENCY_LITERAL};
use crate::templating::locale::{CurrencyPlacement, LocaleProfile, PercentPlacement};
use crate::templating::value;

/// Largest precision a format may ask for.
const MAX_PRECISION: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberFormat {
    /// `N`: grouped, fixed decimals.
    Number(u32),
    /// `F`: ungrouped, fixed decimals.
    Fixed(u32),
    /// `C`: locale currency.
    Currency(Option<u32>),
    /// `P`: value × 100 with the percent sign.
    Percent(u32),
    /// `D`: integer, zero-padded to a minimum width.
    Integer(usize),
    /// `G`: shortest representation.
    General,
    /// `#,##0.00`-style pattern.
    Custom {
        grouping: bool,
        min_integer: usize,
        min_fraction: u32,
        max_fraction: u32,
    },
}

fn parse_format(spec: &str) -> Option<NumberFormat> {
    let spec = spec.trim();
    let mut chars = spec.chars();
    let letter = chars.next()?;

    if letter.is_ascii_alphabetic() {
        let digits = chars.as_str();
        let precision = if digits.is_empty() {
            None
        } else if digits.chars().all(|c| c.is_ascii_digit()) {
            Some(digits.parse::<u32>().ok()?.min(MAX_PRECISION))
        } else {
            return None;
        };

        return match letter.to_ascii_uppercase() {
            'N' => Some(NumberFormat::Number(precision.unwrap_or(2))),
            'F' => Some(NumberFormat::Fixed(precision.unwrap_or(2))),
            'C' => Some(NumberFormat::Currency(precision)),
            'P' => Some(NumberFormat::Percent(precision.unwrap_or(2))),
            'D' => Some(NumberFormat::Integer(precision.unwrap_or(0) as usize)),
            'G' => Some(NumberFormat::General),
            _ => None,
        };
    }

    parse_custom(spec)
}

fn parse_custom(spec: &str) -> Option<NumberFormat> {
    if !spec.chars().all(|c| matches!(c, '0' | '#' | ',' | '.'))
        || !spec.chars().any(|c| c == '0' || c == '#')
    {
        return None;
    }

    let (integer, fraction) = spec.split_once('.').unwrap_or((spec, ""));
    if fraction.contains('.') {
        return None;
    }

    let min_fraction = fraction.chars().filter(|&c| c == '0').count() as u32;
    let optional_fraction = fraction.chars().filter(|&c| c == '#').count() as u32;
    Some(NumberFormat::Custom {
        grouping: integer.contains(','),
        min_integer: integer.chars().filter(|&c| c == '0').count(),
        min_fraction: min_fraction.min(MAX_PRECISION),
        max_fraction: (min_fraction + optional_fraction).min(MAX_PRECISION),
    })
}

/// Format `number` with a standard (`N2`, `C`, `P1`, `D4`, ...) or custom
/// (`#,##0.00`) format. `None` for formats this crate does not support.
pub fn format_number(number: Decimal, spec: &str, profile: &LocaleProfile) -> Option<String> {
    let formatted = match parse_format(spec)? {
        NumberFormat::Number(decimals) => localize(number, decimals, decimals, true, 1, profile),
        NumberFormat::Fixed(decimals) => localize(number, decimals, decimals, false, 1, profile),
        NumberFormat::Currency(decimals) => format_currency(number, decimals, profile),
        NumberFormat::Percent(decimals) => format_percent(number, decimals, profile)?,
        NumberFormat::Integer(width) => {
            if !number.fract().is_zero() {
                return None;
            }
            localize(number, 0, 0, false, width, profile)
        }
        NumberFormat::General => localize(number, 0, MAX_PRECISION, false, 1, profile),
        NumberFormat::Custom {
            grouping,
            min_integer,
            min_fraction,
            max_fraction,
        } => localize(number, min_fraction, max_fraction, grouping, min_integer, profile),
    };
    Some(formatted)
}

/// Render a decimal with the profile's separators.
///
/// Rounds to `max_fraction` digits, keeps at least `min_fraction`, pads the
/// integer part to `min_integer` digits and, when `grouping`, inserts group
/// separators every three digits.
pub(super) fn localize(
    number: Decimal,
    min_fraction: u32,
    max_fraction: u32,
    grouping: bool,
    min_integer: usize,
    profile: &LocaleProfile,
) -> String {
    let (negative, magnitude) = split_sign(number, max_fraction);
    let body = digits(magnitude, min_fraction, grouping, min_integer, profile);
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

fn split_sign(number: Decimal, max_fraction: u32) -> (bool, Decimal) {
    let rounded = number.round_dp_with_strategy(max_fraction, RoundingStrategy::MidpointAwayFromZero);
    (rounded.is_sign_negative() && !rounded.is_zero(), rounded.abs())
}

fn digits(
    magnitude: Decimal,
    min_fraction: u32,
    grouping: bool,
    min_integer: usize,
    profile: &LocaleProfile,
) -> String {
    let plain = magnitude.normalize().to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

    let mut integer = integer.trim_start_matches('0').to_string();
    if integer.len() < min_integer.max(1) {
        integer = format!("{}{integer}", "0".repeat(min_integer.max(1) - integer.len()));
    }
    // `#.##` style patterns drop a lone leading zero.
    if min_integer == 0 && integer == "0" && !fraction.is_empty() {
        integer.clear();
    }

    let mut fraction = fraction.to_string();
    while fraction.len() < min_fraction as usize {
        fraction.push('0');
    }

    let mut out = if grouping {
        group(&integer, profile.group_separator)
    } else {
        integer
    };
    if !fraction.is_empty() {
        out.push(profile.decimal_separator);
        out.push_str(&fraction);
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn group(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

fn format_currency(number: Decimal, decimals: Option<u32>, profile: &LocaleProfile) -> String {
    let decimals = decimals.unwrap_or(profile.currency_decimals);
    let (negative, magnitude) = split_sign(number, decimals);
    let amount = digits(magnitude, decimals, true, 1, profile);
    let sign = if negative { "-" } else { "" };
    let symbol = profile.currency_symbol;

    match profile.currency_placement {
        CurrencyPlacement::Prefix => format!("{sign}{symbol}{amount}"),
        CurrencyPlacement::PrefixSpaced => format!("{symbol}\u{a0}{sign}{amount}"),
        CurrencyPlacement::Suffix => format!("{sign}{amount}\u{a0}{symbol}"),
    }
}

/// `None` when scaling by 100 overflows.
fn format_percent(number: Decimal, decimals: u32, profile: &LocaleProfile) -> Option<String> {
    let scaled = number.checked_mul(Decimal::ONE_HUNDRED)?;
    let (negative, magnitude) = split_sign(scaled, decimals);
    let amount = digits(magnitude, decimals, true, 1, profile);
    let sign = if negative { "-" } else { "" };

    Some(match profile.percent_placement {
        PercentPlacement::Adjacent => format!("{sign}{amount}%"),
        PercentPlacement::Spaced => format!("{sign}{amount}\u{a0}%"),
        PercentPlacement::Prefix => format!("{sign}%{amount}"),
    })
}

pub(super) fn format_number_helper(args: &HelperArgs<'_>) -> HelperOutput {
    let Some(input) = args.get(0) else {
        return HelperOutput::Empty;
    };
    let spec = args.option(1);
    let spec = spec.as_deref().unwrap_or(DEFAULT_NUMBER_FORMAT);
    let profile = args.locale_at(2);

    let number = value::to_decimal(input)
        .or_else(|| value::to_float(input).and_then(Decimal::from_f64));

    match number.and_then(|number| format_number(number, spec, profile)) {
        Some(text) => HelperOutput::Escaped(text),
        None => {
            tracing::trace!("formatNumber: writing {:?} unchanged (format {:?})", input, spec);
            HelperOutput::Escaped(value::raw_text(input))
        }
    }
}

pub(super) fn currency(args: &HelperArgs<'_>) -> HelperOutput {
    let Some(input) = args.get(0) else {
        return HelperOutput::Escaped(EMPTY_CURRENCY_LITERAL.to_string());
    };
    let profile = args.locale_at(1);

    match value::to_decimal(input) {
        Some(amount) => HelperOutput::Escaped(format_currency(amount, None, profile)),
        None => {
            tracing::trace!("currency: writing {:?} unchanged", input);
            HelperOutput::Escaped(value::raw_text(input))
        }
    }
}

pub(super) fn percentage(args: &HelperArgs<'_>) -> HelperOutput {
    let Some(input) = args.get(0) else {
        return HelperOutput::Empty;
    };
    let profile = args.locale_at(1);

    match value::to_decimal(input).and_then(|fraction| format_percent(fraction, 2, profile)) {
        Some(text) => HelperOutput::Escaped(text),
        None => {
            tracing::trace!("percentage: writing {:?} unchanged", input);
            HelperOutput::Escaped(value::raw_text(input))
        }
    }
}
