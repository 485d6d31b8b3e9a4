//! Date and time helpers: `year`, `currentDate`, `formatDate`.
//!
//! Patterns follow the familiar custom date syntax (`yyyy-MM-dd`,
//! `MMM dd, yyyy`, `dddd`) and are translated to chrono's strftime items.
//! Single-letter patterns (`d`, `D`, `t`, `T`, `f`, `F`, `g`, `G`, `M`, `Y`,
//! `o`, `s`, `u`) are standard patterns expanded through the locale profile.
//! A pattern containing `%` is taken as strftime directly.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Local};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fmt::Write;

use super::{HelperArgs, HelperOutput, numbers};
use crate::constants::DEFAULT_DATE_PATTERN;
use crate::templating::locale::LocaleProfile;
use crate::templating::value;

pub(super) fn year(args: &HelperArgs<'_>) -> HelperOutput {
    let profile = args.locale_at(0);
    let year = Decimal::from(Local::now().year());
    HelperOutput::Escaped(numbers::localize(year, 0, 0, false, 1, profile))
}

pub(super) fn current_date(args: &HelperArgs<'_>) -> HelperOutput {
    let pattern = args.option(0);
    let profile = args.locale_at(1);
    let now = Local::now().fixed_offset();

    match format_datetime(&now, pattern.as_deref().unwrap_or(DEFAULT_DATE_PATTERN), profile) {
        Some(text) => HelperOutput::Escaped(text),
        None => {
            tracing::trace!("currentDate: unsupported pattern {:?}", pattern);
            HelperOutput::Empty
        }
    }
}

pub(super) fn format_date(args: &HelperArgs<'_>) -> HelperOutput {
    let Some(input) = args.get(0) else {
        return HelperOutput::Empty;
    };
    let pattern = args.option(1);
    let profile = args.locale_at(2);

    value::to_datetime(input)
        .and_then(|dt| {
            format_datetime(&dt, pattern.as_deref().unwrap_or(DEFAULT_DATE_PATTERN), profile)
        })
        .map(HelperOutput::Escaped)
        .unwrap_or_else(|| {
            tracing::trace!("formatDate: writing {:?} unchanged", input);
            HelperOutput::Escaped(value::raw_text(input))
        })
}

/// Format `dt` with a custom, standard or strftime pattern.
///
/// Returns `None` when the pattern does not translate to valid strftime items.
pub fn format_datetime(
    dt: &DateTime<FixedOffset>,
    pattern: &str,
    profile: &LocaleProfile,
) -> Option<String> {
    let strftime = to_strftime(pattern, profile);
    if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut formatted = String::new();
    write!(formatted, "{}", dt.format_localized(&strftime, profile.chrono_locale())).ok()?;
    Some(formatted)
}

/// Translate a pattern into a strftime format string.
pub fn to_strftime<'a>(pattern: &'a str, profile: &LocaleProfile) -> Cow<'a, str> {
    if pattern.contains('%') {
        return Cow::Borrowed(pattern);
    }

    let mut chars = pattern.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if let Some(expanded) = standard_pattern(letter, profile) {
            return Cow::Owned(expanded);
        }
    }

    Cow::Owned(translate_custom(pattern))
}

fn standard_pattern(letter: char, profile: &LocaleProfile) -> Option<String> {
    let custom = match letter {
        'd' => profile.short_date.to_string(),
        'D' => profile.long_date.to_string(),
        't' => profile.short_time.to_string(),
        'T' => profile.long_time.to_string(),
        'f' => format!("{} {}", profile.long_date, profile.short_time),
        'F' => format!("{} {}", profile.long_date, profile.long_time),
        'g' => format!("{} {}", profile.short_date, profile.short_time),
        'G' => format!("{} {}", profile.short_date, profile.long_time),
        'M' | 'm' => "MMMM d".to_string(),
        'Y' | 'y' => "MMMM yyyy".to_string(),
        'o' | 'O' => return Some("%Y-%m-%dT%H:%M:%S%.f%:z".to_string()),
        's' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss".to_string(),
        'u' => "yyyy'-'MM'-'dd HH':'mm':'ss'Z'".to_string(),
        _ => return None,
    };
    Some(translate_custom(&custom))
}

fn translate_custom(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    push_literal(&mut out, chars[i]);
                    i += 1;
                }
                i += 1;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    push_literal(&mut out, next);
                }
                i += 2;
            }
            'y' | 'M' | 'd' | 'H' | 'h' | 'm' | 's' | 'f' | 'F' | 't' | 'z' | 'K' => {
                let run = chars[i..].iter().take_while(|&&next| next == c).count();
                out.push_str(specifier(c, run));
                i += run;
            }
            other => {
                push_literal(&mut out, other);
                i += 1;
            }
        }
    }

    out
}

fn specifier(letter: char, run: usize) -> &'static str {
    match (letter, run) {
        ('y', 1) => "%-y",
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('d', 3) => "%a",
        ('d', _) => "%A",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('f' | 'F', 1..=3) => "%3f",
        ('f' | 'F', 4..=6) => "%6f",
        ('f' | 'F', _) => "%9f",
        ('t', _) => "%p",
        ('z', _) | ('K', _) => "%:z",
        _ => "",
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
