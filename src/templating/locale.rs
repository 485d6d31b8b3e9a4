//! Locale resolution for formatting helpers.
//!
//! A locale identifier such as `"en-US"` is mapped to a [`LocaleProfile`]: the
//! set of rules a helper needs to format numbers, currencies, percentages and
//! dates, and to change letter case. Resolution never fails. Malformed or
//! unknown identifiers degrade to the invariant profile, and a well-formed
//! identifier whose region is unknown degrades to the primary profile of its
//! language (`de-AT` formats like `de-DE`).
//!
//! Profiles are static data, so resolving is a pure table lookup and the
//! returned `&'static LocaleProfile` can be shared freely between threads.

use chrono::Locale as ChronoLocale;

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyPlacement {
    /// `$1.00`, negative `-$1.00`
    Prefix,
    /// `€ 1,00`, negative `€ -1,00`
    PrefixSpaced,
    /// `1,00 €`, negative `-1,00 €`
    Suffix,
}

/// Where the percent sign goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentPlacement {
    /// `12.50%`
    Adjacent,
    /// `12,50 %`
    Spaced,
    /// `%12,50`
    Prefix,
}

/// Letter-case mapping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRules {
    Default,
    /// Dotted and dotless i are distinct letters (Turkish, Azerbaijani).
    Turkic,
}

/// Formatting rules for one locale.
///
/// Date and time patterns use the same custom pattern syntax that templates
/// pass to `formatDate` (`yyyy`, `MMMM`, `dd`, ...), so standard patterns like
/// `"d"` or `"D"` are expanded through the profile before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleProfile {
    pub tag: &'static str,
    pub decimal_separator: char,
    pub group_separator: char,
    pub currency_symbol: &'static str,
    pub currency_decimals: u32,
    pub currency_placement: CurrencyPlacement,
    pub percent_placement: PercentPlacement,
    pub short_date: &'static str,
    pub long_date: &'static str,
    pub short_time: &'static str,
    pub long_time: &'static str,
    pub case_rules: CaseRules,
}

const NBSP: char = '\u{a0}';
const NARROW_NBSP: char = '\u{202f}';

static INVARIANT: LocaleProfile = LocaleProfile {
    tag: "",
    decimal_separator: '.',
    group_separator: ',',
    currency_symbol: "¤",
    currency_decimals: 2,
    currency_placement: CurrencyPlacement::Prefix,
    percent_placement: PercentPlacement::Spaced,
    short_date: "MM/dd/yyyy",
    long_date: "dddd, dd MMMM yyyy",
    short_time: "HH:mm",
    long_time: "HH:mm:ss",
    case_rules: CaseRules::Default,
};

static PROFILES: &[LocaleProfile] = &[
    LocaleProfile {
        tag: "en-US",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "$",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "M/d/yyyy",
        long_date: "dddd, MMMM d, yyyy",
        short_time: "h:mm tt",
        long_time: "h:mm:ss tt",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "en-GB",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "£",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "dd/MM/yyyy",
        long_date: "dddd, d MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "en-CA",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "$",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "yyyy-MM-dd",
        long_date: "MMMM d, yyyy",
        short_time: "h:mm tt",
        long_time: "h:mm:ss tt",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "en-AU",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "$",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "d/MM/yyyy",
        long_date: "dddd, d MMMM yyyy",
        short_time: "h:mm tt",
        long_time: "h:mm:ss tt",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "de-DE",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "€",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Suffix,
        percent_placement: PercentPlacement::Spaced,
        short_date: "dd.MM.yyyy",
        long_date: "dddd, d. MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "fr-FR",
        decimal_separator: ',',
        group_separator: NARROW_NBSP,
        currency_symbol: "€",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Suffix,
        percent_placement: PercentPlacement::Spaced,
        short_date: "dd/MM/yyyy",
        long_date: "dddd d MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "es-ES",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "€",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Suffix,
        percent_placement: PercentPlacement::Spaced,
        short_date: "dd/MM/yyyy",
        long_date: "dddd, d 'de' MMMM 'de' yyyy",
        short_time: "H:mm",
        long_time: "H:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "es-MX",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "$",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Spaced,
        short_date: "dd/MM/yyyy",
        long_date: "dddd, d 'de' MMMM 'de' yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "it-IT",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "€",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Suffix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "dd/MM/yyyy",
        long_date: "dddd d MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "nl-NL",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "€",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::PrefixSpaced,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "d-M-yyyy",
        long_date: "dddd d MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "pt-BR",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "R$",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::PrefixSpaced,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "dd/MM/yyyy",
        long_date: "dddd, d 'de' MMMM 'de' yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "sv-SE",
        decimal_separator: ',',
        group_separator: NBSP,
        currency_symbol: "kr",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Suffix,
        percent_placement: PercentPlacement::Spaced,
        short_date: "yyyy-MM-dd",
        long_date: "dddd d MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "ja-JP",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "￥",
        currency_decimals: 0,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "yyyy/MM/dd",
        long_date: "yyyy'年'M'月'd'日'dddd",
        short_time: "H:mm",
        long_time: "H:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "zh-CN",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "¥",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Adjacent,
        short_date: "yyyy/M/d",
        long_date: "yyyy'年'M'月'd'日'dddd",
        short_time: "H:mm",
        long_time: "H:mm:ss",
        case_rules: CaseRules::Default,
    },
    LocaleProfile {
        tag: "tr-TR",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "₺",
        currency_decimals: 2,
        currency_placement: CurrencyPlacement::Prefix,
        percent_placement: PercentPlacement::Prefix,
        short_date: "d.MM.yyyy",
        long_date: "d MMMM yyyy dddd",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        case_rules: CaseRules::Turkic,
    },
];

/// Primary profile for each supported language, used when only the region is unknown.
const LANGUAGE_DEFAULTS: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("de", "de-DE"),
    ("fr", "fr-FR"),
    ("es", "es-ES"),
    ("it", "it-IT"),
    ("nl", "nl-NL"),
    ("pt", "pt-BR"),
    ("sv", "sv-SE"),
    ("ja", "ja-JP"),
    ("zh", "zh-CN"),
    ("tr", "tr-TR"),
];

/// Resolve a locale identifier, degrading to the invariant profile.
///
/// This is the only entry point helpers use; it never fails. Fallback is
/// reported at `debug` level so callers can diagnose unexpected formatting
/// without it ever interrupting a render.
pub fn resolve(locale_id: &str) -> &'static LocaleProfile {
    match try_resolve(locale_id) {
        Some(profile) => profile,
        None => {
            tracing::debug!("Unknown locale '{}', using invariant formatting rules", locale_id);
            &INVARIANT
        }
    }
}

/// Resolve a locale identifier without fallback.
///
/// Returns `None` for malformed identifiers and for languages without a
/// profile. The empty string and `"invariant"` name the invariant profile.
pub fn try_resolve(locale_id: &str) -> Option<&'static LocaleProfile> {
    let normalized = locale_id.trim().replace('_', "-");
    if normalized.is_empty() || normalized.eq_ignore_ascii_case("invariant") {
        return Some(&INVARIANT);
    }

    let mut subtags = normalized.split('-');
    let language = subtags.next()?;
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let region = subtags.next();
    let rest_valid = region.into_iter().chain(subtags).all(|subtag| {
        (2..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
    });
    if !rest_valid {
        return None;
    }

    if let Some(region) = region {
        let exact = PROFILES.iter().find(|profile| {
            profile.tag.split_once('-').is_some_and(|(lang, reg)| {
                lang.eq_ignore_ascii_case(language) && reg.eq_ignore_ascii_case(region)
            })
        });
        if exact.is_some() {
            return exact;
        }
    }

    LANGUAGE_DEFAULTS
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
        .and_then(|(_, tag)| PROFILES.iter().find(|profile| profile.tag == *tag))
}

/// The invariant profile that unknown locales fall back to.
pub fn invariant() -> &'static LocaleProfile {
    &INVARIANT
}

/// Tags of every built-in profile, in table order.
pub fn supported_tags() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|profile| profile.tag)
}

impl LocaleProfile {
    /// Whether this is the invariant fallback profile.
    pub fn is_invariant(&self) -> bool {
        self.tag.is_empty()
    }

    /// Locale data chrono uses for month and day names.
    pub fn chrono_locale(&self) -> ChronoLocale {
        match self.tag {
            "en-US" => ChronoLocale::en_US,
            "en-GB" => ChronoLocale::en_GB,
            "en-CA" => ChronoLocale::en_CA,
            "en-AU" => ChronoLocale::en_AU,
            "de-DE" => ChronoLocale::de_DE,
            "fr-FR" => ChronoLocale::fr_FR,
            "es-ES" => ChronoLocale::es_ES,
            "es-MX" => ChronoLocale::es_MX,
            "it-IT" => ChronoLocale::it_IT,
            "nl-NL" => ChronoLocale::nl_NL,
            "pt-BR" => ChronoLocale::pt_BR,
            "sv-SE" => ChronoLocale::sv_SE,
            "ja-JP" => ChronoLocale::ja_JP,
            "zh-CN" => ChronoLocale::zh_CN,
            "tr-TR" => ChronoLocale::tr_TR,
            _ => ChronoLocale::POSIX,
        }
    }

    pub fn to_upper(&self, text: &str) -> String {
        match self.case_rules {
            CaseRules::Default => text.to_uppercase(),
            CaseRules::Turkic => text
                .chars()
                .map(|c| match c {
                    'i' => 'İ'.to_string(),
                    'ı' => 'I'.to_string(),
                    other => other.to_uppercase().collect(),
                })
                .collect(),
        }
    }

    pub fn to_lower(&self, text: &str) -> String {
        match self.case_rules {
            CaseRules::Default => text.to_lowercase(),
            CaseRules::Turkic => text
                .chars()
                .map(|c| match c {
                    'I' => 'ı'.to_string(),
                    'İ' => 'i'.to_string(),
                    other => other.to_lowercase().collect(),
                })
                .collect(),
        }
    }

    /// Lower-case the text, then upper-case the first letter of every word.
    ///
    /// A word starts at a letter that does not follow another letter, a digit
    /// or an apostrophe, so `o'neil` becomes `O'neil`.
    pub fn to_title(&self, text: &str) -> String {
        let lowered = self.to_lower(text);
        let mut result = String::with_capacity(lowered.len());
        let mut in_word = false;

        for c in lowered.chars() {
            if c.is_alphabetic() {
                if in_word {
                    result.push(c);
                } else {
                    let single = c.to_string();
                    result.push_str(&self.to_upper(&single));
                }
                in_word = true;
            } else {
                result.push(c);
                in_word = c.is_numeric() || c == '\'' || c == '’';
            }
        }

        result
    }
}
