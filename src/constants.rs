//! Global constants used throughout the mailbars codebase.
//!
//! This module contains the formatting defaults, well-known names and
//! environment variables that are used across multiple modules. Defining
//! them centrally keeps helpers, configuration and CLI in agreement.

/// Locale used by every helper that receives no locale argument.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Pattern used by `currentDate` and `formatDate` when no pattern is given.
pub const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd";

/// Numeric format used by `formatNumber` when no format is given.
pub const DEFAULT_NUMBER_FORMAT: &str = "N2";

/// Literal written by `currency` when it is invoked without arguments.
pub const EMPTY_CURRENCY_LITERAL: &str = "$0.00";

/// Environment variable that overrides the global configuration path.
pub const CONFIG_PATH_ENV: &str = "MAILBARS_CONFIG";

/// Environment variable that overrides the template store directory.
pub const STORE_DIR_ENV: &str = "MAILBARS_STORE";

/// File extension used for templates and partials in a directory store.
pub const TEMPLATE_FILE_EXTENSION: &str = "hbs";

/// Name of the hash argument that overrides the locale of a single helper call.
pub const LOCALE_HASH_KEY: &str = "locale";

/// Maximum Levenshtein distance, as a percentage of the name length, for
/// "did you mean" helper suggestions.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;
