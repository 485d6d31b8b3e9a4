//! Text helpers.
//!
//! The case helpers escape their own output and write it verbatim, so the
//! result is HTML-safe even inside `{{{ }}}`. `safeHtml` is the one helper
//! that writes caller data unescaped; the template author vouches for it.

use html_escape::encode_safe;

use super::{HelperArgs, HelperOutput};
use crate::templating::value;

fn first_text(args: &HelperArgs<'_>) -> Option<String> {
    args.get(0).map(value::raw_text)
}

pub(super) fn uppercase(args: &HelperArgs<'_>) -> HelperOutput {
    match first_text(args) {
        Some(text) => HelperOutput::Safe(encode_safe(&args.locale_at(1).to_upper(&text)).into_owned()),
        None => HelperOutput::Empty,
    }
}

pub(super) fn lowercase(args: &HelperArgs<'_>) -> HelperOutput {
    match first_text(args) {
        Some(text) => HelperOutput::Safe(encode_safe(&args.locale_at(1).to_lower(&text)).into_owned()),
        None => HelperOutput::Empty,
    }
}

pub(super) fn title_case(args: &HelperArgs<'_>) -> HelperOutput {
    match first_text(args) {
        Some(text) => HelperOutput::Safe(encode_safe(&args.locale_at(1).to_title(&text)).into_owned()),
        None => HelperOutput::Empty,
    }
}

pub(super) fn html_encode(args: &HelperArgs<'_>) -> HelperOutput {
    match first_text(args) {
        Some(text) => HelperOutput::Safe(encode_safe(&text).into_owned()),
        None => HelperOutput::Empty,
    }
}

pub(super) fn url_encode(args: &HelperArgs<'_>) -> HelperOutput {
    match first_text(args) {
        Some(text) => HelperOutput::Escaped(urlencoding::encode(&text).into_owned()),
        None => HelperOutput::Empty,
    }
}

pub(super) fn safe_html(args: &HelperArgs<'_>) -> HelperOutput {
    match first_text(args) {
        Some(text) => HelperOutput::Safe(text),
        None => HelperOutput::Empty,
    }
}
