//! Predicates behind the block helpers.
//!
//! Each predicate decides between the primary block and the `{{else}}` block;
//! a predicate that cannot evaluate (missing or unparseable arguments) is
//! simply false.

use std::cmp::Ordering;

use super::HelperArgs;
use crate::templating::value;

pub(super) fn if_not_empty(args: &HelperArgs<'_>) -> bool {
    args.get(0).is_some_and(|input| !value::is_empty(input))
}

pub(super) fn eq(args: &HelperArgs<'_>) -> bool {
    args.len() >= 2 && args.text(0) == args.text(1)
}

pub(super) fn neq(args: &HelperArgs<'_>) -> bool {
    args.len() >= 2 && args.text(0) != args.text(1)
}

pub(super) fn gt(args: &HelperArgs<'_>) -> bool {
    compare(args) == Some(Ordering::Greater)
}

pub(super) fn lt(args: &HelperArgs<'_>) -> bool {
    compare(args) == Some(Ordering::Less)
}

fn compare(args: &HelperArgs<'_>) -> Option<Ordering> {
    let left = value::to_decimal(args.get(0)?)?;
    let right = value::to_decimal(args.get(1)?)?;
    Some(left.cmp(&right))
}
