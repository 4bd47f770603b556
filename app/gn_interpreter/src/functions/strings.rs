/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! String and list utilities.

use gn_core::origin::OriginContext;
use itertools::Itertools;
use thiserror::Error;

use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::check_arg_count;
use crate::scope::Scope;
use crate::value::Value;

#[derive(Debug, Error)]
enum StringsError {
    #[error("Separator argument is empty.\nThe separator for {0}() must not be an empty string.")]
    EmptySeparator(&'static str),
    #[error("Requested number of sublists {0} is out of range.\nIt must be greater than zero.")]
    BadSublistCount(i64),
    #[error("Requested number of replacements {0} is out of range.\nIt must not be negative.")]
    BadReplacementCount(i64),
}

pub(crate) fn join(separator: &str, items: &[&str]) -> String {
    items.iter().join(separator)
}

/// With no separator, splits on runs of whitespace and drops empty pieces.
pub(crate) fn split(input: &str, separator: Option<&str>) -> Vec<String> {
    match separator {
        None => input.split_whitespace().map(str::to_owned).collect(),
        Some(sep) => input.split(sep).map(str::to_owned).collect(),
    }
}

/// Replaces at most `max` occurrences, or all of them.
pub(crate) fn replace(input: &str, old: &str, new: &str, max: Option<usize>) -> String {
    match max {
        Some(n) => input.replacen(old, new, n),
        None => input.replace(old, new),
    }
}

/// Splits `items` into `n` contiguous sublists. The first `len % n` sublists get the extra
/// elements.
pub(crate) fn split_into<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    let base = items.len() / n;
    let extra = items.len() % n;
    let mut rest = items;
    (0..n)
        .map(|i| {
            let take = base + usize::from(i < extra);
            let (head, tail) = rest.split_at(take);
            rest = tail;
            head.to_vec()
        })
        .collect()
}

/// `string_join(separator, list)`
pub(crate) fn string_join(
    _scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    _eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_arg_count(call, &args, 2, 2)?;
    let separator = args[0].as_str().at(&call.origin)?;
    let items = args[1].as_string_list().at(&call.origin)?;
    Ok(Value::string(join(separator, &items)))
}

/// `string_split(str[, separator])`
pub(crate) fn string_split(
    _scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    _eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_arg_count(call, &args, 1, 2)?;
    let input = args[0].as_str().at(&call.origin)?;
    let separator = match args.get(1) {
        Some(v) => {
            let sep = v.as_str().at(&call.origin)?;
            if sep.is_empty() {
                return Err(StringsError::EmptySeparator("string_split")).at(&call.origin);
            }
            Some(sep)
        }
        None => None,
    };
    Ok(Value::list_of_strings(split(input, separator)))
}

/// `string_replace(str, old, new[, max])`
pub(crate) fn string_replace(
    _scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    _eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_arg_count(call, &args, 3, 4)?;
    let input = args[0].as_str().at(&call.origin)?;
    let old = args[1].as_str().at(&call.origin)?;
    let new = args[2].as_str().at(&call.origin)?;
    let max = match args.get(3) {
        Some(v) => {
            let n = v.as_int().at(&call.origin)?;
            Some(
                usize::try_from(n)
                    .map_err(|_| StringsError::BadReplacementCount(n))
                    .at(&call.origin)?,
            )
        }
        None => None,
    };
    if old.is_empty() {
        return Ok(Value::string(input));
    }
    Ok(Value::string(replace(input, old, new, max)))
}

/// `split_list(list, n)`
pub(crate) fn split_list(
    _scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    _eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_arg_count(call, &args, 2, 2)?;
    let items = args[0].as_list().at(&call.origin)?;
    let n = args[1].as_int().at(&call.origin)?;
    let count = match usize::try_from(n) {
        Ok(count) if count > 0 => count,
        _ => return Err(StringsError::BadSublistCount(n)).at(&call.origin),
    };
    Ok(Value::List(
        split_into(items, count)
            .into_iter()
            .map(Value::List)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!("a|b|c", join("|", &["a", "b", "c"]));
        assert_eq!("", join("|", &[]));
    }

    #[test]
    fn test_split_whitespace() {
        assert_eq!(vec!["a", "b"], split("  a b  ", None));
        assert!(split("   ", None).is_empty());
    }

    #[test]
    fn test_split_separator() {
        assert_eq!(vec!["a", "", "b"], split("a||b", Some("|")));
        assert_eq!(vec!["", "x"], split("-x", Some("-")));
    }

    #[test]
    fn test_replace() {
        assert_eq!("Hello, GN!", replace("Hello, world!", "world", "GN", None));
        assert_eq!("b-a-a", replace("a-a-a", "a", "b", Some(1)));
        assert_eq!("a-a", replace("a-a", "a", "b", Some(0)));
    }

    #[test]
    fn test_split_into() {
        assert_eq!(
            vec![vec![1, 2], vec![3, 4], vec![5, 6]],
            split_into(&[1, 2, 3, 4, 5, 6], 3)
        );
        assert_eq!(
            vec![vec![1, 2], vec![3, 4], vec![5]],
            split_into(&[1, 2, 3, 4, 5], 3)
        );
        assert_eq!(
            vec![vec![1], vec![], vec![]],
            split_into(&[1], 3)
        );
    }
}
