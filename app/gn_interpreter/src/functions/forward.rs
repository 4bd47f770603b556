/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use dupe::Dupe;
use gn_core::origin::OriginContext;
use thiserror::Error;

use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::check_arg_count;
use crate::scope::Scope;
use crate::value::Value;
use crate::value_extractors::extract_list_of_strings;

#[derive(Debug, Error)]
enum ForwardError {
    #[error(
        "Clobbering existing value.\nThe current scope already defines a value \"{0}\".\n\
        forward_variables_from() won't clobber existing values. If you want to\n\
        merge lists, you'll need to do this explicitly."
    )]
    Clobber(String),
    #[error("Not a valid list of variables to copy.\nExpecting either the string \"*\" or a list of strings.")]
    BadVariableList,
}

/// `forward_variables_from(from_scope, "*" | [names], [excluded])`
///
/// With `"*"` every non-excluded value is copied and counts as used; with a list, only the
/// listed names present in `from_scope` are copied.
pub(crate) fn forward_variables_from(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    _eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_arg_count(call, &args, 2, 3)?;
    let source = args[0].as_scope().at(&call.origin)?;
    let excluded = match args.get(2) {
        Some(v) => extract_list_of_strings(v).at(&call.origin)?,
        None => Vec::new(),
    };
    let forward_all = match &args[1] {
        Value::String(s) if s == "*" => true,
        Value::List(_) => false,
        _ => return Err(ForwardError::BadVariableList).at(&call.origin),
    };

    let names: Vec<String> = if forward_all {
        source
            .iter()
            .map(|(k, _)| k.to_owned())
            .filter(|k| !k.starts_with('_'))
            .collect()
    } else {
        extract_list_of_strings(&args[1]).at(&call.origin)?
    };
    for name in names {
        if excluded.contains(&name) {
            continue;
        }
        let value = match source.get(&name) {
            Some(v) => v.clone(),
            None => continue,
        };
        if scope.has_local(&name) {
            return Err(ForwardError::Clobber(name)).at(&call.origin);
        }
        if forward_all {
            scope.set_used_value(name, value, call.origin.dupe());
        } else {
            scope.set_value(name, value, call.origin.dupe());
        }
    }
    Ok(Value::None)
}
