/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

#![cfg(test)]

mod actions;
mod binary;
mod bundle;
mod deferred_updates;
mod functions;
mod path_map;
mod templates;

use std::fmt::Debug;

/// Assert that `result` failed and that the full error chain mentions `expected`.
#[track_caller]
pub(crate) fn expect_error<T: Debug>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(v) => panic!("Expected an error containing `{}`, got {:?}", expected, v),
        Err(e) => {
            let text = format!("{:#}", e);
            assert!(
                text.contains(expected),
                "Expected an error containing `{}`, got `{}`",
                expected,
                text
            );
        }
    }
}
