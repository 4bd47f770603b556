/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Evaluates parsed build files into targets, configs and pools.
//!
//! The build config is evaluated once by a [`build_context::BuildContextBuilder`]; the frozen
//! [`build_context::BuildContext`] then evaluates ordinary build files, possibly from many
//! threads at once.

pub mod ast;
pub mod build_context;
pub mod deferred_updates;
pub mod evaluator;
pub(crate) mod functions;
pub(crate) mod generators;
pub mod scope;
pub mod template;
pub mod testing;
pub mod value;
pub mod value_extractors;
