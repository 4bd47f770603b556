/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Leaf types of the build-description evaluator: where things come from ([`origin`]),
//! how paths and labels are spelled and resolved ([`fs`], [`path_map`], [`label`]) and
//! the settings every resolution is performed against ([`build_settings`]).

pub mod build_settings;
pub mod collections;
pub mod env;
pub mod fs;
pub mod label;
pub mod logging;
pub mod origin;
pub mod path_map;
