/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The items produced by evaluating build files: targets, configs and pools, together with the
//! per-language value bags hung off targets.

pub mod action_values;
pub mod bundle;
pub mod config;
pub mod config_values;
pub mod item;
pub mod output_type;
pub mod pool;
pub mod rust_values;
pub mod substitution;
pub mod swift_values;
pub mod target;
pub mod toolchain;
pub mod visibility;
