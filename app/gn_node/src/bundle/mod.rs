/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Assembly of `bundle_data` targets into the `create_bundle` targets that depend on them.
//!
//! Collection happens while dependencies are walked ([`bundle_data::BundleData::add_bundle_data`]),
//! then the owning target turns what it collected into file rules and asset catalogs once it is
//! resolved ([`bundle_data::BundleData::on_target_resolved`]).

pub mod asset_catalog;
pub mod bundle_data;
pub mod bundle_file_rule;
