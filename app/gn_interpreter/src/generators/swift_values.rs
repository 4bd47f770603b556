/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_node::swift_values::SwiftValues;
use gn_node::target::Target;

use crate::value_extractors::ScopeFields;

/// The module output file is left for the resolution phase.
pub(crate) fn fill_swift_values(
    fields: &ScopeFields<'_, '_>,
    target: &Target,
) -> anyhow::Result<SwiftValues> {
    let mut values = SwiftValues::default();
    values.bridge_header = fields.file("bridge_header")?;
    values.module_name = fields
        .string("module_name")?
        .unwrap_or_else(|| target.label.name().to_owned());
    Ok(values)
}
