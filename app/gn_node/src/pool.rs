/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use allocative::Allocative;
use gn_core::label::Label;
use gn_core::origin::Origin;

/// A named limit on how many actions referencing it may run at once.
#[derive(Debug, Clone, Eq, PartialEq, Allocative)]
pub struct Pool {
    pub label: Label,
    pub origin: Origin,
    pub depth: i64,
}

impl Pool {
    /// `//:console`, the pool reserved for actions that own the terminal.
    pub fn is_console(label: &Label) -> bool {
        label.dir().value() == "//" && label.name() == "console"
    }
}
