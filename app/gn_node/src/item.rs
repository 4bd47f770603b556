/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use allocative::Allocative;
use dupe::Dupe;
use gn_core::label::Label;
use gn_core::origin::Origin;

use crate::config::Config;
use crate::pool::Pool;
use crate::target::Target;
use crate::visibility::Visibility;

/// Something a build file declares and hands to dependency resolution.
#[derive(Debug, Clone, Dupe, Allocative)]
pub enum Item {
    Target(Arc<Target>),
    Config(Arc<Config>),
    Pool(Arc<Pool>),
}

impl Item {
    pub fn label(&self) -> &Label {
        match self {
            Item::Target(t) => &t.label,
            Item::Config(c) => &c.label,
            Item::Pool(p) => &p.label,
        }
    }

    pub fn origin(&self) -> &Origin {
        match self {
            Item::Target(t) => &t.origin,
            Item::Config(c) => &c.origin,
            Item::Pool(p) => &p.origin,
        }
    }

    pub fn item_type_name(&self) -> &'static str {
        match self {
            Item::Target(_) => "target",
            Item::Config(_) => "config",
            Item::Pool(_) => "pool",
        }
    }

    /// Pools are visible to everything.
    pub fn visibility(&self) -> Visibility {
        match self {
            Item::Target(t) => t.visibility.dupe(),
            Item::Config(c) => c.visibility.dupe(),
            Item::Pool(_) => Visibility::Public,
        }
    }

    pub fn as_target(&self) -> Option<&Arc<Target>> {
        match self {
            Item::Target(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<&Arc<Config>> {
        match self {
            Item::Config(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_pool(&self) -> Option<&Arc<Pool>> {
        match self {
            Item::Pool(p) => Some(p),
            _ => None,
        }
    }
}
