/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use allocative::Allocative;
use gn_core::collections::ordered_set::OrderedSet;
use gn_core::label::Label;
use gn_core::origin::Origin;

use crate::config_values::ConfigValues;
use crate::visibility::Visibility;

/// A named set of [`ConfigValues`] that targets refer to by label.
#[derive(Debug, Clone, Eq, PartialEq, Allocative)]
pub struct Config {
    pub label: Label,
    pub origin: Origin,
    pub own_values: ConfigValues,
    /// Sub-configs, applied after this config's own values.
    pub configs: OrderedSet<Label>,
    pub visibility: Visibility,
    pub testonly: bool,
}

impl Config {
    pub fn new(label: Label, origin: Origin) -> Config {
        Config {
            label,
            origin,
            own_values: ConfigValues::default(),
            configs: OrderedSet::new(),
            visibility: Visibility::Public,
            testonly: false,
        }
    }

    /// Own values followed by the resolved values of each sub-config, in `configs` order.
    pub fn resolved_values<'a>(
        &self,
        sub_configs: impl IntoIterator<Item = &'a ConfigValues>,
    ) -> ConfigValues {
        let mut values = self.own_values.clone();
        for sub in sub_configs {
            values.append(sub);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_values_order() {
        let mut config = Config::new(Label::testing_parse("//a:cfg"), Origin::builtin());
        config.own_values.defines = vec!["OWN".to_owned()];
        let sub = ConfigValues {
            defines: vec!["SUB".to_owned()],
            ..Default::default()
        };
        assert_eq!(vec!["OWN", "SUB"], config.resolved_values([&sub]).defines);
    }
}
