/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use allocative::Allocative;
use dupe::Dupe;
use gn_core::build_settings::Settings;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::Label;
use gn_core::origin::Origin;

use crate::bundle::bundle_data::BundleData;
use crate::substitution::SubstitutionContext;
use crate::substitution::SubstitutionPattern;
use crate::target::Target;

#[derive(Debug, thiserror::Error)]
enum BundleFileRuleError {
    #[error(
        "Property {0} is required.\nIn order to expand {{{{{0}}}}} in {1}, {2} should have \
        {0} defined, but it is missing."
    )]
    PropertyRequired(&'static str, Label, Label),
}

/// Copies the non asset catalog sources of one `bundle_data` target into the bundle.
#[derive(Debug, Clone, Allocative)]
pub struct BundleFileRule {
    /// The `bundle_data` target the rule comes from. Diagnostics only.
    target: Label,
    origin: Origin,
    sources: Vec<SourceFile>,
    pattern: SubstitutionPattern,
}

impl BundleFileRule {
    pub fn new(
        target: Label,
        origin: Origin,
        sources: Vec<SourceFile>,
        pattern: SubstitutionPattern,
    ) -> BundleFileRule {
        BundleFileRule {
            target,
            origin,
            sources,
            pattern,
        }
    }

    pub fn target(&self) -> &Label {
        &self.target
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn pattern(&self) -> &SubstitutionPattern {
        &self.pattern
    }

    /// Where `source` lands inside the bundle built by `owner`.
    pub fn apply_pattern_to_source(
        &self,
        settings: &Settings,
        owner: &Target,
        bundle: &BundleData,
        source: &SourceFile,
    ) -> anyhow::Result<SourceFile> {
        for ty in self.pattern.placeholders().filter(|t| t.is_bundle()) {
            if bundle.dirs.get(ty).is_none() {
                return Err(BundleFileRuleError::PropertyRequired(
                    ty.name(),
                    self.target.dupe(),
                    owner.label.dupe(),
                )
                .into());
            }
        }
        let output_name = owner.computed_output_name();
        let ctx = SubstitutionContext::new(settings)
            .with_target(&owner.label, &output_name)
            .with_bundle(&bundle.dirs)
            .with_source(source);
        let expanded = self.pattern.expand(&ctx)?;
        Ok(SourceDir::root().resolve_relative_file(&expanded)?)
    }
}
