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
use gn_core::build_settings::Settings;
use gn_core::collections::ordered_set::OrderedSet;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::label::pattern::LabelPattern;
use gn_core::label::Label;
use starlark_map::small_map::SmallMap;

use crate::bundle::asset_catalog::asset_catalog_of;
use crate::bundle::bundle_file_rule::BundleFileRule;
use crate::output_type::OutputType;
use crate::substitution::SubstitutionContext;
use crate::substitution::SubstitutionList;
use crate::substitution::SubstitutionType;
use crate::target::Target;

#[derive(Debug, thiserror::Error)]
enum BundleDataError {
    #[error("Internal error: {0} is a {1}, only bundle_data targets can be added to a bundle.")]
    NotBundleData(Label, OutputType),
    #[error("Internal error: bundle_data target {0} has no output pattern.")]
    MissingOutput(Label),
}

/// The `bundle_*_dir` properties of a `create_bundle` target.
#[derive(Debug, Clone, Default, Eq, PartialEq, Allocative)]
pub struct BundleDirs {
    pub root_dir: Option<SourceDir>,
    pub contents_dir: Option<SourceDir>,
    pub resources_dir: Option<SourceDir>,
    pub executable_dir: Option<SourceDir>,
}

impl BundleDirs {
    pub fn get(&self, ty: SubstitutionType) -> Option<&SourceDir> {
        match ty {
            SubstitutionType::BundleRootDir => self.root_dir.as_ref(),
            SubstitutionType::BundleContentsDir => self.contents_dir.as_ref(),
            SubstitutionType::BundleResourcesDir => self.resources_dir.as_ref(),
            SubstitutionType::BundleExecutableDir => self.executable_dir.as_ref(),
            _ => None,
        }
    }
}

/// Bundle state carried by every target.
///
/// `bundle_data` targets only use `product_type`. `create_bundle` targets use all of it, other
/// targets only forward the `bundle_data` targets they depend on.
#[derive(Debug, Clone, Default, Allocative)]
pub struct BundleData {
    pub dirs: BundleDirs,
    pub product_type: String,
    pub transparent: bool,
    pub partial_info_plist: Option<SourceFile>,
    pub xcode_extra_attributes: SmallMap<String, String>,
    pub xcode_test_application_name: Option<String>,
    pub post_processing_script: Option<SourceFile>,
    pub post_processing_sources: Vec<SourceFile>,
    pub post_processing_outputs: SubstitutionList,
    pub post_processing_args: SubstitutionList,
    pub bundle_deps_filter: Vec<LabelPattern>,

    bundle_deps: Vec<Arc<Target>>,
    forwarded_bundle_deps: Vec<Arc<Target>>,
    file_rules: Vec<BundleFileRule>,
    assets_catalog_sources: OrderedSet<SourceFile>,
    assets_catalog_deps: OrderedSet<Label>,
}

impl BundleData {
    /// Record a `bundle_data` dependency.
    ///
    /// A `create_bundle` keeps it, unless it is transparent and the product types differ, in
    /// which case it is forwarded to whatever depends on the bundle. Other targets forward
    /// everything. Dependencies matching `bundle_deps_filter` are dropped.
    pub fn add_bundle_data(
        &mut self,
        target: &Arc<Target>,
        is_create_bundle: bool,
    ) -> anyhow::Result<()> {
        if target.output_type != OutputType::BundleData {
            return Err(BundleDataError::NotBundleData(
                target.label.dupe(),
                target.output_type,
            )
            .into());
        }
        if LabelPattern::matches_any(&self.bundle_deps_filter, &target.label) {
            tracing::debug!("bundle_data {} filtered out", target.label);
            return Ok(());
        }
        let keep = is_create_bundle
            && (!self.transparent || target.bundle_data.product_type == self.product_type);
        if keep {
            self.bundle_deps.push(target.dupe());
        } else {
            self.forwarded_bundle_deps.push(target.dupe());
        }
        Ok(())
    }

    pub fn bundle_deps(&self) -> &[Arc<Target>] {
        &self.bundle_deps
    }

    pub fn forwarded_bundle_deps(&self) -> &[Arc<Target>] {
        &self.forwarded_bundle_deps
    }

    pub fn file_rules(&self) -> &[BundleFileRule] {
        &self.file_rules
    }

    pub fn assets_catalog_sources(&self) -> &OrderedSet<SourceFile> {
        &self.assets_catalog_sources
    }

    pub fn assets_catalog_deps(&self) -> &OrderedSet<Label> {
        &self.assets_catalog_deps
    }

    /// Split the sources of the collected `bundle_data` targets into asset catalogs and one file
    /// rule per target. Returns the files the owning target must list as sources.
    pub fn on_target_resolved(&mut self) -> anyhow::Result<Vec<SourceFile>> {
        for target in &self.bundle_deps {
            let mut file_rule_sources = Vec::new();
            for source in &target.sources {
                match asset_catalog_of(source) {
                    Some(catalog) => {
                        self.assets_catalog_sources.insert(catalog);
                        self.assets_catalog_deps.insert(target.label.dupe());
                    }
                    None => file_rule_sources.push(source.clone()),
                }
            }
            if file_rule_sources.is_empty() {
                continue;
            }
            let output = target
                .action_values
                .outputs
                .patterns()
                .first()
                .ok_or_else(|| BundleDataError::MissingOutput(target.label.dupe()))?;
            self.file_rules.push(BundleFileRule::new(
                target.label.dupe(),
                target.origin.dupe(),
                file_rule_sources,
                output.clone(),
            ));
        }
        Ok(self.get_source_files())
    }

    /// Inputs of the bundle: file rule sources, asset catalogs and post-processing sources.
    pub fn get_source_files(&self) -> Vec<SourceFile> {
        let mut sources: Vec<SourceFile> = Vec::new();
        for rule in &self.file_rules {
            sources.extend(rule.sources().iter().cloned());
        }
        sources.extend(self.assets_catalog_sources.iter().cloned());
        if let Some(script) = &self.post_processing_script {
            sources.push(script.clone());
            sources.extend(self.post_processing_sources.iter().cloned());
        }
        sources
    }

    /// Everything the bundle produces, ending with the bundle root directory itself.
    pub fn get_outputs_as_source_files(
        &self,
        settings: &Settings,
        owner: &Target,
    ) -> anyhow::Result<Vec<SourceFile>> {
        let mut outputs = Vec::new();
        for rule in &self.file_rules {
            for source in rule.sources() {
                outputs.push(rule.apply_pattern_to_source(settings, owner, self, source)?);
            }
        }
        outputs.extend(self.get_generated_outputs(settings, owner)?);
        Ok(outputs)
    }

    /// The outputs that are not copies of a source: the compiled asset catalog, the partial
    /// plist, post-processing outputs and the bundle root marker.
    pub fn get_generated_outputs(
        &self,
        settings: &Settings,
        owner: &Target,
    ) -> anyhow::Result<Vec<SourceFile>> {
        let mut outputs = Vec::new();
        if !self.assets_catalog_sources.is_empty() {
            if let Some(car) = self.compiled_asset_catalog_path() {
                outputs.push(car);
            }
        }
        if let Some(plist) = &self.partial_info_plist {
            outputs.push(plist.clone());
        }
        if self.post_processing_script.is_some() {
            let output_name = owner.computed_output_name();
            let ctx = SubstitutionContext::new(settings)
                .with_target(&owner.label, &output_name)
                .with_bundle(&self.dirs);
            for pattern in self.post_processing_outputs.patterns() {
                let expanded = pattern.expand(&ctx)?;
                outputs.push(SourceDir::root().resolve_relative_file(&expanded)?);
            }
        }
        if let Some(root) = self.bundle_root_dir_output() {
            outputs.push(root);
        }
        Ok(outputs)
    }

    /// `Assets.car` in the resources directory.
    pub fn compiled_asset_catalog_path(&self) -> Option<SourceFile> {
        self.dirs
            .resources_dir
            .as_ref()
            .map(|dir| SourceFile::unchecked_new(format!("{}Assets.car", dir.value())))
    }

    pub fn bundle_root_dir_output(&self) -> Option<SourceFile> {
        self.dirs
            .root_dir
            .as_ref()
            .map(|dir| SourceFile::unchecked_new(dir.with_no_trailing_slash()))
    }
}
