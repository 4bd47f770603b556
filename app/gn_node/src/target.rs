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
use gn_core::build_settings::Settings;
use gn_core::collections::ordered_set::OrderedSet;
use gn_core::fs::source_dir::SourceDir;
use gn_core::fs::source_file::SourceFile;
use gn_core::fs::source_file_type::SourceFileTypeSet;
use gn_core::label::pattern::LabelPattern;
use gn_core::label::Label;
use gn_core::origin::Origin;

use crate::action_values::ActionValues;
use crate::action_values::GeneratedFileValues;
use crate::bundle::bundle_data::BundleData;
use crate::config_values::ConfigValues;
use crate::output_type::OutputType;
use crate::rust_values::RustValues;
use crate::swift_values::SwiftValues;
use crate::toolchain::Toolchain;
use crate::visibility::Visibility;

/// A node of the build graph.
///
/// Generators fill it in while the declaring block's scope is alive; once published as an
/// [`crate::item::Item`] it is only changed by the resolution hooks
/// ([`Target::pull_bundle_data`], [`Target::on_resolved`]).
#[derive(Debug, Clone, Allocative)]
pub struct Target {
    pub label: Label,
    pub origin: Origin,
    pub output_type: OutputType,

    pub output_name: Option<String>,
    pub output_prefix_override: bool,
    pub output_dir: Option<SourceDir>,
    pub output_extension: Option<String>,

    pub sources: Vec<SourceFile>,
    pub source_types_used: SourceFileTypeSet,
    pub public_headers: Vec<SourceFile>,
    /// No `public` list was given: every header is public.
    pub all_headers_public: bool,
    pub friends: Vec<LabelPattern>,
    pub check_includes: bool,

    pub configs: OrderedSet<Label>,
    pub all_dependent_configs: OrderedSet<Label>,
    pub public_configs: OrderedSet<Label>,

    pub deps: Vec<Label>,
    pub public_deps: Vec<Label>,
    pub data_deps: Vec<Label>,
    pub gen_deps: Vec<Label>,

    pub data: Vec<String>,
    #[allocative(skip)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub testonly: bool,
    pub assert_no_deps: Vec<LabelPattern>,
    pub visibility: Visibility,
    pub write_runtime_deps: Option<SourceFile>,

    pub allow_circular_includes_from: OrderedSet<Label>,
    pub complete_static_lib: bool,
    pub pool: Option<Label>,

    pub config_values: ConfigValues,
    pub rust_values: Option<RustValues>,
    pub swift_values: Option<SwiftValues>,
    pub bundle_data: BundleData,
    pub action_values: ActionValues,
    pub generated_file: GeneratedFileValues,
}

impl Target {
    pub fn new(label: Label, origin: Origin, output_type: OutputType) -> Target {
        Target {
            label,
            origin,
            output_type,
            output_name: None,
            output_prefix_override: false,
            output_dir: None,
            output_extension: None,
            sources: Vec::new(),
            source_types_used: SourceFileTypeSet::default(),
            public_headers: Vec::new(),
            all_headers_public: true,
            friends: Vec::new(),
            check_includes: true,
            configs: OrderedSet::new(),
            all_dependent_configs: OrderedSet::new(),
            public_configs: OrderedSet::new(),
            deps: Vec::new(),
            public_deps: Vec::new(),
            data_deps: Vec::new(),
            gen_deps: Vec::new(),
            data: Vec::new(),
            metadata: serde_json::Map::new(),
            testonly: false,
            assert_no_deps: Vec::new(),
            visibility: Visibility::Public,
            write_runtime_deps: None,
            allow_circular_includes_from: OrderedSet::new(),
            complete_static_lib: false,
            pool: None,
            config_values: ConfigValues::default(),
            rust_values: None,
            swift_values: None,
            bundle_data: BundleData::default(),
            action_values: ActionValues::default(),
            generated_file: GeneratedFileValues::default(),
        }
    }

    /// `output_name`, defaulting to the label name.
    pub fn computed_output_name(&self) -> String {
        match &self.output_name {
            Some(name) => name.clone(),
            None => self.label.name().to_owned(),
        }
    }

    /// `public_deps` then `deps`.
    pub fn linked_deps(&self) -> impl Iterator<Item = &Label> {
        self.public_deps.iter().chain(self.deps.iter())
    }

    /// Every dependency, linked or not.
    pub fn all_deps(&self) -> impl Iterator<Item = &Label> {
        self.linked_deps()
            .chain(self.data_deps.iter())
            .chain(self.gen_deps.iter())
    }

    /// Collect `bundle_data` targets from resolved linked dependencies.
    ///
    /// Does not cross toolchains, and non-transparent `create_bundle` dependencies stop the
    /// propagation: their `bundle_data` is already in a bundle.
    pub fn pull_bundle_data(&mut self, linked_deps: &[Arc<Target>]) -> anyhow::Result<()> {
        let is_create_bundle = self.output_type == OutputType::CreateBundle;
        for dep in linked_deps {
            if dep.output_type == OutputType::CreateBundle && !dep.bundle_data.transparent {
                continue;
            }
            if !dep.label.toolchains_equal(&self.label) {
                continue;
            }
            if dep.output_type == OutputType::BundleData {
                self.bundle_data.add_bundle_data(dep, is_create_bundle)?;
            }
            for forwarded in dep.bundle_data.forwarded_bundle_deps() {
                self.bundle_data.add_bundle_data(forwarded, is_create_bundle)?;
            }
        }
        Ok(())
    }

    /// Finish the target once its dependencies are known.
    ///
    /// For `create_bundle` this lists the bundle's inputs and its generated outputs as sources,
    /// so the composed bundle is tracked like any other input set.
    pub fn on_resolved(&mut self, settings: &Settings, toolchain: &Toolchain) -> anyhow::Result<()> {
        if self.output_type == OutputType::CreateBundle {
            let sources = self.bundle_data.on_target_resolved()?;
            self.sources.extend(sources);
            let generated = self.bundle_data.get_generated_outputs(settings, self)?;
            for file in generated {
                if !self.sources.contains(&file) {
                    self.sources.push(file);
                }
            }
        }
        let output_name = self.computed_output_name();
        if let Some(swift) = &mut self.swift_values {
            swift.fill_module_output_file(settings, &self.label, &output_name, toolchain)?;
        }
        tracing::debug!("Resolved {}", self.label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gn_core::build_settings::BuildSettings;
    use gn_core::path_map::PathMap;

    use super::*;
    use crate::substitution::SubstitutionList;

    fn settings() -> Settings {
        Settings::new(
            Arc::new(BuildSettings::new(
                SourceDir::unchecked_new("//out/"),
                PathMap::default(),
            )),
            Label::testing_parse("//tc:default"),
        )
    }

    fn bundle_data(label: &str, product_type: &str, sources: &[&str]) -> Arc<Target> {
        let mut t = Target::new(
            Label::testing_parse(label),
            Origin::builtin(),
            OutputType::BundleData,
        );
        t.sources = sources.iter().map(|s| SourceFile::unchecked_new(*s)).collect();
        t.action_values.outputs =
            SubstitutionList::parse(&["{{bundle_resources_dir}}/{{source_file_part}}"]).unwrap();
        t.bundle_data.product_type = product_type.to_owned();
        Arc::new(t)
    }

    fn create_bundle(label: &str) -> Target {
        let mut t = Target::new(
            Label::testing_parse(label),
            Origin::builtin(),
            OutputType::CreateBundle,
        );
        t.bundle_data.dirs.root_dir = Some(SourceDir::unchecked_new("//out/Foo.app/"));
        t.bundle_data.dirs.resources_dir =
            Some(SourceDir::unchecked_new("//out/Foo.app/Resources/"));
        t
    }

    #[test]
    fn test_catalog_and_file_rule_routing() {
        let catalog = bundle_data(
            "//app:assets",
            "",
            &[
                "//app/Foo.xcassets/Contents.json",
                "//app/Foo.xcassets/AppIcon.appiconset/icon.png",
            ],
        );
        let plain = bundle_data("//app:resources", "", &["//app/resources/data.bin"]);
        let mut bundle = create_bundle("//app:bundle");
        bundle.pull_bundle_data(&[catalog, plain]).unwrap();
        bundle
            .on_resolved(&settings(), &Toolchain::new(Label::testing_parse("//tc:default")))
            .unwrap();

        assert_eq!(
            vec!["//app:assets"],
            bundle
                .bundle_data
                .assets_catalog_deps()
                .iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
        );
        assert_eq!(1, bundle.bundle_data.file_rules().len());
        assert_eq!("//app:resources", bundle.bundle_data.file_rules()[0].target().to_string());
        assert_eq!(
            vec![
                "//app/resources/data.bin",
                "//app/Foo.xcassets",
                "//out/Foo.app/Resources/Assets.car",
                "//out/Foo.app",
            ],
            bundle.sources.iter().map(|s| s.value()).collect::<Vec<_>>()
        );

        let outputs = bundle
            .bundle_data
            .get_outputs_as_source_files(&settings(), &bundle)
            .unwrap();
        assert_eq!(
            vec![
                "//out/Foo.app/Resources/data.bin",
                "//out/Foo.app/Resources/Assets.car",
                "//out/Foo.app",
            ],
            outputs.iter().map(|s| s.value()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_resolved_bundle_lists_generated_outputs() {
        let mut bundle = create_bundle("//app:bundle");
        bundle.bundle_data.partial_info_plist =
            Some(SourceFile::unchecked_new("//out/gen/partial.plist"));
        bundle.bundle_data.post_processing_script =
            Some(SourceFile::unchecked_new("//build/sign.py"));
        bundle.bundle_data.post_processing_outputs =
            SubstitutionList::parse(&["{{bundle_root_dir}}/_CodeSignature"]).unwrap();
        bundle
            .on_resolved(&settings(), &Toolchain::new(Label::testing_parse("//tc:default")))
            .unwrap();
        assert_eq!(
            vec![
                "//build/sign.py",
                "//out/gen/partial.plist",
                "//out/Foo.app/_CodeSignature",
                "//out/Foo.app",
            ],
            bundle.sources.iter().map(|s| s.value()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_missing_bundle_dir() {
        let plain = bundle_data("//app:resources", "", &["//app/data.bin"]);
        let mut bundle = create_bundle("//app:bundle");
        bundle.bundle_data.dirs.resources_dir = None;
        bundle.pull_bundle_data(&[plain]).unwrap();
        bundle
            .on_resolved(&settings(), &Toolchain::new(Label::testing_parse("//tc:default")))
            .unwrap();
        let err = bundle
            .bundle_data
            .get_outputs_as_source_files(&settings(), &bundle)
            .unwrap_err();
        assert_eq!(
            "Property bundle_resources_dir is required.\nIn order to expand \
            {{bundle_resources_dir}} in //app:resources, //app:bundle should have \
            bundle_resources_dir defined, but it is missing.",
            err.to_string()
        );
    }

    #[test]
    fn test_forwarding_through_intermediate_targets() {
        let data = bundle_data("//lib:data", "", &["//lib/x.txt"]);
        let mut lib = Target::new(
            Label::testing_parse("//lib:lib"),
            Origin::builtin(),
            OutputType::SourceSet,
        );
        lib.pull_bundle_data(&[data]).unwrap();
        assert_eq!(1, lib.bundle_data.forwarded_bundle_deps().len());

        let mut bundle = create_bundle("//app:bundle");
        bundle.pull_bundle_data(&[Arc::new(lib)]).unwrap();
        assert_eq!(1, bundle.bundle_data.bundle_deps().len());
        assert!(bundle.bundle_data.forwarded_bundle_deps().is_empty());
    }

    #[test]
    fn test_transparent_bundle_forwards_other_product_types() {
        let same = bundle_data("//a:same", "app", &["//a/x.txt"]);
        let other = bundle_data("//a:other", "framework", &["//a/y.txt"]);
        let mut bundle = create_bundle("//a:bundle");
        bundle.bundle_data.transparent = true;
        bundle.bundle_data.product_type = "app".to_owned();
        bundle.pull_bundle_data(&[same, other]).unwrap();
        assert_eq!("//a:same", bundle.bundle_data.bundle_deps()[0].label.to_string());
        assert_eq!(
            "//a:other",
            bundle.bundle_data.forwarded_bundle_deps()[0].label.to_string()
        );

        // A non-transparent outer bundle picks up the forwarded dependency.
        let mut outer = create_bundle("//a:outer");
        outer.pull_bundle_data(&[Arc::new(bundle)]).unwrap();
        assert_eq!(1, outer.bundle_data.bundle_deps().len());
        assert_eq!("//a:other", outer.bundle_data.bundle_deps()[0].label.to_string());
    }

    #[test]
    fn test_bundle_deps_filter() {
        let data = bundle_data("//a:data", "", &["//a/x.txt"]);
        let mut bundle = create_bundle("//a:bundle");
        bundle.bundle_data.bundle_deps_filter = vec![LabelPattern::everything()];
        bundle.pull_bundle_data(&[data]).unwrap();
        assert!(bundle.bundle_data.bundle_deps().is_empty());
    }
}
