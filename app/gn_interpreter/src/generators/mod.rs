/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Turn the scope a target block left behind into a [`Target`].
//!
//! Every generator reads its variables through [`ScopeFields`], so whatever it reads counts as
//! used, and stops at the first error. A target is only returned when every step succeeded.

use dupe::Dupe;
use gn_core::build_settings::Settings;
use gn_core::label::Label;
use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::output_type::OutputType;
use gn_node::substitution::SubstitutionList;
use gn_node::substitution::SubstitutionPattern;
use gn_node::substitution::SubstitutionType;
use gn_node::target::Target;
use thiserror::Error;

use crate::ast::FunctionCall;
use crate::scope::Scope;
use crate::value_extractors::extract_list_of_strings;
use crate::value_extractors::ScopeFields;

pub(crate) mod action;
pub(crate) mod binary;
pub(crate) mod bundle;
pub(crate) mod config_values;
pub(crate) mod copy;
pub(crate) mod generated_file;
pub(crate) mod rust_values;
pub(crate) mod swift_values;
pub(crate) mod target;

#[derive(Debug, Error)]
pub(crate) enum GeneratorError {
    #[error(
        "File is not inside output directory.\nThe given file should be in the output directory. \
        Normally you would specify\n\"$target_out_dir/foo\" or \"$target_gen_dir/foo\". I \
        interpreted this as\n\"{0}\"."
    )]
    NotInOutputDir(String),
    #[error("This target type requires a \"{0}\".")]
    Required(&'static str),
}

pub(crate) fn generate_target(
    scope: &Scope<'_>,
    call: &FunctionCall,
    label: Label,
    kind: OutputType,
    settings: &Settings,
) -> anyhow::Result<Target> {
    let fields = ScopeFields::new(scope, settings);
    let mut target = Target::new(label, call.origin.dupe(), kind);
    target::fill_generic(&fields, &mut target)?;
    match kind {
        OutputType::Action | OutputType::ActionForeach => {
            action::fill_action(&fields, &mut target, &call.origin)?
        }
        OutputType::BundleData => bundle::fill_bundle_data(&fields, &mut target, &call.origin)?,
        OutputType::CreateBundle => bundle::fill_create_bundle(&fields, &mut target)?,
        OutputType::Copy => copy::fill_copy(&fields, &mut target, &call.origin)?,
        OutputType::GeneratedFile => {
            generated_file::fill_generated_file(&fields, &mut target, &call.origin)?
        }
        OutputType::Group => {}
        OutputType::Executable
        | OutputType::SharedLibrary
        | OutputType::LoadableModule
        | OutputType::StaticLibrary
        | OutputType::SourceSet
        | OutputType::RustLibrary
        | OutputType::RustProcMacro => binary::fill_binary(&fields, &mut target, &call.origin)?,
    }
    Ok(target)
}

/// Where to report a problem with `name`: its assignment, or the declaration when unset.
pub(crate) fn origin_of(fields: &ScopeFields<'_, '_>, name: &str, declaration: &Origin) -> Origin {
    fields
        .origin_of(name)
        .unwrap_or_else(|| declaration.dupe())
}

pub(crate) fn required<T>(value: Option<T>, name: &'static str, declaration: &Origin) -> anyhow::Result<T> {
    value
        .ok_or(GeneratorError::Required(name))
        .at(declaration)
}

pub(crate) fn ensure_in_output_dir(settings: &Settings, path: &str) -> anyhow::Result<()> {
    if settings.build_settings().build_dir().contains(path) {
        Ok(())
    } else {
        Err(GeneratorError::NotInOutputDir(path.to_owned()).into())
    }
}

/// A pattern is in the output directory when it starts with a placeholder that expands to
/// one, or when its leading text already names it.
pub(crate) fn ensure_pattern_in_output_dir(
    settings: &Settings,
    pattern: &SubstitutionPattern,
) -> anyhow::Result<()> {
    match pattern.first_placeholder() {
        Some(
            SubstitutionType::TargetOutDir
            | SubstitutionType::TargetGenDir
            | SubstitutionType::RootOutDir
            | SubstitutionType::RootGenDir
            | SubstitutionType::SourceOutDir
            | SubstitutionType::SourceGenDir,
        ) => Ok(()),
        Some(t) if t.is_bundle() => Ok(()),
        _ => ensure_in_output_dir(settings, &pattern.to_string()),
    }
}

/// Parse a list of substitution patterns, each of which must point into the output directory.
pub(crate) fn read_output_patterns(
    fields: &ScopeFields<'_, '_>,
    name: &str,
) -> anyhow::Result<Option<SubstitutionList>> {
    fields.read(name, |v| {
        let list = SubstitutionList::parse(&extract_list_of_strings(v)?)?;
        for pattern in list.patterns() {
            ensure_pattern_in_output_dir(fields.settings(), pattern)?;
        }
        Ok(list)
    })
}

pub(crate) fn read_patterns(
    fields: &ScopeFields<'_, '_>,
    name: &str,
) -> anyhow::Result<Option<SubstitutionList>> {
    fields.read(name, |v| SubstitutionList::parse(&extract_list_of_strings(v)?))
}
