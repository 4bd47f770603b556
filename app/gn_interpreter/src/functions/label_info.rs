/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use dupe::Dupe;
use gn_core::build_settings::Settings;
use gn_core::fs::source_dir::SourceDir;
use gn_core::label::Label;
use gn_core::origin::OriginContext;
use thiserror::Error;

use crate::ast::FunctionCall;
use crate::evaluator::FileEvaluator;
use crate::functions::check_arg_count;
use crate::scope::Scope;
use crate::value::Value;

#[derive(Debug, Error)]
enum LabelInfoError {
    #[error(
        "Unknown value for \"what\" parameter.\nYou asked for \"{0}\". Expected one of: name, \
        dir, target_gen_dir, target_out_dir, root_gen_dir, root_out_dir, toolchain, \
        label_no_toolchain, label_with_toolchain."
    )]
    UnknownWhat(String),
}

/// A single property of a resolved label.
pub(crate) fn label_info(settings: &Settings, label: &Label, what: &str) -> anyhow::Result<String> {
    // Output directories follow the label's own toolchain, not the current one.
    let toolchain = label
        .toolchain_label()
        .unwrap_or_else(|| settings.toolchain_label().dupe());
    let label_settings = if &toolchain == settings.toolchain_label() {
        settings.dupe()
    } else {
        Settings::new(settings.build_settings().dupe(), toolchain.dupe())
    };
    let dir_string = |dir: SourceDir| dir.with_no_trailing_slash().to_owned();
    Ok(match what {
        "name" => label.name().to_owned(),
        "dir" => label.dir().with_no_trailing_slash().to_owned(),
        "target_gen_dir" => dir_string(label_settings.target_gen_dir(label.dir())),
        "target_out_dir" => dir_string(label_settings.target_out_dir(label.dir())),
        "root_gen_dir" => dir_string(label_settings.root_gen_dir()),
        "root_out_dir" => dir_string(label_settings.root_out_dir()),
        "toolchain" => toolchain.user_visible_name(false),
        "label_no_toolchain" => label.user_visible_name(false),
        "label_with_toolchain" => label.with_toolchain(&toolchain).user_visible_name(true),
        _ => return Err(LabelInfoError::UnknownWhat(what.to_owned()).into()),
    })
}

/// `get_label_info(label, what)`
pub(crate) fn get_label_info(
    scope: &mut Scope<'_>,
    call: &FunctionCall,
    args: Vec<Value>,
    eval: &FileEvaluator<'_>,
) -> anyhow::Result<Value> {
    check_arg_count(call, &args, 2, 2)?;
    let input = args[0].as_str().at(&call.origin)?;
    let what = args[1].as_str().at(&call.origin)?;
    let settings = eval.settings();
    let label = settings
        .label_resolver()
        .resolve(&scope.source_dir(), input)
        .at(&call.origin)?;
    Ok(Value::string(
        label_info(settings, &label, what).at(&call.origin)?,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gn_core::build_settings::BuildSettings;
    use gn_core::path_map::PathMap;

    use super::*;

    fn settings(toolchain: &str) -> Settings {
        let build = BuildSettings::new(SourceDir::unchecked_new("//out/Debug/"), PathMap::default())
            .with_default_toolchain(Label::testing_parse("//tc:default"));
        Settings::new(Arc::new(build), Label::testing_parse(toolchain))
    }

    #[test]
    fn test_label_info_default_toolchain() -> anyhow::Result<()> {
        let s = settings("//tc:default");
        let label = s.label_resolver().resolve(&SourceDir::root(), "//foo/bar:baz")?;
        assert_eq!("baz", label_info(&s, &label, "name")?);
        assert_eq!("//foo/bar", label_info(&s, &label, "dir")?);
        assert_eq!("//out/Debug/obj/foo/bar", label_info(&s, &label, "target_out_dir")?);
        assert_eq!("//out/Debug/gen/foo/bar", label_info(&s, &label, "target_gen_dir")?);
        assert_eq!("//out/Debug", label_info(&s, &label, "root_out_dir")?);
        assert_eq!("//tc:default", label_info(&s, &label, "toolchain")?);
        assert_eq!("//foo/bar:baz", label_info(&s, &label, "label_no_toolchain")?);
        assert_eq!(
            "//foo/bar:baz(//tc:default)",
            label_info(&s, &label, "label_with_toolchain")?
        );
        Ok(())
    }

    #[test]
    fn test_label_info_other_toolchain() -> anyhow::Result<()> {
        let s = settings("//tc:default");
        let label = s
            .label_resolver()
            .resolve(&SourceDir::root(), "//foo:baz(//tc:arm)")?;
        assert_eq!("//out/Debug/arm/obj/foo", label_info(&s, &label, "target_out_dir")?);
        assert_eq!("//out/Debug/arm/gen", label_info(&s, &label, "root_gen_dir")?);
        assert_eq!("//tc:arm", label_info(&s, &label, "toolchain")?);
        Ok(())
    }

    #[test]
    fn test_label_info_unknown() {
        let s = settings("//tc:default");
        let label = Label::testing_parse("//foo:baz");
        let err = label_info(&s, &label, "flavor").unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown value for \"what\""));
    }
}
