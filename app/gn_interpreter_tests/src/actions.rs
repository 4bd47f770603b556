/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use gn_core::label::Label;
use gn_interpreter::ast::Statement;
use gn_interpreter::testing::*;
use gn_node::action_values::OutputConversion;
use gn_node::target::Target;

use crate::expect_error;

fn eval_foo(kind: &str, body: Vec<Statement>) -> anyhow::Result<Arc<Target>> {
    Tester::new(vec![])?.eval_target("//foo/BUILD.gn", vec![target(kind, "foo", body)])
}

fn output_files(target: &Target, tester: &Tester) -> anyhow::Result<Vec<String>> {
    let files = target.action_values.output_files(
        tester.context().default_settings(),
        &target.label,
        &target.computed_output_name(),
        &target.sources,
    )?;
    Ok(files.iter().map(|f| f.value().to_owned()).collect())
}

#[test]
fn test_action_foreach_outputs() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![target(
            "action_foreach",
            "idl",
            vec![
                assign("script", string("//build/idl.py")),
                assign("sources", strings(&["a.idl", "b.idl"])),
                assign("outputs", strings(&["{{target_gen_dir}}/{{source_name_part}}.h"])),
                assign("args", strings(&["{{source}}", "-o", "{{target_gen_dir}}"])),
                assign("inputs", strings(&["//build/idl_lib.py"])),
            ],
        )],
    )?;
    assert_eq!("//build/idl.py", target.action_values.script.as_ref().unwrap().value());
    assert_eq!(3, target.action_values.args.len());
    assert_eq!("//build/idl_lib.py", target.config_values.inputs[0].value());
    assert_eq!(
        vec!["//out/Debug/gen/foo/a.h", "//out/Debug/gen/foo/b.h"],
        output_files(&target, &tester)?
    );
    Ok(())
}

#[test]
fn test_action_requires_script() {
    expect_error(
        eval_foo(
            "action",
            vec![assign("outputs", strings(&["//out/Debug/foo.txt"]))],
        ),
        "This target type requires a \"script\".",
    );
}

#[test]
fn test_action_outputs_in_build_dir() {
    expect_error(
        eval_foo(
            "action",
            vec![
                assign("script", string("run.py")),
                assign("outputs", strings(&["//foo/out.txt"])),
            ],
        ),
        "File is not inside output directory.",
    );
}

#[test]
fn test_action_rejects_source_expansion() {
    expect_error(
        eval_foo(
            "action",
            vec![
                assign("script", string("run.py")),
                assign("sources", strings(&["in.txt"])),
                assign("outputs", strings(&["{{source_gen_dir}}/out.txt"])),
            ],
        ),
        "Source expansions are not allowed in the outputs of an action.",
    );
    expect_error(
        eval_foo(
            "action",
            vec![
                assign("script", string("run.py")),
                assign("outputs", strings(&["{{root_gen_dir}}/out.txt"])),
                assign("args", strings(&["{{source}}"])),
            ],
        ),
        "Source expansions are not allowed in the args of an action.",
    );
}

#[test]
fn test_action_foreach_needs_source_expansion() {
    expect_error(
        eval_foo(
            "action_foreach",
            vec![
                assign("script", string("run.py")),
                assign("sources", strings(&["a.in"])),
                assign("outputs", strings(&["{{target_gen_dir}}/fixed.out"])),
            ],
        ),
        "action_foreach should have a pattern in the output.",
    );
}

#[test]
fn test_copy() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![target(
            "copy",
            "data",
            vec![
                assign("sources", strings(&["a.txt", "b.txt"])),
                assign("outputs", strings(&["{{root_out_dir}}/data/{{source_file_part}}"])),
            ],
        )],
    )?;
    assert_eq!(
        vec!["//out/Debug/data/a.txt", "//out/Debug/data/b.txt"],
        output_files(&target, &tester)?
    );
    Ok(())
}

#[test]
fn test_copy_errors() {
    expect_error(
        eval_foo(
            "copy",
            vec![assign("outputs", strings(&["//out/Debug/x"]))],
        ),
        "Empty sources for copy command.",
    );
    expect_error(
        eval_foo(
            "copy",
            vec![
                assign("sources", strings(&["a.txt"])),
                assign("outputs", strings(&["//out/Debug/a", "//out/Debug/b"])),
            ],
        ),
        "Copy command must have exactly one output.",
    );
    expect_error(
        eval_foo(
            "copy",
            vec![
                assign("sources", strings(&["a.txt", "b.txt"])),
                assign("outputs", strings(&["//out/Debug/both.txt"])),
            ],
        ),
        "Copy command must use a source expansion with multiple sources.",
    );
}

#[test]
fn test_generated_file_data_keys() -> anyhow::Result<()> {
    let target = eval_foo(
        "generated_file",
        vec![
            assign("outputs", strings(&["//out/Debug/gen/foo/meta.json"])),
            assign("data_keys", strings(&["files"])),
            assign("walk_keys", strings(&["walk"])),
            assign("rebase", string("//out/Debug")),
            assign("output_conversion", string("json")),
        ],
    )?;
    let values = &target.generated_file;
    assert!(values.contents.is_none());
    assert_eq!(vec!["files"], values.data_keys);
    assert_eq!(vec!["walk"], values.walk_keys);
    assert_eq!("//out/Debug/", values.rebase.as_ref().unwrap().value());
    assert_eq!(OutputConversion::Json, values.output_conversion);
    Ok(())
}

#[test]
fn test_generated_file_errors() {
    let output = || assign("outputs", strings(&["//out/Debug/gen/out.txt"]));
    expect_error(
        eval_foo("generated_file", vec![output()]),
        "Either \"contents\" or \"data_keys\" should be set.",
    );
    expect_error(
        eval_foo(
            "generated_file",
            vec![
                output(),
                assign("contents", string("x")),
                assign("data_keys", strings(&["k"])),
            ],
        ),
        "Can't specify both \"contents\" and \"data_keys\".",
    );
    expect_error(
        eval_foo(
            "generated_file",
            vec![
                output(),
                assign("contents", string("x")),
                assign("output_conversion", string("yaml")),
            ],
        ),
        "Not a valid output_conversion.\nGot \"yaml\"",
    );
    expect_error(
        eval_foo(
            "generated_file",
            vec![
                assign("outputs", strings(&["//out/Debug/a", "//out/Debug/b"])),
                assign("contents", string("x")),
            ],
        ),
        "generated_file target must have exactly one output.\nFound 2.",
    );
}

#[test]
fn test_metadata_and_visibility() -> anyhow::Result<()> {
    let target = eval_foo(
        "group",
        vec![
            assign("testonly", boolean(true)),
            assign("visibility", strings(&["//foo/*", ":friend"])),
            assign("data", strings(&["data.bin", "assets/"])),
            assign("write_runtime_deps", string("//out/Debug/foo.runtime_deps")),
        ],
    )?;
    assert!(target.testonly);
    let toolchain = target.label.toolchain_label().unwrap();
    let from = |l: &str| Label::testing_parse(l).with_toolchain(&toolchain);
    assert!(target.visibility.is_visible_to(&target.label, &from("//foo/sub:y")));
    assert!(!target.visibility.is_visible_to(&target.label, &from("//bar:x")));
    assert_eq!(vec!["//foo/data.bin", "//foo/assets/"], target.data);
    assert_eq!(
        "//out/Debug/foo.runtime_deps",
        target.write_runtime_deps.as_ref().unwrap().value()
    );
    Ok(())
}
