/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_interpreter::ast::Statement;
use gn_interpreter::testing::*;
use gn_node::output_type::OutputType;

use crate::expect_error;

/// `template("name") { kind(target_name) { body } }`
fn wrapping_template(name: &str, kind: &str, body: Vec<Statement>) -> Statement {
    call_with_block(
        "template",
        vec![string(name)],
        vec![call_with_block(kind, vec![ident("target_name")], body)],
    )
}

fn forward_all() -> Statement {
    call("forward_variables_from", vec![ident("invoker"), string("*")])
}

#[test]
fn test_template_sees_invoker_and_target_name() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![
            wrapping_template(
                "my_exe",
                "executable",
                vec![
                    assign("sources", member("invoker", "sources")),
                    assign("output_name", ident("target_name")),
                ],
            ),
            call_with_block(
                "my_exe",
                vec![string("app")],
                vec![assign("sources", strings(&["main.cc"]))],
            ),
        ],
    )?;
    assert_eq!("//foo:app", target.label.user_visible_name(false));
    assert_eq!(OutputType::Executable, target.output_type);
    assert_eq!("//foo/main.cc", target.sources[0].value());
    assert_eq!(Some("app"), target.output_name.as_deref());
    Ok(())
}

#[test]
fn test_forward_everything() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![
            wrapping_template("my_lib", "static_library", vec![forward_all()]),
            call_with_block(
                "my_lib",
                vec![string("lib")],
                vec![
                    assign("sources", strings(&["lib.cc"])),
                    assign("defines", strings(&["LIB"])),
                    // Invoker values nobody reads are not an error.
                    assign("_private", int(1)),
                ],
            ),
        ],
    )?;
    assert_eq!("//foo/lib.cc", target.sources[0].value());
    assert_eq!(vec!["LIB"], target.config_values.defines);
    Ok(())
}

#[test]
fn test_forward_with_exclusions() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![
            wrapping_template(
                "my_lib",
                "source_set",
                vec![
                    call(
                        "forward_variables_from",
                        vec![ident("invoker"), string("*"), strings(&["defines"])],
                    ),
                    assign("defines", strings(&["OWN"])),
                ],
            ),
            call_with_block(
                "my_lib",
                vec![string("lib")],
                vec![assign("defines", strings(&["FROM_INVOKER"]))],
            ),
        ],
    )?;
    assert_eq!(vec!["OWN"], target.config_values.defines);
    Ok(())
}

#[test]
fn test_forward_named_list_skips_missing() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![
            wrapping_template(
                "my_lib",
                "source_set",
                vec![call(
                    "forward_variables_from",
                    vec![ident("invoker"), strings(&["sources", "deps"])],
                )],
            ),
            call_with_block(
                "my_lib",
                vec![string("lib")],
                vec![assign("sources", strings(&["a.cc"]))],
            ),
        ],
    )?;
    assert_eq!(1, target.sources.len());
    assert!(target.deps.is_empty());
    Ok(())
}

#[test]
fn test_forward_does_not_clobber() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![
                wrapping_template(
                    "my_group",
                    "group",
                    vec![assign("testonly", boolean(false)), forward_all()],
                ),
                call_with_block(
                    "my_group",
                    vec![string("g")],
                    vec![assign("testonly", boolean(true))],
                ),
            ],
        ),
        "Clobbering existing value.\nThe current scope already defines a value \"testonly\".",
    );
    Ok(())
}

#[test]
fn test_forward_bad_variable_list() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![
                wrapping_template(
                    "my_group",
                    "group",
                    vec![call(
                        "forward_variables_from",
                        vec![ident("invoker"), string("deps")],
                    )],
                ),
                call_with_block("my_group", vec![string("g")], vec![]),
            ],
        ),
        "Not a valid list of variables to copy.",
    );
    Ok(())
}

#[test]
fn test_unused_template_variable() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![
                call_with_block(
                    "template",
                    vec![string("my_group")],
                    vec![
                        assign("leftover", int(3)),
                        call_with_block("group", vec![ident("target_name")], vec![]),
                    ],
                ),
                call_with_block("my_group", vec![string("g")], vec![]),
            ],
        ),
        "You set the variable \"leftover\" here and it was unused",
    );
    Ok(())
}

#[test]
fn test_template_cannot_shadow_builtin() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![wrapping_template("executable", "group", vec![])],
        ),
        "Template name \"executable\" is a built-in function.",
    );
    Ok(())
}

#[test]
fn test_duplicate_template() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![
                wrapping_template("twice", "group", vec![]),
                wrapping_template("twice", "group", vec![]),
            ],
        ),
        "A template called \"twice\" was already defined.",
    );
    Ok(())
}

#[test]
fn test_templates_from_build_config() -> anyhow::Result<()> {
    let tester = Tester::new(vec![wrapping_template(
        "my_group",
        "group",
        vec![assign("deps", member("invoker", "deps"))],
    )])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![call_with_block(
            "my_group",
            vec![string("g")],
            vec![assign("deps", strings(&["//bar"]))],
        )],
    )?;
    assert_eq!("//bar:bar", target.deps[0].user_visible_name(false));
    Ok(())
}

#[test]
fn test_set_defaults_for_target_kind() -> anyhow::Result<()> {
    let tester = Tester::new(vec![call_with_block(
        "set_defaults",
        vec![string("source_set")],
        vec![assign("configs", strings(&["//build:default"]))],
    )])?;
    let foo = tester.eval_target(
        "//foo/BUILD.gn",
        vec![target(
            "source_set",
            "foo",
            vec![append("configs", strings(&[":extra"]))],
        )],
    )?;
    assert_eq!(
        vec!["//build:default", "//foo:extra"],
        foo
            .configs
            .iter()
            .map(|l| l.user_visible_name(false))
            .collect::<Vec<_>>()
    );

    let bare = tester.eval_target("//foo/BUILD.gn", vec![target("source_set", "bare", vec![])])?;
    assert_eq!(1, bare.configs.len());
    Ok(())
}

#[test]
fn test_set_defaults_for_template() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![
            wrapping_template("my_lib", "source_set", vec![forward_all()]),
            call_with_block(
                "set_defaults",
                vec![string("my_lib")],
                vec![assign("defines", strings(&["DEFAULT"]))],
            ),
            call_with_block("my_lib", vec![string("lib")], vec![]),
        ],
    )?;
    assert_eq!(vec!["DEFAULT"], target.config_values.defines);
    Ok(())
}

#[test]
fn test_set_defaults_twice() -> anyhow::Result<()> {
    let defaults = || {
        call_with_block(
            "set_defaults",
            vec![string("group")],
            vec![assign("testonly", boolean(true))],
        )
    };
    expect_error(
        Tester::new(vec![defaults(), defaults()]).map(|_| ()),
        "You called set_defaults(\"group\") twice.",
    );
    Ok(())
}
