/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use assert_matches::assert_matches;
use gn_interpreter::ast::Expr;
use gn_interpreter::testing::*;
use gn_node::item::Item;

use crate::expect_error;

/// Evaluate `expr` as the `contents` of a `generated_file` and return it as JSON.
fn eval_contents(expr: Expr) -> anyhow::Result<String> {
    eval_contents_in("//foo/BUILD.gn", TESTING_DEFAULT_TOOLCHAIN, expr)
}

fn eval_contents_in(file: &str, toolchain: &str, expr: Expr) -> anyhow::Result<String> {
    let tester = Tester::new(vec![])?;
    let items = tester.eval_in_toolchain(
        toolchain,
        file,
        vec![target(
            "generated_file",
            "contents",
            vec![
                assign("outputs", strings(&["//out/Debug/gen/contents.json"])),
                assign("contents", expr),
            ],
        )],
    )?;
    let target = items[0].as_target().unwrap();
    Ok(target.generated_file.contents.as_ref().unwrap().to_string())
}

#[test]
fn test_string_join() -> anyhow::Result<()> {
    assert_eq!(
        "\"a, b, c\"",
        eval_contents(call_expr(
            "string_join",
            vec![string(", "), strings(&["a", "b", "c"])]
        ))?
    );
    assert_eq!(
        "\"\"",
        eval_contents(call_expr("string_join", vec![string("-"), list(vec![])]))?
    );
    expect_error(
        eval_contents(call_expr(
            "string_join",
            vec![string("-"), list(vec![string("a"), int(1)])],
        )),
        "This is not a string.",
    );
    Ok(())
}

#[test]
fn test_string_split() -> anyhow::Result<()> {
    assert_eq!(
        "[\"a\",\"b\"]",
        eval_contents(call_expr("string_split", vec![string("  a \t b ")]))?
    );
    assert_eq!(
        "[\"a\",\"\",\"b\"]",
        eval_contents(call_expr("string_split", vec![string("a||b"), string("|")]))?
    );
    expect_error(
        eval_contents(call_expr("string_split", vec![string("a"), string("")])),
        "Separator argument is empty.",
    );
    Ok(())
}

#[test]
fn test_string_replace() -> anyhow::Result<()> {
    assert_eq!(
        "\"x-x-a\"",
        eval_contents(call_expr(
            "string_replace",
            vec![string("a-a-a"), string("a"), string("x"), int(2)]
        ))?
    );
    assert_eq!(
        "\"x-x-x\"",
        eval_contents(call_expr(
            "string_replace",
            vec![string("a-a-a"), string("a"), string("x")]
        ))?
    );
    assert_eq!(
        "\"abc\"",
        eval_contents(call_expr(
            "string_replace",
            vec![string("abc"), string(""), string("x")]
        ))?
    );
    expect_error(
        eval_contents(call_expr(
            "string_replace",
            vec![string("a"), string("a"), string("b"), int(-1)],
        )),
        "Requested number of replacements -1 is out of range.",
    );
    Ok(())
}

#[test]
fn test_split_list() -> anyhow::Result<()> {
    assert_eq!(
        "[[1,2],[3,4],[5]]",
        eval_contents(call_expr(
            "split_list",
            vec![list(vec![int(1), int(2), int(3), int(4), int(5)]), int(3)]
        ))?
    );
    assert_eq!(
        "[[\"a\"],[]]",
        eval_contents(call_expr("split_list", vec![strings(&["a"]), int(2)]))?
    );
    expect_error(
        eval_contents(call_expr("split_list", vec![strings(&["a"]), int(0)])),
        "Requested number of sublists 0 is out of range.",
    );
    Ok(())
}

#[test]
fn test_wrong_argument_count() {
    expect_error(
        eval_contents(call_expr("string_join", vec![string("-")])),
        "Wrong number of arguments to string_join().\nExpecting 2, got 1.",
    );
    expect_error(
        eval_contents(call_expr("string_replace", vec![string("-")])),
        "Expecting 3 to 4, got 1.",
    );
}

#[test]
fn test_get_label_info() -> anyhow::Result<()> {
    let info = |label: &str, what: &str| {
        eval_contents_in(
            "//foo/BUILD.gn",
            TESTING_DEFAULT_TOOLCHAIN,
            call_expr("get_label_info", vec![string(label), string(what)]),
        )
    };
    assert_eq!("\"bar\"", info(":bar", "name")?);
    assert_eq!("\"//foo\"", info(":bar", "dir")?);
    assert_eq!("\"//out/Debug/obj/baz\"", info("//baz:qux", "target_out_dir")?);
    assert_eq!("\"//out/Debug/gen/baz\"", info("//baz", "target_gen_dir")?);
    assert_eq!("\"//out/Debug\"", info("//baz", "root_out_dir")?);
    assert_eq!("\"//toolchain:default\"", info(":bar", "toolchain")?);
    assert_eq!("\"//foo:bar\"", info(":bar", "label_no_toolchain")?);
    assert_eq!(
        "\"//foo:bar(//toolchain:default)\"",
        info(":bar", "label_with_toolchain")?
    );
    assert_eq!(
        "\"//out/Debug/arm/obj/foo\"",
        info(":bar(//toolchain:arm)", "target_out_dir")?
    );
    expect_error(info(":bar", "flavor"), "Unknown value for \"what\" parameter.");
    Ok(())
}

#[test]
fn test_get_label_info_in_other_toolchain() -> anyhow::Result<()> {
    assert_eq!(
        "\"//out/Debug/arm/gen\"",
        eval_contents_in(
            "//foo/BUILD.gn",
            "//toolchain:arm",
            call_expr("get_label_info", vec![string(":bar"), string("root_gen_dir")]),
        )?
    );
    Ok(())
}

#[test]
fn test_file_builtins() -> anyhow::Result<()> {
    assert_eq!(
        "[\"//out/Debug/gen/foo\",\"//out/Debug/obj/foo\",\"//toolchain:default\"]",
        eval_contents(list(vec![
            ident("target_gen_dir"),
            ident("target_out_dir"),
            ident("current_toolchain"),
        ]))?
    );
    Ok(())
}

#[test]
fn test_pool() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let items = tester.eval(
        "//BUILD.gn",
        vec![
            call_with_block("pool", vec![string("link")], vec![assign("depth", int(4))]),
            call_with_block("pool", vec![string("console")], vec![assign("depth", int(1))]),
        ],
    )?;
    assert_matches!(items.as_slice(), [Item::Pool(link), Item::Pool(console)] => {
        assert_eq!(4, link.depth);
        assert_eq!("//:link", link.label.user_visible_name(false));
        assert_eq!(1, console.depth);
    });
    Ok(())
}

#[test]
fn test_pool_errors() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let pool = |name: &str, body| {
        vec![call_with_block("pool", vec![string(name)], body)]
    };
    expect_error(
        tester.eval("//BUILD.gn", pool("link", vec![])),
        "Missing depth.",
    );
    expect_error(
        tester.eval("//BUILD.gn", pool("link", vec![assign("depth", int(-2))])),
        "The pool depth can't be negative, got -2.",
    );
    expect_error(
        tester.eval("//BUILD.gn", pool("console", vec![assign("depth", int(2))])),
        "The console pool must have a depth of 1, got 2.",
    );
    expect_error(
        tester.eval_in_toolchain(
            "//toolchain:arm",
            "//BUILD.gn",
            pool("console", vec![assign("depth", int(1))]),
        ),
        "Console pool defined in non-default toolchain.",
    );
    // Only //:console is special.
    tester.eval("//foo/BUILD.gn", pool("console", vec![assign("depth", int(3))]))?;
    Ok(())
}

#[test]
fn test_target_pool_label() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let target = tester.eval_target(
        "//foo/BUILD.gn",
        vec![target(
            "action",
            "gen",
            vec![
                assign("script", string("gen.py")),
                assign("outputs", strings(&["//out/Debug/gen/foo/out.h"])),
                assign("pool", string("//:link")),
            ],
        )],
    )?;
    assert_eq!(
        "//:link(//toolchain:default)",
        target.pool.as_ref().unwrap().user_visible_name(true)
    );
    Ok(())
}

#[test]
fn test_unknown_function() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval("//foo/BUILD.gn", vec![call("no_such_thing", vec![])]),
        "The function \"no_such_thing\" is neither a built-in function nor a template.",
    );
    Ok(())
}

#[test]
fn test_cant_nest_targets() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![target("group", "outer", vec![target("group", "inner", vec![])])],
        ),
        "You are trying to nest a target inside a target.",
    );
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![call_with_block(
                "config",
                vec![string("cfg")],
                vec![call_with_block("pool", vec![string("p")], vec![assign("depth", int(1))])],
            )],
        ),
        "You are trying to nest a pool inside a config.",
    );
    Ok(())
}

#[test]
fn test_unused_variable() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let err = tester
        .eval(
            "//foo/BUILD.gn",
            vec![target("group", "g", vec![assign("sourcez", strings(&["a.cc"]))])],
        )
        .unwrap_err();
    let text = format!("{:#}", err);
    assert!(text.contains("Assignment had no effect."), "{}", text);
    assert!(text.contains("\"sourcez\""), "{}", text);
    assert!(text.contains("//BUILD.gn:"), "{}", text);
    Ok(())
}

#[test]
fn test_undefined_identifier() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![target("group", "g", vec![assign("deps", ident("missing"))])],
        ),
        "The name \"missing\" is not defined in this scope.",
    );
    expect_error(
        tester.eval("//foo/BUILD.gn", vec![append("nothing", strings(&["x"]))]),
        "Undefined identifier in +=.",
    );
    Ok(())
}

#[test]
fn test_integer_append_overflow() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//foo/BUILD.gn",
            vec![assign("x", int(i64::MAX)), append("x", int(1))],
        ),
        "Integer overflow in +=.",
    );
    Ok(())
}

#[test]
fn test_failed_file_returns_nothing() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let result = tester.eval(
        "//foo/BUILD.gn",
        vec![
            target("group", "ok", vec![]),
            target("group", "bad", vec![assign("unused", int(1))]),
        ],
    );
    assert!(result.is_err());
    Ok(())
}
