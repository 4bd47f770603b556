/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use dupe::Dupe;
use gn_interpreter::ast::Statement;
use gn_interpreter::testing::*;
use gn_node::target::Target;

use crate::expect_error;

fn patches() -> Vec<Statement> {
    vec![
        call_with_block(
            "update_target",
            vec![string("//bar:bar")],
            vec![append("sources", strings(&["patch1.cc"]))],
        ),
        call_with_block(
            "update_target",
            vec![string(":bar")],
            vec![append("sources", strings(&["patch2.cc"]))],
        ),
    ]
}

fn bar() -> Vec<Statement> {
    vec![target(
        "source_set",
        "bar",
        vec![assign("sources", strings(&["bar.cc"]))],
    )]
}

fn sources(target: &Target) -> Vec<&str> {
    target.sources.iter().map(|s| s.value()).collect()
}

fn eval_bar(tester: &Tester, toolchain: &str) -> anyhow::Result<Arc<Target>> {
    let items = tester.eval_in_toolchain(toolchain, "//bar/BUILD.gn", bar())?;
    Ok(items[0].as_target().unwrap().dupe())
}

#[test]
fn test_updates_apply_in_registration_order() -> anyhow::Result<()> {
    let tester = Tester::new(patches())?;
    let target = tester.eval_target("//bar/BUILD.gn", bar())?;
    assert_eq!(
        vec!["//bar/bar.cc", "//bar/patch1.cc", "//bar/patch2.cc"],
        sources(&target)
    );
    assert_eq!(2, tester.context().deferred_updates().applied_count());
    Ok(())
}

#[test]
fn test_update_applies_once_across_threads() -> anyhow::Result<()> {
    const THREADS: usize = 8;
    let tester = Tester::new(vec![call_with_block(
        "update_target",
        vec![string("//bar:bar")],
        vec![append("sources", strings(&["patch.cc"]))],
    )])?;
    let counts = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| eval_bar(&tester, TESTING_DEFAULT_TOOLCHAIN)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().map(|t| t.sources.len()))
            .collect::<anyhow::Result<Vec<_>>>()
    })?;
    assert_eq!(THREADS, counts.len());
    assert_eq!(1, counts.iter().filter(|c| **c == 2).count(), "{:?}", counts);
    assert_eq!(THREADS - 1, counts.iter().filter(|c| **c == 1).count(), "{:?}", counts);
    assert_eq!(1, tester.context().deferred_updates().applied_count());
    Ok(())
}

#[test]
fn test_updates_apply_once_per_label() -> anyhow::Result<()> {
    let tester = Tester::new(patches())?;
    let first = eval_bar(&tester, TESTING_DEFAULT_TOOLCHAIN)?;
    assert_eq!(3, first.sources.len());

    // Same label again: nothing left to apply.
    let again = eval_bar(&tester, TESTING_DEFAULT_TOOLCHAIN)?;
    assert_eq!(vec!["//bar/bar.cc"], sources(&again));
    assert_eq!(2, tester.context().deferred_updates().applied_count());

    // Another toolchain is another label.
    let arm = eval_bar(&tester, "//toolchain:arm")?;
    assert_eq!(
        vec!["//bar/bar.cc", "//bar/patch1.cc", "//bar/patch2.cc"],
        sources(&arm)
    );
    assert_eq!(4, tester.context().deferred_updates().applied_count());
    Ok(())
}

#[test]
fn test_update_restricted_to_toolchain() -> anyhow::Result<()> {
    let tester = Tester::new(vec![call_with_block(
        "update_target",
        vec![string("//bar:bar(//toolchain:arm)")],
        vec![append("sources", strings(&["arm.cc"]))],
    )])?;
    assert_eq!(
        vec!["//bar/bar.cc"],
        sources(&*eval_bar(&tester, TESTING_DEFAULT_TOOLCHAIN)?)
    );
    assert_eq!(
        vec!["//bar/bar.cc", "//bar/arm.cc"],
        sources(&*eval_bar(&tester, "//toolchain:arm")?)
    );
    Ok(())
}

#[test]
fn test_update_only_matches_its_name() -> anyhow::Result<()> {
    let tester = Tester::new(patches())?;
    let target = tester.eval_target(
        "//baz/BUILD.gn",
        vec![target(
            "source_set",
            "baz",
            vec![assign("sources", strings(&["baz.cc"]))],
        )],
    )?;
    assert_eq!(vec!["//baz/baz.cc"], sources(&target));
    assert_eq!(0, tester.context().deferred_updates().applied_count());
    Ok(())
}

#[test]
fn test_update_can_set_new_values() -> anyhow::Result<()> {
    let tester = Tester::new(vec![call_with_block(
        "update_target",
        vec![string(":bar")],
        vec![assign("defines", strings(&["PATCHED"]))],
    )])?;
    let target = tester.eval_target("//bar/BUILD.gn", bar())?;
    assert_eq!(vec!["PATCHED"], target.config_values.defines);
    Ok(())
}

#[test]
fn test_update_template_instance() -> anyhow::Result<()> {
    let tester = Tester::new(vec![call_with_block(
        "update_template_instance",
        vec![string("//lib:lib")],
        vec![append("sources", strings(&["extra.cc"]))],
    )])?;
    let target = tester.eval_target(
        "//lib/BUILD.gn",
        vec![
            call_with_block(
                "template",
                vec![string("component")],
                vec![call_with_block(
                    "source_set",
                    vec![ident("target_name")],
                    vec![assign("sources", member("invoker", "sources"))],
                )],
            ),
            call_with_block(
                "component",
                vec![string("lib")],
                vec![assign("sources", strings(&["lib.cc"]))],
            ),
        ],
    )?;
    assert_eq!(vec!["//lib/lib.cc", "//lib/extra.cc"], sources(&target));
    Ok(())
}

#[test]
fn test_update_only_in_build_config() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval("//bar/BUILD.gn", patches()),
        "update_target() can only be called from the build config.",
    );
    Ok(())
}

#[test]
fn test_no_targets_in_build_config() {
    expect_error(
        Tester::new(bar()).map(|_| ()),
        "source_set() can't be called from the build config.",
    );
}
