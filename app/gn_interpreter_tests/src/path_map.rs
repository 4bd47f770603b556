/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_core::path_map::PathMap;
use gn_interpreter::testing::*;

fn tester() -> anyhow::Result<Tester> {
    let path_map = PathMap::new([("//alpha", "//"), ("//beta", "//beta"), ("//", "//gamma")])?;
    Tester::with_settings(testing_build_settings(path_map), vec![])
}

#[test]
fn test_dependencies_are_remapped() -> anyhow::Result<()> {
    let target = tester()?.eval_target(
        "//src/BUILD.gn",
        vec![target(
            "group",
            "all",
            vec![assign(
                "deps",
                strings(&["//alpha/a/b/c", "//beta/d/e/f", "//foo/g/h/i", ":local"]),
            )],
        )],
    )?;
    assert_eq!(
        vec![
            "//a/b/c:c",
            "//beta/d/e/f:f",
            "//gamma/foo/g/h/i:i",
            "//src:local",
        ],
        target
            .deps
            .iter()
            .map(|l| l.user_visible_name(false))
            .collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn test_source_absolute_files_are_remapped() -> anyhow::Result<()> {
    let target = tester()?.eval_target(
        "//src/BUILD.gn",
        vec![target(
            "source_set",
            "lib",
            vec![assign(
                "sources",
                strings(&["//alpha/x.cc", "//alphabet/y.cc", "z.cc"]),
            )],
        )],
    )?;
    assert_eq!(
        vec!["//x.cc", "//gamma/alphabet/y.cc", "//src/z.cc"],
        target.sources.iter().map(|s| s.value()).collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn test_get_label_info_sees_mapped_dir() -> anyhow::Result<()> {
    let target = tester()?.eval_target(
        "//src/BUILD.gn",
        vec![target(
            "generated_file",
            "info",
            vec![
                assign("outputs", strings(&["//out/Debug/info.json"])),
                assign(
                    "contents",
                    call_expr("get_label_info", vec![string("//alpha/lib"), string("dir")]),
                ),
            ],
        )],
    )?;
    assert_eq!(
        "\"//lib\"",
        target.generated_file.contents.as_ref().unwrap().to_string()
    );
    Ok(())
}
