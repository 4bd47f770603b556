/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use gn_interpreter::ast::Statement;
use gn_interpreter::testing::*;
use gn_node::rust_values::CrateType;
use gn_node::target::Target;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::expect_error;

fn eval_foo(kind: &str, body: Vec<Statement>) -> anyhow::Result<Arc<Target>> {
    Tester::new(vec![])?.eval_target("//foo/BUILD.gn", vec![target(kind, "foo", body)])
}

#[test]
fn test_rust_library_crate_root_from_single_source() -> anyhow::Result<()> {
    let target = eval_foo("rust_library", vec![assign("sources", strings(&["lib.rs"]))])?;
    let rust = target.rust_values.as_ref().unwrap();
    assert_eq!("foo", rust.crate_name);
    assert_eq!("//foo/lib.rs", rust.crate_root.as_ref().unwrap().value());
    assert_eq!(
        Some(CrateType::Rlib),
        rust.inferred_crate_type(target.output_type)
    );
    Ok(())
}

#[test]
fn test_executable_crate_root_defaults_to_main() -> anyhow::Result<()> {
    let target = eval_foo(
        "executable",
        vec![assign("sources", strings(&["util.rs", "main.rs"]))],
    )?;
    let rust = target.rust_values.as_ref().unwrap();
    assert_eq!("//foo/main.rs", rust.crate_root.as_ref().unwrap().value());
    Ok(())
}

#[test]
fn test_explicit_crate_root_and_name() -> anyhow::Result<()> {
    let target = eval_foo(
        "rust_library",
        vec![
            assign("sources", strings(&["src/a.rs", "src/b.rs"])),
            assign("crate_root", string("src/a.rs")),
            assign("crate_name", string("renamed")),
        ],
    )?;
    let rust = target.rust_values.as_ref().unwrap();
    assert_eq!("renamed", rust.crate_name);
    assert_eq!("//foo/src/a.rs", rust.crate_root.as_ref().unwrap().value());
    Ok(())
}

#[test]
fn test_missing_crate_root() {
    expect_error(
        eval_foo(
            "rust_library",
            vec![assign("sources", strings(&["a.rs", "b.rs"]))],
        ),
        "Missing \"crate_root\" and missing \"lib.rs\" in sources.",
    );
}

#[test]
fn test_shared_library_needs_crate_type() -> anyhow::Result<()> {
    expect_error(
        eval_foo("shared_library", vec![assign("sources", strings(&["lib.rs"]))]),
        "Must set \"crate_type\" on a Rust \"shared_library\".",
    );
    let target = eval_foo(
        "shared_library",
        vec![
            assign("sources", strings(&["lib.rs"])),
            assign("crate_type", string("cdylib")),
        ],
    )?;
    assert_eq!(
        Some(CrateType::Cdylib),
        target.rust_values.as_ref().unwrap().crate_type
    );
    Ok(())
}

#[test]
fn test_invalid_crate_type() {
    expect_error(
        eval_foo(
            "rust_library",
            vec![
                assign("sources", strings(&["lib.rs"])),
                assign("crate_type", string("proc_macro")),
            ],
        ),
        "Inadmissible crate type \"proc_macro\".",
    );
}

#[test]
fn test_source_set_has_no_rust_values() -> anyhow::Result<()> {
    let target = eval_foo("source_set", vec![assign("sources", strings(&["a.rs"]))])?;
    assert!(target.rust_values.is_none());
    assert!(target.source_types_used.rust_source_used());
    Ok(())
}

#[test]
fn test_rust_with_cpp_is_mixed() {
    expect_error(
        eval_foo(
            "executable",
            vec![assign("sources", strings(&["main.rs", "helper.cc"]))],
        ),
        "More than one language used in target sources.",
    );
}

#[test]
fn test_objc_and_cpp_are_compatible() -> anyhow::Result<()> {
    let target = eval_foo(
        "static_library",
        vec![assign("sources", strings(&["a.mm", "b.cc", "c.h", "d.m"]))],
    )?;
    assert!(target.rust_values.is_none());
    assert!(target.source_types_used.c_source_used());
    Ok(())
}

#[test]
fn test_invalid_source_type() {
    expect_error(
        eval_foo("source_set", vec![assign("sources", strings(&["notes.txt"]))]),
        "Only source, header, and object files belong in the sources of a source_set.",
    );
}

/// Families of the extensions below; headers belong to none.
const EXTENSIONS: &[(&str, Option<&str>)] = &[
    ("cc", Some("c")),
    ("c", Some("c")),
    ("mm", Some("c")),
    ("m", Some("c")),
    ("S", Some("c")),
    ("o", Some("c")),
    ("def", Some("c")),
    ("h", None),
    ("rs", Some("rust")),
    ("go", Some("go")),
    ("swift", Some("swift")),
];

#[test]
fn test_mixed_sources_random() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let mut rng = SmallRng::seed_from_u64(0x6e67);
    for _ in 0..200 {
        let count = rng.gen_range(1..5);
        let mut files = Vec::new();
        let mut families = Vec::new();
        for i in 0..count {
            let (ext, family) = EXTENSIONS[rng.gen_range(0..EXTENSIONS.len())];
            files.push(format!("f{}.{}", i, ext));
            if let Some(family) = family {
                if !families.contains(&family) {
                    families.push(family);
                }
            }
        }
        let files: Vec<&str> = files.iter().map(|s| s.as_str()).collect();
        let result = tester.eval(
            "//foo/BUILD.gn",
            vec![target(
                "source_set",
                "foo",
                vec![assign("sources", strings(&files))],
            )],
        );
        assert_eq!(
            families.len() > 1,
            result.is_err(),
            "sources {:?}: {:?}",
            files,
            result.err()
        );
    }
    Ok(())
}

#[test]
fn test_frameworks() -> anyhow::Result<()> {
    let target = eval_foo(
        "source_set",
        vec![
            assign("frameworks", strings(&["Foundation.framework"])),
            assign("weak_frameworks", strings(&["UIKit.framework"])),
        ],
    )?;
    assert_eq!(vec!["Foundation.framework"], target.config_values.frameworks);
    assert_eq!(vec!["UIKit.framework"], target.config_values.weak_frameworks);

    for bad in ["Foundation", "Foo/Foo.framework"] {
        expect_error(
            eval_foo("source_set", vec![assign("frameworks", strings(&[bad]))]),
            "Invalid framework name.",
        );
    }
    Ok(())
}

#[test]
fn test_config_values_keep_order() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let items = tester.eval(
        "//foo/BUILD.gn",
        vec![
            call_with_block(
                "config",
                vec![string("cfg")],
                vec![
                    assign("defines", strings(&["C", "A", "B"])),
                    assign("include_dirs", strings(&["include", "//third_party/include"])),
                ],
            ),
            target(
                "source_set",
                "foo",
                vec![
                    assign("configs", strings(&[":cfg"])),
                    assign("defines", strings(&["B", "A", "B"])),
                    assign("libs", strings(&["z", "libs/libfoo.a"])),
                ],
            ),
        ],
    )?;
    let config = items[0].as_config().unwrap();
    assert_eq!(vec!["C", "A", "B"], config.own_values.defines);
    assert_eq!(
        vec!["//foo/include/", "//third_party/include/"],
        config
            .own_values
            .include_dirs
            .iter()
            .map(|d| d.value())
            .collect::<Vec<_>>()
    );

    let target = items[1].as_target().unwrap();
    assert_eq!(vec!["B", "A", "B"], target.config_values.defines);
    assert_eq!(
        vec!["//foo:cfg"],
        target
            .configs
            .iter()
            .map(|l| l.user_visible_name(false))
            .collect::<Vec<_>>()
    );
    assert_eq!(2, target.config_values.libs.len());
    Ok(())
}

#[test]
fn test_circular_includes_must_be_deps() {
    expect_error(
        eval_foo(
            "source_set",
            vec![
                assign("deps", strings(&[":a"])),
                assign("allow_circular_includes_from", strings(&[":b"])),
            ],
        ),
        "//foo:b",
    );
}

#[test]
fn test_public_headers() -> anyhow::Result<()> {
    let target = eval_foo(
        "source_set",
        vec![
            assign("sources", strings(&["a.cc", "a.h"])),
            assign("public", strings(&["a.h"])),
        ],
    )?;
    assert!(!target.all_headers_public);
    assert_eq!("//foo/a.h", target.public_headers[0].value());
    Ok(())
}

#[test]
fn test_complete_static_lib_only_for_static_library() -> anyhow::Result<()> {
    let target = eval_foo(
        "static_library",
        vec![assign("complete_static_lib", boolean(true))],
    )?;
    assert!(target.complete_static_lib);
    expect_error(
        eval_foo("source_set", vec![assign("complete_static_lib", boolean(true))]),
        "Assignment had no effect.",
    );
    Ok(())
}

#[test]
fn test_output_dir_must_be_in_build_dir() -> anyhow::Result<()> {
    let target = eval_foo(
        "executable",
        vec![assign("output_dir", string("//out/Debug/bin"))],
    )?;
    assert_eq!("//out/Debug/bin/", target.output_dir.as_ref().unwrap().value());
    expect_error(
        eval_foo("executable", vec![assign("output_dir", string("//bin"))]),
        "File is not inside output directory.",
    );
    Ok(())
}
