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
use gn_core::label::Label;
use gn_interpreter::ast::Statement;
use gn_interpreter::testing::*;
use gn_node::item::Item;
use gn_node::target::Target;
use gn_node::toolchain::Toolchain;
use indoc::indoc;

use crate::expect_error;

const RESOURCES_PATTERN: &str = "{{bundle_resources_dir}}/{{source_file_part}}";

fn bundle_data(name: &str, sources: &[&str]) -> Statement {
    target(
        "bundle_data",
        name,
        vec![
            assign("sources", strings(sources)),
            assign("outputs", strings(&[RESOURCES_PATTERN])),
        ],
    )
}

fn app_bundle(extra: Vec<Statement>) -> Statement {
    let mut body = vec![
        assign("bundle_root_dir", string("//out/Debug/Foo.app")),
        assign("bundle_resources_dir", string("//out/Debug/Foo.app/Resources")),
    ];
    body.extend(extra);
    target("create_bundle", "bundle", body)
}

fn targets(items: Vec<Item>) -> Vec<Arc<Target>> {
    items
        .iter()
        .map(|i| i.as_target().unwrap().dupe())
        .collect()
}

#[test]
fn test_bundle_pulls_catalogs_and_files() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let items = tester.eval(
        "//app/BUILD.gn",
        vec![
            bundle_data(
                "assets",
                &[
                    "Foo.xcassets/Contents.json",
                    "Foo.xcassets/AppIcon.appiconset/icon.png",
                ],
            ),
            bundle_data("resources", &["resources/data.bin"]),
            app_bundle(vec![assign("deps", strings(&[":assets", ":resources"]))]),
        ],
    )?;
    let targets = targets(items);
    let (deps, bundle) = targets.split_at(2);

    let mut bundle = (*bundle[0]).clone();
    bundle.pull_bundle_data(deps)?;
    let settings = tester.context().default_settings().dupe();
    bundle.on_resolved(
        &settings,
        &Toolchain::new(Label::testing_parse(TESTING_DEFAULT_TOOLCHAIN)),
    )?;

    assert_eq!(
        vec!["//app:assets"],
        bundle
            .bundle_data
            .assets_catalog_deps()
            .iter()
            .map(|l| l.user_visible_name(false))
            .collect::<Vec<_>>()
    );
    let rules = bundle.bundle_data.file_rules();
    assert_eq!(1, rules.len());
    assert_eq!("//app:resources", rules[0].target().user_visible_name(false));
    assert_eq!(
        vec![
            "//app/resources/data.bin",
            "//app/Foo.xcassets",
            "//out/Debug/Foo.app/Resources/Assets.car",
            "//out/Debug/Foo.app",
        ],
        bundle.sources.iter().map(|s| s.value()).collect::<Vec<_>>()
    );
    assert_eq!(
        vec![
            "//out/Debug/Foo.app/Resources/data.bin",
            "//out/Debug/Foo.app/Resources/Assets.car",
            "//out/Debug/Foo.app",
        ],
        bundle
            .bundle_data
            .get_outputs_as_source_files(&settings, &bundle)?
            .iter()
            .map(|s| s.value())
            .collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn test_bundle_data_needs_bundle_output() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//app/BUILD.gn",
            vec![target(
                "bundle_data",
                "data",
                vec![
                    assign("sources", strings(&["a.txt"])),
                    assign("outputs", strings(&["//out/Debug/{{source_file_part}}"])),
                ],
            )],
        ),
        "Invalid bundle_data output.",
    );
    expect_error(
        tester.eval(
            "//app/BUILD.gn",
            vec![target(
                "bundle_data",
                "data",
                vec![
                    assign("sources", strings(&[])),
                    assign("outputs", strings(&[RESOURCES_PATTERN])),
                ],
            )],
        ),
        "Empty sources for bundle_data target.",
    );
    Ok(())
}

#[test]
fn test_bundle_dirs_must_be_in_root() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//app/BUILD.gn",
            vec![app_bundle(vec![assign(
                "bundle_executable_dir",
                string("//out/Debug/bin"),
            )])],
        ),
        indoc!(
            r#"
            Path is not in bundle root dir.
            "//out/Debug/bin/" should be in the bundle root directory "//out/Debug/Foo.app/" or below."#
        ),
    );
    Ok(())
}

#[test]
fn test_bundle_settings() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    let bundle = tester.eval_target(
        "//app/BUILD.gn",
        vec![app_bundle(vec![
            assign("product_type", string("com.apple.product-type.application")),
            assign("transparent", boolean(true)),
            assign("partial_info_plist", string("//out/Debug/gen/app/Info.plist")),
            assign("post_processing_script", string("//build/sign.py")),
            assign(
                "post_processing_outputs",
                strings(&["//out/Debug/Foo.app/_CodeSignature/CodeResources"]),
            ),
            assign("post_processing_args", strings(&["--sign", "{{bundle_root_dir}}"])),
        ])],
    )?;
    let data = &bundle.bundle_data;
    assert_eq!("com.apple.product-type.application", data.product_type);
    assert!(data.transparent);
    assert_eq!(
        "//out/Debug/gen/app/Info.plist",
        data.partial_info_plist.as_ref().unwrap().value()
    );
    assert_eq!(
        "//build/sign.py",
        data.post_processing_script.as_ref().unwrap().value()
    );
    assert_eq!(1, data.post_processing_outputs.len());
    assert_eq!(2, data.post_processing_args.len());
    Ok(())
}

#[test]
fn test_post_processing_needs_outputs() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//app/BUILD.gn",
            vec![app_bundle(vec![assign(
                "post_processing_script",
                string("//build/sign.py"),
            )])],
        ),
        "post_processing_outputs must be set and non-empty",
    );
    Ok(())
}

#[test]
fn test_test_application_name_needs_ui_testing() -> anyhow::Result<()> {
    let tester = Tester::new(vec![])?;
    expect_error(
        tester.eval(
            "//app/BUILD.gn",
            vec![app_bundle(vec![assign(
                "xcode_test_application_name",
                string("Host"),
            )])],
        ),
        "xcode_test_application_name is only valid for ui-testing bundles.",
    );
    let bundle = tester.eval_target(
        "//app/BUILD.gn",
        vec![app_bundle(vec![
            assign(
                "product_type",
                string("com.apple.product-type.bundle.ui-testing"),
            ),
            assign("xcode_test_application_name", string("Host")),
        ])],
    )?;
    assert_eq!(
        Some("Host"),
        bundle.bundle_data.xcode_test_application_name.as_deref()
    );
    Ok(())
}
