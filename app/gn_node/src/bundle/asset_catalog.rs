/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_core::fs::source_file::SourceFile;

const ASSET_SET_EXTENSIONS: &[&str] = &[
    ".appiconset",
    ".colorset",
    ".dataset",
    ".imageset",
    ".launchimage",
    ".symbolset",
];

/// If `source` belongs to an asset catalog, the `.xcassets` directory it belongs to.
///
/// Matches `*.xcassets/Contents.json` and `*.xcassets/*.<set>/*` where `<set>` is one of the
/// asset set extensions.
pub fn asset_catalog_of(source: &SourceFile) -> Option<SourceFile> {
    let (dir, name) = source.value().rsplit_once('/')?;
    if name == "Contents.json" && dir.ends_with(".xcassets") {
        return Some(SourceFile::unchecked_new(dir));
    }
    if ASSET_SET_EXTENSIONS.iter().any(|ext| dir.ends_with(ext)) {
        let (catalog, _) = dir.rsplit_once('/')?;
        if catalog.ends_with(".xcassets") {
            return Some(SourceFile::unchecked_new(catalog));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(s: &str) -> Option<String> {
        asset_catalog_of(&SourceFile::unchecked_new(s)).map(|f| f.value().to_owned())
    }

    #[test]
    fn test_catalog_members() {
        assert_eq!(
            Some("//app/Foo.xcassets"),
            catalog("//app/Foo.xcassets/AppIcon.appiconset/icon.png").as_deref()
        );
        assert_eq!(
            Some("//app/Foo.xcassets"),
            catalog("//app/Foo.xcassets/Contents.json").as_deref()
        );
        assert_eq!(
            Some("//app/Foo.xcassets"),
            catalog("//app/Foo.xcassets/Logo.imageset/Contents.json").as_deref()
        );
    }

    #[test]
    fn test_not_catalog_members() {
        assert_eq!(None, catalog("//app/resources/data.bin"));
        assert_eq!(None, catalog("//app/Foo.xcassets/Other/icon.png"));
        assert_eq!(None, catalog("//app/Foo.xcassets/a/Logo.imageset/x.png"));
        assert_eq!(None, catalog("//app/Logo.imageset/x.png"));
    }
}
