/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use dupe::Dupe;

use crate::fs::source_dir::SourceDir;
use crate::fs::source_file::SourceFile;
use crate::fs::PathError;
use crate::path_map::PathMap;

/// Resolves file and directory references written in a build file.
///
/// Inputs spelled source-absolute (`//...`) go through the [`PathMap`]. Relative inputs are
/// resolved against the current directory and are not remapped.
#[derive(Clone, Copy, Dupe)]
pub struct PathResolver<'a> {
    path_map: &'a PathMap,
}

impl<'a> PathResolver<'a> {
    pub fn new(path_map: &'a PathMap) -> PathResolver<'a> {
        PathResolver { path_map }
    }

    pub fn path_map(&self) -> &'a PathMap {
        self.path_map
    }

    pub fn resolve_file(&self, current_dir: &SourceDir, input: &str) -> Result<SourceFile, PathError> {
        let file = current_dir.resolve_relative_file(input)?;
        if input.starts_with("//") {
            Ok(self.path_map.map_file(&file))
        } else {
            Ok(file)
        }
    }

    pub fn resolve_dir(&self, current_dir: &SourceDir, input: &str) -> Result<SourceDir, PathError> {
        let dir = current_dir.resolve_relative_dir(input)?;
        if input.starts_with("//") {
            Ok(self.path_map.map_dir(&dir))
        } else {
            Ok(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_source_absolute_inputs_are_mapped() {
        let map = PathMap::new([("//third_party", "//vendor")]).unwrap();
        let resolver = PathResolver::new(&map);
        let dir = SourceDir::unchecked_new("//third_party/zlib/");
        assert_eq!(
            "//vendor/zlib/zlib.h",
            resolver.resolve_file(&dir, "//third_party/zlib/zlib.h").unwrap().value()
        );
        assert_eq!(
            "//third_party/zlib/zlib.h",
            resolver.resolve_file(&dir, "zlib.h").unwrap().value()
        );
        assert_eq!(
            "//vendor/",
            resolver.resolve_dir(&dir, "//third_party").unwrap().value()
        );
    }
}
