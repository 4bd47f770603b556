/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */


//! Source-tree paths as the build description spells them: `//`-prefixed source-absolute
//! paths, `/`-prefixed system-absolute paths, and paths relative to a current directory.

mod path_util;
pub mod resolver;
pub mod source_dir;
pub mod source_file;
pub mod source_file_type;

pub use path_util::PathError;
