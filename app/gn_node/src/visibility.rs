/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::fmt;
use std::fmt::Display;
use std::sync::Arc;

use allocative::Allocative;
use dupe::Dupe;
use gazebo::prelude::SliceExt;
use gn_core::label::pattern::LabelPattern;
use gn_core::label::pattern::LabelPatternKind;
use gn_core::label::Label;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisibilityError {
    #[error(
        "Dependency not allowed.\nThe item {1}\ncan not depend on {0}\n\
        because it is not in {0}'s visibility list: {2}"
    )]
    NotVisibleTo(Label, Label, Visibility),
}

/// Who may depend on an item. Items in the same directory are always visible to each other.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Dupe, Allocative)]
pub enum Visibility {
    Public,
    VisibleTo(Arc<[LabelPattern]>),
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

impl Visibility {
    /// A single `*` pattern is the same as public.
    pub fn from_patterns(patterns: Vec<LabelPattern>) -> Visibility {
        if patterns
            .iter()
            .any(|p| *p.kind() == LabelPatternKind::Everything && p.toolchain().is_none())
        {
            Visibility::Public
        } else {
            Visibility::VisibleTo(patterns.into())
        }
    }

    pub fn is_visible_to(&self, owner: &Label, from: &Label) -> bool {
        if owner.dir() == from.dir() {
            return true;
        }
        match self {
            Visibility::Public => true,
            Visibility::VisibleTo(patterns) => LabelPattern::matches_any(patterns, from),
        }
    }

    /// Fails if `from` may not depend on `owner`.
    pub fn check_visible(&self, owner: &Label, from: &Label) -> anyhow::Result<()> {
        if self.is_visible_to(owner, from) {
            Ok(())
        } else {
            Err(VisibilityError::NotVisibleTo(owner.dupe(), from.dupe(), self.dupe()).into())
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let list = match self {
            Visibility::Public => vec![serde_json::Value::String("*".to_owned())],
            Visibility::VisibleTo(patterns) => {
                patterns.map(|p| serde_json::Value::String(p.to_string()))
            }
        };
        serde_json::Value::Array(list)
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "[\"*\"]"),
            Visibility::VisibleTo(patterns) => {
                write!(f, "[")?;
                for (i, pattern) in patterns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\"", pattern)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gn_core::fs::source_dir::SourceDir;

    use super::*;

    fn dir_pattern(dir: &str) -> LabelPattern {
        LabelPattern::new(
            LabelPatternKind::Directory(SourceDir::unchecked_new(dir)),
            None,
        )
    }

    #[test]
    fn test_same_directory_is_always_visible() {
        let owner = Label::testing_parse("//a:x");
        let visibility = Visibility::from_patterns(vec![dir_pattern("//b/")]);
        assert_matches!(&visibility, Visibility::VisibleTo(patterns) if patterns.len() == 1);
        assert!(visibility.is_visible_to(&owner, &Label::testing_parse("//a:y")));
        assert!(visibility.is_visible_to(&owner, &Label::testing_parse("//b:y")));
        assert!(!visibility.is_visible_to(&owner, &Label::testing_parse("//c:y")));
    }

    #[test]
    fn test_check_visible_message() {
        let owner = Label::testing_parse("//a:x");
        let visibility = Visibility::from_patterns(vec![dir_pattern("//b/")]);
        let err = visibility
            .check_visible(&owner, &Label::testing_parse("//c:y"))
            .unwrap_err();
        assert_eq!(
            "Dependency not allowed.\nThe item //c:y\ncan not depend on //a:x\n\
            because it is not in //a:x's visibility list: [\"//b:*\"]",
            err.to_string()
        );
    }

    #[test]
    fn test_everything_is_public() {
        let visibility = Visibility::from_patterns(vec![LabelPattern::everything()]);
        assert_eq!(Visibility::Public, visibility);
        assert_eq!(serde_json::json!(["*"]), visibility.to_json());
    }
}
