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

/// Location in a build file that produced a value, a binding or an item.
///
/// The parser is not part of this crate, so an origin is whatever the parser handed us:
/// a file name plus a 1-based line and column.
#[derive(Clone, Dupe, Debug, Eq, PartialEq, Hash, Allocative)]
pub struct Origin(Arc<OriginData>);

#[derive(Debug, Eq, PartialEq, Hash, Allocative)]
struct OriginData {
    file: String,
    line: u32,
    column: u32,
}

impl Origin {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Origin {
        Origin(Arc::new(OriginData {
            file: file.into(),
            line,
            column,
        }))
    }

    /// Origin for values synthesized by the evaluator itself (per-file variables, defaults).
    pub fn builtin() -> Origin {
        Origin::new("<builtin>", 0, 0)
    }

    pub fn file(&self) -> &str {
        &self.0.file
    }

    pub fn line(&self) -> u32 {
        self.0.line
    }

    pub fn column(&self) -> u32 {
        self.0.column
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.line == 0 {
            write!(f, "{}", self.0.file)
        } else {
            write!(f, "{}:{}:{}", self.0.file, self.0.line, self.0.column)
        }
    }
}

/// Attribute an error to the build-file location that caused it.
pub trait OriginContext<T> {
    fn at(self, origin: &Origin) -> anyhow::Result<T>;
}

impl<T, E> OriginContext<T> for Result<T, E>
where
    Result<T, E>: anyhow::Context<T, E>,
{
    fn at(self, origin: &Origin) -> anyhow::Result<T> {
        anyhow::Context::with_context(self, || format!("At {}", origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("Bad thing.")]
    struct BadThing;

    #[test]
    fn test_display() {
        assert_eq!("//a/BUILD.gn:3:7", Origin::new("//a/BUILD.gn", 3, 7).to_string());
        assert_eq!("<builtin>", Origin::builtin().to_string());
    }

    #[test]
    fn test_at_wraps_error() {
        let origin = Origin::new("//BUILD.gn", 1, 1);
        let err = Err::<(), _>(BadThing).at(&origin).unwrap_err();
        assert_eq!("At //BUILD.gn:1:1: Bad thing.", format!("{:#}", err));
    }
}
