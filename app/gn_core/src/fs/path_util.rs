/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum PathError {
    #[error("Empty path.")]
    Empty,
    #[error("Invalid file path \"{0}\": it ends in a slash and so refers to a directory.")]
    NotAFile(String),
    #[error("Path \"{0}\" goes above the root of the source tree.")]
    EscapesRoot(String),
    #[error("Path \"{0}\" must be source-absolute (start with \"//\").")]
    NotSourceAbsolute(String),
    #[error("Path \"{0}\" contains a NUL character.")]
    Nul(String),
}

/// Collapse `.`, `..` and repeated separators of an absolute (`//` or `/`) path.
///
/// A trailing separator (or a trailing `.`/`..` component) is preserved so callers can tell
/// directories from files.
pub(crate) fn normalize_path(path: &str) -> Result<String, PathError> {
    if path.contains('\0') {
        return Err(PathError::Nul(path.to_owned()));
    }
    let (prefix, rest) = if let Some(rest) = path.strip_prefix("//") {
        ("//", rest)
    } else if let Some(rest) = path.strip_prefix('/') {
        ("/", rest)
    } else {
        return Err(PathError::NotSourceAbsolute(path.to_owned()));
    };

    let mut components: Vec<&str> = Vec::new();
    let mut trailing_slash = rest.is_empty();
    for component in rest.split('/') {
        trailing_slash = false;
        match component {
            "" | "." => trailing_slash = true,
            ".." => {
                trailing_slash = true;
                if components.pop().is_none() && prefix == "//" {
                    return Err(PathError::EscapesRoot(path.to_owned()));
                }
            }
            c => components.push(c),
        }
    }

    let mut result = String::with_capacity(path.len());
    result.push_str(prefix);
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            result.push('/');
        }
        result.push_str(c);
    }
    if trailing_slash && !components.is_empty() {
        result.push('/');
    }
    Ok(result)
}

/// Whether `path` names `dir` itself or something below it. `dir` ends with a slash.
pub(crate) fn is_path_in_dir(dir: &str, path: &str) -> bool {
    match path.strip_prefix(dir) {
        Some(_) => true,
        None => dir.strip_suffix('/') == Some(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(Ok("//a/b".to_owned()), normalize_path("//a/./b"));
        assert_eq!(Ok("//a/c".to_owned()), normalize_path("//a/b/../c"));
        assert_eq!(Ok("//a/".to_owned()), normalize_path("//a//b/.."));
        assert_eq!(Ok("//".to_owned()), normalize_path("//"));
        assert_eq!(Ok("//".to_owned()), normalize_path("//a/.."));
        assert_eq!(Ok("/usr/include/".to_owned()), normalize_path("/usr/include/"));
        assert_eq!(Ok("/".to_owned()), normalize_path("/.."));
    }

    #[test]
    fn test_normalize_escapes_root() {
        assert_eq!(
            Err(PathError::EscapesRoot("//../a".to_owned())),
            normalize_path("//../a")
        );
    }

    #[test]
    fn test_is_path_in_dir() {
        assert!(is_path_in_dir("//out/", "//out/foo"));
        assert!(is_path_in_dir("//out/", "//out"));
        assert!(!is_path_in_dir("//out/", "//outside/foo"));
    }
}
