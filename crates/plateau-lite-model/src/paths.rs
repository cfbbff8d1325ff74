// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lexical path helpers
//!
//! Texture and asset references in CityGML documents are relative paths such as
//! `../appearance/tex.jpg`. These helpers resolve them without touching the
//! filesystem, so they work for paths that do not exist yet.

use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically, collapsing `.` and `..` components
///
/// `..` directly under the root is dropped; leading `..` on a relative path
/// is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Join a relative reference onto a base directory and normalize the result
pub fn resolve_relative(base_dir: &Path, reference: &str) -> PathBuf {
    normalize_lexically(&base_dir.join(reference))
}

/// Render a path with forward slashes regardless of platform
pub fn to_slash_string(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::RootDir => Some(String::new()),
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_parent() {
        assert_eq!(
            normalize_lexically(Path::new("/data/udx/bldg/../appearance/./a.jpg")),
            PathBuf::from("/data/udx/appearance/a.jpg")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent_on_relative() {
        assert_eq!(
            normalize_lexically(Path::new("../../a/b/../c")),
            PathBuf::from("../../a/c")
        );
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_resolve_relative() {
        let resolved = resolve_relative(Path::new("/root/udx/bldg"), "../codelists/Common.xml");
        assert_eq!(resolved, PathBuf::from("/root/udx/codelists/Common.xml"));
    }

    #[test]
    fn test_to_slash_string() {
        assert_eq!(to_slash_string(Path::new("/a/b/c.gml")), "/a/b/c.gml");
        assert_eq!(to_slash_string(Path::new("a/./b")), "a/b");
    }
}
