use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Relative path of an encrypted blob below the store root.
///
/// A locator is only ever trusted after [`Locator::resolve`] has checked it
/// lexically. Nothing touches the filesystem before that check passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Join the locator onto `root`, rejecting anything that is empty,
    /// absolute, or contains a parent reference.
    pub(crate) fn resolve(&self, root: &Path) -> Result<PathBuf> {
        let raw = self.0.as_str();
        if raw.is_empty() {
            return Err(StoreError::PathTraversal("empty locator".to_string()));
        }
        if raw.contains('\0') {
            return Err(StoreError::PathTraversal(raw.to_string()));
        }

        let mut relative = PathBuf::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(segment) => relative.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StoreError::PathTraversal(raw.to_string()));
                }
            }
        }

        // "." or "./." would otherwise resolve to the root itself
        if relative.as_os_str().is_empty() {
            return Err(StoreError::PathTraversal(raw.to_string()));
        }

        Ok(root.join(relative))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Locator {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&str> for Locator {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_accepts_nested_relative_path() {
        let root = Path::new("/srv/uploads");
        let resolved = Locator::from("encrypted/2024/01/02/abc.txt.enc")
            .resolve(root)
            .unwrap();
        assert_eq!(
            resolved,
            PathBuf::from("/srv/uploads/encrypted/2024/01/02/abc.txt.enc")
        );
        assert!(resolved.starts_with(root));
    }

    #[test]
    fn test_resolve_strips_current_dir_segments() {
        let root = Path::new("/srv/uploads");
        let resolved = Locator::from("./encrypted/./a.enc").resolve(root).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/uploads/encrypted/a.enc"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/uploads");
        for bad in [
            "",
            ".",
            "..",
            "../etc/passwd",
            "encrypted/../../etc/passwd",
            "encrypted/2024/..",
            "/etc/passwd",
            "enc\0rypted",
        ] {
            let result = Locator::from(bad).resolve(root);
            assert!(
                matches!(result, Err(StoreError::PathTraversal(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}
