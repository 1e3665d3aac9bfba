use serde::{Deserialize, Serialize};
use std::fmt;

/// Which file system a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOrigin {
    /// A plain file on the workstation.
    Local,
    /// An object projected from a remote system.
    Remote,
}

/// Lightweight identity of a file as the desktop client sees it.
///
/// A handle never carries remote metadata; that lives in `FileAttributes`.
/// For datasets the path is the dataset name, for members `LIB(MEMBER)`,
/// for USS and local files the slash-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub origin: FileOrigin,
}

impl FileHandle {
    pub fn local(path: impl Into<String>, is_directory: bool) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            is_directory,
            origin: FileOrigin::Local,
        }
    }

    pub fn remote(path: impl Into<String>, is_directory: bool) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            is_directory,
            origin: FileOrigin::Remote,
        }
    }

    /// True when `other` is this handle or lives somewhere below it.
    ///
    /// Used as the cycle guard: moving a directory into itself or any of its
    /// descendants must be rejected before a single remote call is made.
    /// Only meaningful for handles of the same origin.
    pub fn is_ancestor_of(&self, other: &FileHandle) -> bool {
        if self.origin != other.origin || !self.is_directory {
            return false;
        }
        let own: Vec<&str> = segments(&self.path).collect();
        let theirs: Vec<&str> = segments(&other.path).collect();
        theirs.len() >= own.len() && own.iter().zip(theirs.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn last_segment(path: &str) -> &str {
    segments(path).last().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestor_detects_self_and_descendants() {
        let dir = FileHandle::remote("/u/alice/proj", true);
        let nested = FileHandle::remote("/u/alice/proj/sub/file.txt", false);
        let sibling = FileHandle::remote("/u/alice/projects", true);

        assert!(dir.is_ancestor_of(&dir));
        assert!(dir.is_ancestor_of(&nested));
        assert!(!dir.is_ancestor_of(&sibling));
        assert!(!nested.is_ancestor_of(&dir));
    }

    #[test]
    fn ancestor_requires_matching_origin() {
        let remote = FileHandle::remote("/u/alice", true);
        let local = FileHandle::local("/u/alice/file.txt", false);
        assert!(!remote.is_ancestor_of(&local));
    }

    #[test]
    fn name_is_last_path_segment() {
        assert_eq!(FileHandle::remote("/u/alice/notes.txt", false).name, "notes.txt");
        assert_eq!(FileHandle::remote("PAYROLL.SRC", true).name, "PAYROLL.SRC");
    }
}
