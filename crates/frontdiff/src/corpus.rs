//! Corpus discovery.
//!
//! Three ways to pick source files: every `.cl` file directly inside a
//! directory, an explicit list, or every `.cl` file anywhere under a tree.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Suffix of eligible source files.
pub const SOURCE_SUFFIX: &str = ".cl";

/// Corpus-level errors. These abort the whole run.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("could not find examples directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no .cl files found in {}", .0.display())]
    NoSourceFiles(PathBuf),

    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How the corpus is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusPolicy {
    /// Eligible files directly inside a directory (non-recursive).
    Directory(PathBuf),
    /// Explicit files; relative names missing from the working directory are
    /// looked up in `base`.
    Files { base: PathBuf, files: Vec<PathBuf> },
    /// Eligible files anywhere under a directory.
    Tree(PathBuf),
}

impl CorpusPolicy {
    /// Resolve the policy to a list of source paths.
    ///
    /// # Errors
    ///
    /// Fails if the corpus location does not exist, cannot be read, or yields
    /// no eligible files.
    pub fn discover(&self, filter: Option<&str>) -> Result<Vec<PathBuf>, CorpusError> {
        let files = match self {
            Self::Directory(dir) => discover_dir(dir, filter)?,
            Self::Files { base, files } => resolve_files(base, files)?,
            Self::Tree(dir) => discover_tree(dir, filter)?,
        };
        debug!(count = files.len(), "discovered corpus");
        Ok(files)
    }
}

/// Whether `path`'s file name is an eligible source file matching `filter`.
fn is_eligible(path: &Path, filter: Option<&str>) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !name.ends_with(SOURCE_SUFFIX) {
        return false;
    }
    filter.is_none_or(|f| name.contains(f))
}

/// Eligible regular files directly inside `dir`, sorted.
///
/// # Errors
///
/// [`CorpusError::NotFound`] if `dir` does not exist, [`CorpusError::NoSourceFiles`]
/// if it holds no eligible files.
pub fn discover_dir(dir: &Path, filter: Option<&str>) -> Result<Vec<PathBuf>, CorpusError> {
    if !dir.is_dir() {
        return Err(CorpusError::NotFound(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| CorpusError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_eligible(path, filter))
        .collect();

    if files.is_empty() {
        return Err(CorpusError::NoSourceFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Eligible files anywhere under `dir`, sorted.
///
/// # Errors
///
/// Same as [`discover_dir`]. Unreadable subdirectories are skipped.
pub fn discover_tree(dir: &Path, filter: Option<&str>) -> Result<Vec<PathBuf>, CorpusError> {
    if !dir.is_dir() {
        return Err(CorpusError::NotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_eligible(entry.path(), filter))
        .map(walkdir::DirEntry::into_path)
        .collect();

    if files.is_empty() {
        return Err(CorpusError::NoSourceFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Resolve explicit file arguments, preserving their order.
///
/// A path that exists as given is used directly; otherwise it is looked up
/// relative to `base`.
///
/// # Errors
///
/// [`CorpusError::SourceNotFound`] if a file exists in neither place.
pub fn resolve_files(base: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>, CorpusError> {
    files
        .iter()
        .map(|file| {
            if file.is_file() {
                return Ok(file.clone());
            }
            let joined = base.join(file);
            if joined.is_file() {
                Ok(joined)
            } else {
                Err(CorpusError::SourceNotFound(file.clone()))
            }
        })
        .collect()
}

/// Display name for a source file: its path relative to `root`, or the file name.
#[must_use]
pub fn display_name(path: &Path, root: Option<&Path>) -> String {
    if let Some(rel) = root.and_then(|r| path.strip_prefix(r).ok())
        && !rel.as_os_str().is_empty()
    {
        return rel.display().to_string();
    }
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "class Main {};\n").unwrap();
    }

    #[test]
    fn test_discover_dir_filters_and_sorts() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("b.cl"));
        touch(&temp.path().join("a.cl"));
        touch(&temp.path().join("notes.txt"));
        touch(&temp.path().join("a.cl.bak"));
        touch(&temp.path().join("nested/c.cl"));

        let files = discover_dir(temp.path(), None).unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p, None)).collect();
        assert_eq!(names, ["a.cl", "b.cl"]);
    }

    #[test]
    fn test_discover_dir_ignores_directories_with_suffix() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("dir.cl")).unwrap();
        touch(&temp.path().join("x.cl"));
        let files = discover_dir(temp.path(), None).unwrap();
        assert_eq!(files, [temp.path().join("x.cl")]);
    }

    #[test]
    fn test_discover_dir_with_filter() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("arith.cl"));
        touch(&temp.path().join("list.cl"));
        let files = discover_dir(temp.path(), Some("ari")).unwrap();
        assert_eq!(files, [temp.path().join("arith.cl")]);
    }

    #[test]
    fn test_discover_dir_missing() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            discover_dir(&missing, None),
            Err(CorpusError::NotFound(p)) if p == missing
        ));
    }

    #[test]
    fn test_discover_dir_empty() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("readme.md"));
        assert!(matches!(
            discover_dir(temp.path(), None),
            Err(CorpusError::NoSourceFiles(_))
        ));
    }

    #[test]
    fn test_discover_tree_recurses() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("top.cl"));
        touch(&temp.path().join("a/inner.cl"));
        touch(&temp.path().join("a/b/deep.cl"));
        touch(&temp.path().join("a/b/skip.txt"));

        let files = discover_tree(temp.path(), None).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| display_name(p, Some(temp.path())))
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"top.cl".to_string()));
        assert!(names.contains(&Path::new("a").join("inner.cl").display().to_string()));
        assert!(names.contains(&Path::new("a/b").join("deep.cl").display().to_string()));
    }

    #[test]
    fn test_resolve_files_against_base() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("hello.cl"));
        let direct = temp.path().join("hello.cl");

        let resolved = resolve_files(
            temp.path(),
            &[PathBuf::from("hello.cl"), direct.clone()],
        )
        .unwrap();
        assert_eq!(resolved, [direct.clone(), direct]);
    }

    #[test]
    fn test_resolve_files_missing() {
        let temp = tempfile::tempdir().unwrap();
        let err = resolve_files(temp.path(), &[PathBuf::from("ghost.cl")]).unwrap_err();
        assert!(matches!(err, CorpusError::SourceNotFound(p) if p == Path::new("ghost.cl")));
    }

    #[test]
    fn test_policy_discover() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("one.cl"));
        touch(&temp.path().join("sub/two.cl"));

        let dir = CorpusPolicy::Directory(temp.path().to_path_buf());
        assert_eq!(dir.discover(None).unwrap().len(), 1);

        let tree = CorpusPolicy::Tree(temp.path().to_path_buf());
        assert_eq!(tree.discover(None).unwrap().len(), 2);

        let files = CorpusPolicy::Files {
            base: temp.path().join("sub"),
            files: vec![PathBuf::from("two.cl")],
        };
        assert_eq!(files.discover(None).unwrap(), [temp.path().join("sub/two.cl")]);
    }
}
