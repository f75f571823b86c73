//! Path safety checks: traversal detection, root containment, `~` expansion.
//!
//! Two complementary defenses guard every write:
//!
//! - [`contains_parent_traversal`] and [`validate_entry_name`] reject a
//!   malicious entry name before any filesystem call is made.
//! - [`resolve_within_root`] resolves symlinks of paths that already exist
//!   and verifies they stay under the destination root.
//!
//! Both are needed: symlink resolution only works on existing paths, and a
//! name check cannot see symlinks planted in the destination.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExpandError;
use crate::Result;

/// Resolves `candidate` and fails unless it is a strict descendant of `root`.
///
/// Both paths are made absolute and symlink-resolved, so both must exist.
/// Returns the resolved candidate.
///
/// # Errors
///
/// - [`ExpandError::PathEscape`] if the resolved path is `root` itself or
///   lies outside of it
/// - [`ExpandError::Io`] if either path cannot be resolved
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use unspool_core::security::resolve_within_root;
///
/// # fn main() -> Result<(), unspool_core::ExpandError> {
/// let inside = resolve_within_root(Path::new("/srv/out/a.txt"), Path::new("/srv/out"))?;
/// assert!(resolve_within_root(Path::new("/etc/passwd"), Path::new("/srv/out")).is_err());
/// # Ok(())
/// # }
/// ```
pub fn resolve_within_root(candidate: &Path, root: &Path) -> Result<PathBuf> {
    let root = std::path::absolute(root)?.canonicalize()?;
    let resolved = std::path::absolute(candidate)?.canonicalize()?;

    if resolved == root || !resolved.starts_with(&root) {
        return Err(ExpandError::PathEscape {
            path: candidate.to_path_buf(),
        });
    }

    Ok(resolved)
}

/// Reports whether any `/`- or `\`-separated component of `path` is `..`.
///
/// Splitting on both separators catches Windows-style names inside tar
/// archives on every platform.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use unspool_core::security::contains_parent_traversal;
///
/// assert!(contains_parent_traversal(Path::new("../../etc/passwd")));
/// assert!(contains_parent_traversal(Path::new("a\\..\\b")));
/// assert!(!contains_parent_traversal(Path::new("a/..b/c")));
/// ```
pub fn contains_parent_traversal(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    if !raw.contains("..") {
        return false;
    }
    raw.split(['/', '\\']).any(|component| component == "..")
}

/// Validates an archive entry name and returns its normalized relative form.
///
/// `.` components are dropped. The result may be empty when the name refers
/// to the archive root (for example `./`).
///
/// # Errors
///
/// Returns [`ExpandError::PathEscape`] if the name contains a `..`
/// component or is absolute.
pub fn validate_entry_name(name: &Path) -> Result<PathBuf> {
    if contains_parent_traversal(name) {
        return Err(ExpandError::PathEscape {
            path: name.to_path_buf(),
        });
    }

    let mut normalized = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ExpandError::PathEscape {
                    path: name.to_path_buf(),
                });
            }
        }
    }

    Ok(normalized)
}

/// Fails if the nearest existing ancestor of `candidate` (or `candidate`
/// itself) resolves outside of `root`.
///
/// Guards against symlinks planted in the destination that would redirect a
/// write or a `mkdir -p`. A symlink that cannot be resolved (dangling, or a
/// loop) counts as an escape. `candidate` must be `root` joined with a
/// relative path; when nothing between them exists yet the check passes.
pub(crate) fn check_existing_within_root(candidate: &Path, root: &Path) -> Result<()> {
    let mut probe = candidate;
    while probe != root {
        if let Ok(meta) = probe.symlink_metadata() {
            return match resolve_within_root(probe, root) {
                Ok(_) => Ok(()),
                Err(ExpandError::Io(_)) if meta.file_type().is_symlink() => {
                    Err(ExpandError::PathEscape {
                        path: candidate.to_path_buf(),
                    })
                }
                Err(e) => Err(e),
            };
        }
        match probe.parent() {
            Some(parent) => probe = parent,
            None => break,
        }
    }
    Ok(())
}

/// Rewrites a leading `~` to the current user's home directory.
///
/// Everything after the `~` is joined onto the home directory, so `~`,
/// `~/a.tar` and `~a.tar` all land under home. Paths that are not valid
/// UTF-8 or do not start with `~` pass through untouched.
///
/// # Errors
///
/// Returns [`ExpandError::HomeDirUnavailable`] if the path starts with `~`
/// and the home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use unspool_core::security::expand_home;
///
/// # fn main() -> Result<(), unspool_core::ExpandError> {
/// assert_eq!(expand_home(Path::new("/tmp/a.tar"))?, Path::new("/tmp/a.tar"));
/// # Ok(())
/// # }
/// ```
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Some(rest) = path.to_str().and_then(|raw| raw.strip_prefix('~')) else {
        return Ok(path.to_path_buf());
    };

    let home = home::home_dir()
        .filter(|home| !home.as_os_str().is_empty())
        .ok_or_else(|| ExpandError::HomeDirUnavailable {
            path: path.to_path_buf(),
        })?;

    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}
