//! Containment of client-supplied paths inside the document root.
//!
//! Both the requested path and the root are canonicalized independently, so
//! `..` segments and symlinks are judged by where they actually lead rather
//! than by how the request spells them.

use std::{
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

use tokio::fs;

/// A canonical path known to lie inside the canonical root it was resolved
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Nothing was requested.
    #[error("empty path")]
    Empty,
    /// Root or target could not be canonicalized (missing, dangling symlink,
    /// permission denied).
    #[error("path could not be resolved")]
    Unresolvable,
    /// The target canonicalizes to somewhere outside the root.
    #[error("path escapes the root directory")]
    OutsideRoot,
    /// An upload name that is not a single plain file name.
    #[error("invalid file name")]
    InvalidName,
}

/// Resolves `requested` (as sent by the client, e.g. `/docs/a.txt`) against
/// `root` by plain concatenation followed by canonicalization.
pub async fn resolve(root: &Path, requested: &str) -> Result<ResolvedPath, Rejection> {
    if requested.is_empty() {
        return Err(Rejection::Empty);
    }

    let mut joined = OsString::from(root.as_os_str());
    joined.push(requested);

    let canonical = fs::canonicalize(&joined)
        .await
        .map_err(|_| Rejection::Unresolvable)?;
    let canonical_root = fs::canonicalize(root)
        .await
        .map_err(|_| Rejection::Unresolvable)?;

    contain(canonical, &canonical_root)
}

/// Picks the destination for an uploaded file called `file_name`.
///
/// The name must be a single normal component. If something already exists
/// under that name it must itself resolve inside the root, which rules out
/// writing through a symlink that points elsewhere.
pub async fn upload_target(root: &Path, file_name: &str) -> Result<PathBuf, Rejection> {
    if !is_plain_file_name(file_name) {
        return Err(Rejection::InvalidName);
    }

    let canonical_root = fs::canonicalize(root)
        .await
        .map_err(|_| Rejection::Unresolvable)?;
    let target = canonical_root.join(file_name);

    if fs::symlink_metadata(&target).await.is_ok() {
        let existing = fs::canonicalize(&target)
            .await
            .map_err(|_| Rejection::Unresolvable)?;
        contain(existing, &canonical_root)?;
    }

    Ok(target)
}

fn contain(canonical: PathBuf, canonical_root: &Path) -> Result<ResolvedPath, Rejection> {
    // Component-wise: `/srv/www2` does not start with `/srv/www`.
    if canonical.starts_with(canonical_root) {
        Ok(ResolvedPath(canonical))
    } else {
        Err(Rejection::OutsideRoot)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(&['/', '\\', '\0'][..]) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
