//! Plain-text listing of the document root.

use std::{io, path::Path};

use itertools::Itertools;

/// Newline-separated entry names with a hard byte capacity.
///
/// Entries are appended whole or not at all; the first entry that does not
/// fit ends the listing and marks it truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    body: String,
    capacity: usize,
    truncated: bool,
}

impl DirectoryListing {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            body: String::new(),
            capacity,
            truncated: false,
        }
    }

    /// Lists the non-dot entries of `dir`, sorted by name.
    pub async fn read(dir: &Path, capacity: usize) -> io::Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }

        let mut listing = Self::with_capacity(capacity);
        for name in names.into_iter().sorted() {
            if !listing.push(&name) {
                tracing::warn!(
                    capacity,
                    dir = %dir.display(),
                    "directory listing truncated"
                );
                break;
            }
        }

        Ok(listing)
    }

    /// Appends `name` and a newline. Returns `false`, leaving the listing
    /// unchanged and truncated, when that would exceed the capacity.
    pub fn push(&mut self, name: &str) -> bool {
        if self.truncated || self.body.len() + name.len() + 1 > self.capacity {
            self.truncated = true;
            return false;
        }

        self.body.push_str(name);
        self.body.push('\n');
        true
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn push_within_capacity() {
        let mut listing = DirectoryListing::with_capacity(16);
        assert!(listing.push("a.txt"));
        assert!(listing.push("b.txt"));

        assert_eq!(listing.as_str(), "a.txt\nb.txt\n");
        assert!(!listing.truncated());
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        let mut listing = DirectoryListing::with_capacity(6);
        assert!(listing.push("a.txt"));
        assert!(!listing.truncated());
    }

    #[test]
    fn overflow_drops_whole_entries() {
        let mut listing = DirectoryListing::with_capacity(10);
        assert!(listing.push("a.txt"));
        assert!(!listing.push("long-name.txt"));
        // Would fit on its own, but the listing already ended.
        assert!(!listing.push("b"));

        assert_eq!(listing.as_str(), "a.txt\n");
        assert!(listing.truncated());
    }

    #[tokio::test]
    async fn read_skips_dot_entries_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta.txt", "index.html", ".hidden", "alpha.css"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("images")).unwrap();

        let listing = DirectoryListing::read(dir.path(), 4096).await.unwrap();

        assert_eq!(listing.as_str(), "alpha.css\nimages\nindex.html\nzeta.txt\n");
        assert!(!listing.truncated());
    }

    #[tokio::test]
    async fn read_truncates_at_capacity() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let listing = DirectoryListing::read(dir.path(), 4).await.unwrap();

        assert_eq!(listing.as_str(), "a\nb\n");
        assert!(listing.truncated());
    }

    #[tokio::test]
    async fn read_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(DirectoryListing::read(&dir.path().join("nope"), 4096)
            .await
            .is_err());
    }
}
