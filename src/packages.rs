//! Installed package inventory.
//!
//! # Responsibilities
//! - List the ClickHouse versions whose packages have been uploaded
//! - Feed the `Version` candidates of the cluster schemas
//!
//! # Design Decisions
//! - A version counts as installed when its `clickhouse-common-static`
//!   package is present (rpm, deb or tgz)
//! - Versions are de-duplicated and listed newest first

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

const COMMON_PACKAGE_PREFIX: &str = "clickhouse-common-static";

/// Errors produced while listing packages.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to read package directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of installed software versions.
pub trait PackageInventory: Send + Sync {
    /// Installed version identifiers, newest first.
    fn versions(&self) -> Result<Vec<String>, InventoryError>;
}

/// Inventory backed by a package upload directory.
#[derive(Debug, Clone)]
pub struct PackageDirectory {
    root: PathBuf,
}

impl PackageDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PackageInventory for PackageDirectory {
    fn versions(&self) -> Result<Vec<String>, InventoryError> {
        let io_err = |source| InventoryError::Io {
            path: self.root.clone(),
            source,
        };

        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            if let Some(version) = entry.file_name().to_str().and_then(parse_version) {
                versions.push(version);
            }
        }

        versions.sort_by(|a, b| compare_versions(b, a));
        versions.dedup();
        tracing::debug!(root = %self.root.display(), count = versions.len(), "Listed package versions");
        Ok(versions)
    }
}

/// Extract the version from a `clickhouse-common-static` package file name.
pub fn parse_version(file_name: &str) -> Option<String> {
    let rest = file_name.strip_prefix(COMMON_PACKAGE_PREFIX)?;
    let rest = rest.strip_prefix('-').or_else(|| rest.strip_prefix('_'))?;
    let version: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let version = version.trim_end_matches('.');
    if version.is_empty() || version.starts_with('.') {
        return None;
    }
    Some(version.to_string())
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let key = |v: &str| -> Vec<u64> { v.split('.').map(|s| s.parse().unwrap_or(0)).collect() };
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("clickhouse-common-static-22.3.2.2-2.x86_64.rpm").as_deref(),
            Some("22.3.2.2")
        );
        assert_eq!(
            parse_version("clickhouse-common-static-23.8.1.2992.x86_64.rpm").as_deref(),
            Some("23.8.1.2992")
        );
        assert_eq!(
            parse_version("clickhouse-common-static-21.3.9.83.tgz").as_deref(),
            Some("21.3.9.83")
        );
        assert_eq!(
            parse_version("clickhouse-common-static_22.8.5.29_amd64.deb").as_deref(),
            Some("22.8.5.29")
        );
        assert_eq!(parse_version("clickhouse-server-22.3.2.2-2.noarch.rpm"), None);
        assert_eq!(parse_version("clickhouse-common-static-dbg-22.3.2.2.rpm"), None);
    }

    #[test]
    fn test_directory_listing() {
        let dir = std::env::temp_dir().join(format!("ck-packages-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for name in [
            "clickhouse-common-static-21.9.4.35-2.x86_64.rpm",
            "clickhouse-common-static-22.3.2.2-2.x86_64.rpm",
            "clickhouse-common-static-22.3.2.2.tgz",
            "clickhouse-server-22.3.2.2-2.noarch.rpm",
            "clickhouse-common-static-21.10.1.8013-2.x86_64.rpm",
        ] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let versions = PackageDirectory::new(&dir).versions().unwrap();
        assert_eq!(versions, vec!["22.3.2.2", "21.10.1.8013", "21.9.4.35"]);

        fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[test]
    fn test_missing_directory() {
        let result = PackageDirectory::new("/nonexistent/ck-packages").versions();
        assert!(matches!(result, Err(InventoryError::Io { .. })));
    }
}
