//! Configuration for tardataset
//!
//! Decides which archive members become samples. With nothing set, every
//! member is included.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TarError};
use crate::index::{normalize_name, MemberRecord};

/// Extensions used by image datasets
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Membership predicate evaluated on header-derived metadata only
pub type MemberPredicate = Arc<dyn Fn(&MemberRecord) -> bool + Send + Sync>;

/// Member selection and ordering options
#[derive(Clone, Default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------
    /// Include regular files whose name ends with one of these suffixes,
    /// compared case-insensitively. Ignored when `is_valid_member` is set.
    pub extensions: Option<BTreeSet<String>>,

    /// Custom predicate; overrides `extensions`
    pub is_valid_member: Option<MemberPredicate>,

    /// Only include members below this folder inside the archive. Leading
    /// `./` and trailing `/` are ignored.
    pub root_in_archive: Option<String>,

    // -------------------------------------------------------------------------
    // Ordering
    // -------------------------------------------------------------------------
    /// Order members by name instead of archive header order
    pub sort_by_name: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("extensions", &self.extensions)
            .field("is_valid_member", &self.is_valid_member.as_ref().map(|_| "<predicate>"))
            .field("root_in_archive", &self.root_in_archive)
            .field("sort_by_name", &self.sort_by_name)
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Config that includes regular files with the default image extensions
    pub fn images() -> Self {
        Self::builder().extensions(DEFAULT_IMAGE_EXTENSIONS).build()
    }

    /// Check the options for values that can never match
    pub fn validate(&self) -> Result<()> {
        if let Some(extensions) = &self.extensions {
            if extensions.iter().any(|ext| ext.is_empty()) {
                return Err(TarError::Config(
                    "extension filter contains an empty suffix".to_string(),
                ));
            }
        }
        if let Some(root) = &self.root_in_archive {
            if normalize_name(root.as_bytes()) == "." {
                return Err(TarError::Config(format!(
                    "root_in_archive {:?} does not name a folder",
                    root
                )));
            }
        }
        Ok(())
    }

    /// Decide whether a record is part of the sample list
    pub fn matches(&self, record: &MemberRecord) -> bool {
        if let Some(root) = &self.root_in_archive {
            // member names are normalized, so the root must be too
            let prefix = format!("{}/", normalize_name(root.as_bytes()));
            if !record.name.starts_with(&prefix) {
                return false;
            }
        }

        match (&self.is_valid_member, &self.extensions) {
            (Some(predicate), _) => predicate(record),
            (None, Some(extensions)) => {
                let name = record.name.to_lowercase();
                record.is_file()
                    && extensions
                        .iter()
                        .any(|ext| name.ends_with(ext.to_lowercase().as_str()))
            }
            (None, None) => true,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Include regular files with these suffixes (case-insensitive)
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = extensions
            .into_iter()
            .map(|ext| ext.as_ref().to_lowercase())
            .collect();
        self.config.extensions = Some(set);
        self
    }

    /// Set a custom membership predicate (overrides extensions)
    pub fn is_valid_member<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MemberRecord) -> bool + Send + Sync + 'static,
    {
        self.config.is_valid_member = Some(Arc::new(predicate));
        self
    }

    /// Restrict samples to members below a folder in the archive
    pub fn root_in_archive(mut self, root: impl Into<String>) -> Self {
        self.config.root_in_archive = Some(root.into());
        self
    }

    /// Order members by name rather than header order
    pub fn sort_by_name(mut self, sort: bool) -> Self {
        self.config.sort_by_name = sort;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
