use std::{fmt, path::Path};

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

/// Which section of the rendered changelog to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strip {
    Header,
    Footer,
    All,
}

impl fmt::Display for Strip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strip::Header => write!(f, "header"),
            Strip::Footer => write!(f, "footer"),
            Strip::All => write!(f, "all"),
        }
    }
}

/// Options for rendering a changelog to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Render as if pending commits were released under the next version.
    pub bump: bool,
    /// Only commits since the latest tag.
    pub unreleased: bool,
    pub strip: Option<Strip>,
}

impl DiffOptions {
    /// Bump-mode, unreleased, header stripped: the body used for both RC
    /// pull requests and release notes.
    pub fn release_notes() -> Self {
        Self {
            bump: true,
            unreleased: true,
            strip: Some(Strip::Header),
        }
    }
}

/// Derives versions and changelog text from commit history.
#[cfg_attr(test, automock)]
pub trait Changelog {
    /// Next version implied by unreleased commits.
    fn bumped_version(&self) -> Result<String>;
    /// Render changelog text.
    fn diff(&self, options: DiffOptions) -> Result<String>;
    /// Write the changelog into `path`, prepending unreleased changes when
    /// the file already exists.
    fn write_file(&self, path: &Path) -> Result<()>;
}
