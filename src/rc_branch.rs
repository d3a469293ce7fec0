//! Release-candidate branch naming: `rc/{version}-{base_ref}`.
use regex::Regex;
use std::{fmt, sync::LazyLock};

/// Prefix shared by every release-candidate branch.
pub const RC_PREFIX: &str = "rc/";

static RC_BRANCH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rc/(?<version>.+)-(?<base>.+)$").unwrap()
});

/// A release-candidate branch for `version` targeting `base_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcBranch {
    pub version: String,
    pub base_ref: String,
}

impl RcBranch {
    /// RC branch carrying `version` for `base_ref`.
    pub fn new(version: impl Into<String>, base_ref: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            base_ref: base_ref.into(),
        }
    }

    /// Branch name, `rc/{version}-{base_ref}`.
    pub fn name(&self) -> String {
        format!("{RC_PREFIX}{}-{}", self.version, self.base_ref)
    }

    /// Parse any RC head ref without knowing its base.
    ///
    /// The split happens at the last `-`, so a base ref that itself contains
    /// a `-` is attributed to the version. Use [`RcBranch::parse_for_base`]
    /// when the base is known.
    pub fn parse(head_ref: &str) -> Option<Self> {
        let caps = RC_BRANCH_REGEX.captures(head_ref)?;
        Some(Self::new(&caps["version"], &caps["base"]))
    }

    /// Extract the version from `head_ref` when it is an RC branch for
    /// exactly `base_ref`.
    pub fn parse_for_base(head_ref: &str, base_ref: &str) -> Option<String> {
        let version = head_ref
            .strip_prefix(RC_PREFIX)?
            .strip_suffix(base_ref)?
            .strip_suffix('-')?;

        if version.is_empty() {
            return None;
        }

        Some(version.to_string())
    }
}

impl fmt::Display for RcBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
