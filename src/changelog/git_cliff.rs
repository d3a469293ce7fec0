//! A git-cliff implementation of [`Changelog`], driven as an external
//! process.
use log::*;
use std::path::{Path, PathBuf};

use crate::{
    changelog::traits::{Changelog, DiffOptions},
    error::Result,
    process::run_tool,
};

/// Default changelog tool binary.
pub const DEFAULT_CHANGELOG_TOOL: &str = "git-cliff";

pub struct GitCliff {
    program: String,
    workdir: PathBuf,
}

impl GitCliff {
    /// Wrapper running `program` inside `workdir`.
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    fn run(&self, args: Vec<String>) -> Result<String> {
        run_tool(&self.program, &args, &self.workdir)
    }

    fn diff_args(options: DiffOptions) -> Vec<String> {
        let mut args = vec![];

        if options.bump {
            args.push("--bump".to_string());
        }

        if options.unreleased {
            args.push("--unreleased".to_string());
        }

        if let Some(strip) = options.strip {
            args.push("--strip".to_string());
            args.push(strip.to_string());
        }

        args
    }

    fn file_args(path: &Path, exists: bool) -> Vec<String> {
        let path = path.display().to_string();

        if exists {
            vec![
                "--bump".into(),
                "--unreleased".into(),
                "--prepend".into(),
                path,
            ]
        } else {
            vec!["--bump".into(), "--output".into(), path]
        }
    }
}

impl Changelog for GitCliff {
    fn bumped_version(&self) -> Result<String> {
        let version = self.run(vec!["--bumped-version".into()])?;
        debug!("{} reported bumped version: {version}", self.program);
        Ok(version)
    }

    fn diff(&self, options: DiffOptions) -> Result<String> {
        self.run(Self::diff_args(options))
    }

    fn write_file(&self, path: &Path) -> Result<()> {
        let exists = self.workdir.join(path).exists();

        if exists {
            info!("prepending unreleased changes to {}", path.display());
        } else {
            info!("creating changelog file {}", path.display());
        }

        self.run(Self::file_args(path, exists))?;

        Ok(())
    }
}
