//! Step outputs appended to the runner's `GITHUB_OUTPUT` file.
use log::*;
use std::{fs::OpenOptions, io::Write, path::Path};

use crate::error::Result;

pub const DIFF_CHANGELOG_OUTPUT: &str = "diff-changelog";
pub const CHANGELOG_OUTPUT: &str = "changelog";

const DELIMITER: &str = "STREAMLINED_RELEASES_EOF";

/// Both outputs are always written, empty when the run produced nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutputs {
    /// Body of the release-candidate pull request.
    pub diff_changelog: String,
    /// Notes of the release.
    pub changelog: String,
}

impl ActionOutputs {
    /// Outputs of a release-candidate sync.
    pub fn for_push(body: &str) -> Self {
        Self {
            diff_changelog: body.to_string(),
            ..Default::default()
        }
    }

    /// Outputs of a published release.
    pub fn for_merge(notes: &str) -> Self {
        Self {
            changelog: notes.to_string(),
            ..Default::default()
        }
    }

    /// Multiline `name<<DELIM` records.
    pub fn render(&self) -> String {
        [
            (DIFF_CHANGELOG_OUTPUT, &self.diff_changelog),
            (CHANGELOG_OUTPUT, &self.changelog),
        ]
        .iter()
        .map(|(name, value)| {
            let delimiter = delimiter_for(value);
            format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
        })
        .collect()
    }

    /// Append the outputs to `path`; without a path they are only logged.
    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        let rendered = self.render();

        let Some(path) = path else {
            debug!("no output file configured, outputs:\n{rendered}");
            return Ok(());
        };

        debug!("writing outputs to {}", path.display());

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(rendered.as_bytes())?;

        Ok(())
    }
}

/// A delimiter line that cannot occur inside `value`.
fn delimiter_for(value: &str) -> String {
    let mut delimiter = DELIMITER.to_string();
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn renders_both_outputs_even_when_empty() {
        let rendered = ActionOutputs::default().render();
        assert_eq!(
            rendered,
            "diff-changelog<<STREAMLINED_RELEASES_EOF\n\nSTREAMLINED_RELEASES_EOF\n\
             changelog<<STREAMLINED_RELEASES_EOF\n\nSTREAMLINED_RELEASES_EOF\n"
        );
    }

    #[test]
    fn push_sets_diff_changelog_only() {
        let outputs = ActionOutputs::for_push("## v1.2.0\n- feat: login");
        assert_eq!(outputs.diff_changelog, "## v1.2.0\n- feat: login");
        assert!(outputs.changelog.is_empty());

        let outputs = ActionOutputs::for_merge("notes");
        assert!(outputs.diff_changelog.is_empty());
        assert_eq!(outputs.changelog, "notes");
    }

    #[test]
    fn delimiter_avoids_value_content() {
        let value = "before\nSTREAMLINED_RELEASES_EOF\nafter";
        let delimiter = delimiter_for(value);
        assert_eq!(delimiter, "STREAMLINED_RELEASES_EOF_");
        assert!(!value.contains(&delimiter));
    }

    #[test]
    fn appends_to_existing_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        fs::write(&path, "previous=1\n").unwrap();

        ActionOutputs::for_merge("notes").write(Some(&path)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous=1\n"));
        assert!(content.contains(
            "changelog<<STREAMLINED_RELEASES_EOF\nnotes\nSTREAMLINED_RELEASES_EOF\n"
        ));
    }

    #[test]
    fn missing_output_path_is_not_an_error() {
        assert!(ActionOutputs::default().write(None).is_ok());
    }
}
