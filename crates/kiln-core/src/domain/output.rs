use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Written once at the top of every generated file.
pub const GENERATED_HEADER: &str = "
// <auto-generated>
// This file has been autogenerated by Kiln.
// </auto-generated>

#pragma warning disable
";

/// Written once at the end of every generated file.
pub const GENERATED_FOOTER: &str = "#pragma warning restore
";

/// Where a project's generated output lives.
///
/// Per-project writers place one file at [`OutputScope::file_path`];
/// separate-file writers place every unit inside [`OutputScope::directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputScope {
    directory: PathBuf,
    file_name: String,
}

impl OutputScope {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// How generated output is laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteStrategy {
    /// Every project funnels into one file.
    Single,
    /// One file per project.
    #[default]
    PerProject,
    /// One file per generated unit.
    Separate,
}

impl WriteStrategy {
    pub const ALL: [WriteStrategy; 3] = [Self::Single, Self::PerProject, Self::Separate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::PerProject => "per-project",
            Self::Separate => "separate",
        }
    }
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidEnvironment(format!("unknown write strategy '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_its_display_form() {
        for strategy in WriteStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<WriteStrategy>().unwrap(), strategy);
        }
        assert!("combined".parse::<WriteStrategy>().is_err());
    }

    #[test]
    fn header_opens_and_footer_restores_suppression() {
        assert!(GENERATED_HEADER.starts_with("\n// <auto-generated>"));
        assert!(GENERATED_HEADER.trim_end().ends_with("#pragma warning disable"));
        assert_eq!(GENERATED_FOOTER.trim_end(), "#pragma warning restore");
    }

    #[test]
    fn file_path_joins_directory_and_name() {
        let scope = OutputScope::new("/p/Generated", "Generated.cs");
        assert_eq!(scope.file_path(), PathBuf::from("/p/Generated/Generated.cs"));
    }
}
