use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    link_style::LinkStyle,
    CHANGELOG_FILE, COMMIT_MESSAGE, DEFAULT_CONFIG_FILE,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCfg {
    #[serde(default)]
    pub release: RawReleaseCfg,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawReleaseCfg {
    pub changelog: Option<String>,
    pub commit_message: Option<String>,
    pub test_command: Option<Vec<String>>,
    pub link_style: LinkStyle,
}

/// Resolved release options, every field populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// The changelog file name relative to each package directory
    pub changelog: String,
    /// The message used when committing the changelog
    pub commit_message: String,
    /// The test command, program first
    pub test_command: Vec<String>,
    /// The link style used for commit hyper-links
    pub link_style: LinkStyle,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            changelog: CHANGELOG_FILE.to_owned(),
            commit_message: COMMIT_MESSAGE.to_owned(),
            test_command: vec!["npm".into(), "test".into(), "--silent".into()],
            link_style: LinkStyle::default(),
        }
    }
}

impl From<RawCfg> for ReleaseConfig {
    fn from(raw: RawCfg) -> Self {
        let defaults = ReleaseConfig::default();
        let cfg = raw.release;
        ReleaseConfig {
            changelog: cfg.changelog.unwrap_or(defaults.changelog),
            commit_message: cfg.commit_message.unwrap_or(defaults.commit_message),
            test_command: cfg
                .test_command
                .filter(|cmd| !cmd.is_empty())
                .unwrap_or(defaults.test_command),
            link_style: cfg.link_style,
        }
    }
}

impl ReleaseConfig {
    /// Reads the configuration from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use northbrook::ReleaseConfig;
    /// let cfg = ReleaseConfig::from_file("/myproject/northbrook.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let path = file.as_ref();
        debug!("Reading config file: {:?}", path);
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Looks for `northbrook.toml` in `dir`, falling back to the defaults when
    /// there is none
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config file at {:?}, using defaults", path);
                Ok(ReleaseConfig::default())
            }
            Err(source) => Err(Error::ConfigRead { path, source }),
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let raw: RawCfg = toml::from_str(contents).map_err(|source| Error::ConfigParse {
            path: PathBuf::from(path),
            source,
        })?;
        let cfg = ReleaseConfig::from(raw);
        debug!("Using config:\n{:?}", cfg);
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config() {
        let cfg = r#"
            [release]
            changelog = "HISTORY.md"
            commit-message = "chore(release): update history"
            test-command = ["cargo", "test"]
            link-style = "GitHub"
        "#;
        let res: std::result::Result<RawCfg, _> = toml::from_str(cfg);
        assert!(res.is_ok(), "{res:?}");
        let cfg = ReleaseConfig::from(res.unwrap());

        assert_eq!(cfg.changelog, "HISTORY.md");
        assert_eq!(cfg.commit_message, "chore(release): update history");
        assert_eq!(cfg.test_command, ["cargo", "test"]);
        assert_eq!(cfg.link_style, LinkStyle::Github);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let raw: RawCfg = toml::from_str("[release]\nchangelog = \"CHANGES.md\"\n").unwrap();
        let cfg = ReleaseConfig::from(raw);

        assert_eq!(cfg.changelog, "CHANGES.md");
        assert_eq!(cfg.commit_message, "docs(CHANGELOG): append to changelog");
        assert_eq!(cfg.test_command, ["npm", "test", "--silent"]);
        assert_eq!(cfg.link_style, LinkStyle::Stash);
    }

    #[test]
    fn empty_test_command_is_ignored() {
        let raw: RawCfg = toml::from_str("[release]\ntest-command = []\n").unwrap();
        assert_eq!(ReleaseConfig::from(raw).test_command, ["npm", "test", "--silent"]);
    }

    #[test]
    fn from_dir_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ReleaseConfig::from_dir(dir.path()).unwrap(), ReleaseConfig::default());
    }

    #[test]
    fn from_dir_reports_bad_link_style() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[release]\nlink-style = \"sourcehut\"\n",
        )
        .unwrap();

        let err = ReleaseConfig::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }), "{err:?}");
    }

    #[test]
    fn from_file_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReleaseConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }), "{err:?}");
    }
}
