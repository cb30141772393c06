//! The last stage of a multi-package release: gate each package on its test
//! suite, then prepend a conventional-commit entry to its `CHANGELOG.md` and
//! commit it.
//!
//! ```no_run
//! use northbrook::{Changelog, Stdio, TestRunner};
//! # use northbrook::git::{Package, ReleasePackage};
//! # let release = ReleasePackage {
//! #     directory: "packages/a".into(),
//! #     pkg: Package { name: "a".into(), version: "1.0.0".into(), url: "https://repo".into() },
//! #     commits: vec![],
//! # };
//! let mut io = Stdio::default();
//!
//! let release = TestRunner::new(&release.directory).run(release, &mut io)?;
//! Changelog::new().generate(&release, &mut io)?;
//! # Ok::<(), northbrook::error::Error>(())
//! ```

#[macro_use]
mod macros;
mod changelog;
mod config;
pub mod error;
pub mod fmt;
pub mod git;
mod link_style;
mod process;
mod release;
mod sectionmap;
mod test_runner;

pub use changelog::Changelog;
pub use config::{RawCfg, RawReleaseCfg, ReleaseConfig};
pub use link_style::LinkStyle;
pub use process::{CommandRunner, ExitStatus, Stdio, SystemRunner};
pub use release::Release;
pub use sectionmap::{Section, SectionMap};
pub use test_runner::TestRunner;

// The changelog file written in each package directory
const CHANGELOG_FILE: &str = "CHANGELOG.md";

// The message of the commit recording a changelog update
const COMMIT_MESSAGE: &str = "docs(CHANGELOG): append to changelog";

// The default config file
const DEFAULT_CONFIG_FILE: &str = "northbrook.toml";
