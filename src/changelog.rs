use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use time::{Date, OffsetDateTime};

use crate::{
    config::ReleaseConfig,
    error::{Error, Result},
    fmt::{FormatWriter, MarkdownWriter},
    git::ReleasePackage,
    link_style::LinkStyle,
    process::{CommandRunner, Stdio, SystemRunner},
    sectionmap::SectionMap,
    CHANGELOG_FILE, COMMIT_MESSAGE,
};

/// Writes a new entry at the top of a package's changelog and commits the
/// result.
///
/// # Example
///
/// ```no_run
/// # use northbrook::{Changelog, Stdio, git::{Package, ReleasePackage}};
/// # let release = ReleasePackage {
/// #     directory: "packages/a".into(),
/// #     pkg: Package { name: "a".into(), version: "1.0.0".into(), url: "https://repo".into() },
/// #     commits: vec![],
/// # };
/// let changelog = Changelog::new();
/// changelog.generate(&release, &mut Stdio::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Changelog<R = SystemRunner> {
    /// The changelog file name, relative to the package directory (Defaults
    /// to `CHANGELOG.md`)
    pub file_name: String,
    /// The message of the commit that records the changelog
    pub commit_message: String,
    /// The link style to used for commit hyper-links
    pub link_style: LinkStyle,
    /// Pins the date in the entry header instead of using today's local date
    pub release_date: Option<Date>,
    runner: R,
}

impl Default for Changelog {
    fn default() -> Self {
        Changelog {
            file_name: CHANGELOG_FILE.to_owned(),
            commit_message: COMMIT_MESSAGE.to_owned(),
            link_style: LinkStyle::default(),
            release_date: None,
            runner: SystemRunner,
        }
    }
}

impl Changelog {
    pub fn new() -> Self { Changelog::default() }

    /// Creates a `Changelog` from resolved configuration
    pub fn from_config(cfg: &ReleaseConfig) -> Self {
        Changelog::new()
            .changelog_file(cfg.changelog.clone())
            .commit_message(cfg.commit_message.clone())
            .link_style(cfg.link_style)
    }
}

impl<R: CommandRunner> Changelog<R> {
    /// Swaps out how `git` gets invoked
    pub fn with_runner<T: CommandRunner>(self, runner: T) -> Changelog<T> {
        Changelog {
            file_name: self.file_name,
            commit_message: self.commit_message,
            link_style: self.link_style,
            release_date: self.release_date,
            runner,
        }
    }

    pub fn changelog_file<S: Into<String>>(mut self, name: S) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn commit_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.commit_message = msg.into();
        self
    }

    pub fn link_style(mut self, style: LinkStyle) -> Self {
        self.link_style = style;
        self
    }

    pub fn release_date(mut self, date: Date) -> Self {
        self.release_date = Some(date);
        self
    }

    /// The changelog path of a package
    pub fn path_for(&self, release: &ReleasePackage) -> PathBuf {
        release.directory.join(&self.file_name)
    }

    /// Prepends a new entry to the package's changelog file, then stages and
    /// commits the file from inside the package directory.
    ///
    /// The file is only touched once the whole new changelog has been
    /// rendered, so a failure before that point leaves it as it was.
    ///
    /// Returns `release` so calls can be chained.
    pub fn generate<'r>(
        &self,
        release: &'r ReleasePackage,
        io: &mut Stdio,
    ) -> Result<&'r ReleasePackage> {
        writeln!(io.stdout, "{}: Generating changelog...", release.pkg.name)?;

        let path = self.path_for(release);
        let previous = read_previous(&path)?;
        let contents = self.render(release, &previous)?;

        debug!("Writing changelog to file: {:?}", path);
        fs::write(&path, contents)?;

        self.commit(release, io)?;
        Ok(release)
    }

    /// Like `generate()`, but writes the new changelog to `sink` instead of
    /// the package's changelog file. The existing file is still read as the
    /// previous contents, and the commit is still made.
    pub fn generate_with<'r, W: Write>(
        &self,
        release: &'r ReleasePackage,
        io: &mut Stdio,
        sink: &mut W,
    ) -> Result<&'r ReleasePackage> {
        writeln!(io.stdout, "{}: Generating changelog...", release.pkg.name)?;

        let previous = read_previous(&self.path_for(release))?;
        let contents = self.render(release, &previous)?;
        let written = sink.write_all(&contents);
        // Flush even when writing failed; the first error wins
        let flushed = sink.flush();
        written?;
        flushed?;

        self.commit(release, io)?;
        Ok(release)
    }

    // The new entry, a blank line, then the previous contents
    fn render(&self, release: &ReleasePackage, previous: &[u8]) -> Result<Vec<u8>> {
        let sm = SectionMap::from_commits(&release.commits);
        let mut contents = Vec::with_capacity(previous.len() + 512);
        MarkdownWriter::new(&mut contents)
            .link_style(self.link_style)
            .write_changelog(release, self.date(), &sm)?;

        contents.extend_from_slice(b"\n");
        contents.extend_from_slice(previous);
        Ok(contents)
    }

    fn commit(&self, release: &ReleasePackage, io: &mut Stdio) -> Result<()> {
        let dir = release.directory.as_path();
        self.git(&["add", self.file_name.as_str()], dir, io)?;
        self.git(&["commit", "-m", self.commit_message.as_str()], dir, io)?;
        info!("{}: committed {}", release.pkg.name, self.file_name);
        Ok(())
    }

    fn git(&self, args: &[&str], dir: &Path, io: &mut Stdio) -> Result<()> {
        let status = self.runner.run("git", args, dir, io)?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Command {
                command: format!("git {}", args.join(" ")),
                directory: dir.to_path_buf(),
                status,
            })
        }
    }

    fn date(&self) -> Date { self.release_date.unwrap_or_else(today) }
}

fn today() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(e) => {
            warn!("Cannot determine the local UTC offset ({e}), dating the changelog in UTC");
            OffsetDateTime::now_utc().date()
        }
    }
}

// The bytes to keep below the new entry
fn read_previous(path: &Path) -> Result<Vec<u8>> {
    if path.exists() {
        let contents = fs::read(path)?;
        debug!("Preserving {} bytes of {:?}", contents.len(), path);
        Ok(contents)
    } else {
        debug!("No changelog at {:?} yet", path);
        Ok(b"\n".to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use time::macros::date;

    use super::*;
    use crate::{
        git::{Commit, CommitMessage, Package},
        process::mock::{captured_stdio, MockRunner},
    };

    fn release(dir: &Path) -> ReleasePackage {
        ReleasePackage {
            directory: dir.to_path_buf(),
            pkg: Package {
                name: "@scope/a".into(),
                version: "1.2.0".into(),
                url: "https://repo".into(),
            },
            commits: vec![Commit::new(
                "abcdef1234567890",
                CommitMessage::parse("fix: null check"),
            )],
        }
    }

    const ENTRY: &str = "# 1.2.0 (2024-01-09)\n---\n\
                         \n## Bug Fixes\n\n\
                         - fix: null check [abcdef12](https://repo/commits/abcdef1234567890)\n";

    #[test]
    fn prepends_to_existing_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let previous = "# 1.1.0 (2023-12-01)\n---\n\n## Features\n\n- feat: x\n\u{00e9}\r\n";
        fs::write(dir.path().join("CHANGELOG.md"), previous).unwrap();

        let runner = MockRunner::new();
        let (mut io, out, _) = captured_stdio();
        let release = release(dir.path());
        let returned = Changelog::new()
            .with_runner(&runner)
            .release_date(date!(2024 - 01 - 09))
            .generate(&release, &mut io)
            .unwrap();

        assert!(std::ptr::eq(returned, &release));
        let written = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert_eq!(written, format!("{ENTRY}\n{previous}"));
        assert!(written.ends_with(previous));
        assert_eq!(out.contents(), "@scope/a: Generating changelog...\n");
    }

    #[test]
    fn new_changelog_ends_with_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let (mut io, _, _) = captured_stdio();

        Changelog::new()
            .with_runner(&runner)
            .release_date(date!(2024 - 01 - 09))
            .generate(&release(dir.path()), &mut io)
            .unwrap();

        let written = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert_eq!(written, format!("{ENTRY}\n\n"));
    }

    #[test]
    fn stages_then_commits_in_package_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let (mut io, _, _) = captured_stdio();

        Changelog::new()
            .with_runner(&runner)
            .generate(&release(dir.path()), &mut io)
            .unwrap();

        let calls = runner.calls();
        let lines: Vec<_> = calls.iter().map(|c| c.command_line()).collect();
        assert_eq!(
            lines,
            [
                "git add CHANGELOG.md",
                "git commit -m docs(CHANGELOG): append to changelog"
            ]
        );
        assert!(calls.iter().all(|c| c.dir == dir.path()));
    }

    #[test]
    fn failed_add_skips_commit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner::new().exit_codes(&[128]);
        let (mut io, _, _) = captured_stdio();

        let err = Changelog::new()
            .with_runner(&runner)
            .generate(&release(dir.path()), &mut io)
            .unwrap_err();

        assert!(
            matches!(err, Error::Command { ref command, .. } if command == "git add CHANGELOG.md"),
            "{err:?}"
        );
        assert_eq!(runner.calls().len(), 1);
        // Not transactional: the file stays written
        assert!(dir.path().join("CHANGELOG.md").exists());
    }

    #[test]
    fn failed_commit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner::new().exit_codes(&[0, 1]);
        let (mut io, _, _) = captured_stdio();

        let err = Changelog::new()
            .with_runner(&runner)
            .generate(&release(dir.path()), &mut io)
            .unwrap_err();

        assert!(matches!(err, Error::Command { ref command, .. } if command.starts_with("git commit")));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn caller_supplied_sink_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("CHANGELOG.md"), "old\n").unwrap();
        let runner = MockRunner::new();
        let (mut io, _, _) = captured_stdio();
        let mut sink = Vec::new();

        Changelog::new()
            .with_runner(&runner)
            .release_date(date!(2024 - 01 - 09))
            .generate_with(&release(dir.path()), &mut io, &mut sink)
            .unwrap();

        assert_eq!(String::from_utf8(sink).unwrap(), format!("{ENTRY}\nold\n"));
        assert_eq!(fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap(), "old\n");
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn configured_file_name_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let (mut io, _, _) = captured_stdio();
        let cfg = ReleaseConfig {
            changelog: "HISTORY.md".into(),
            commit_message: "chore: history".into(),
            ..ReleaseConfig::default()
        };

        Changelog::from_config(&cfg)
            .with_runner(&runner)
            .generate(&release(dir.path()), &mut io)
            .unwrap();

        assert!(dir.path().join("HISTORY.md").exists());
        let lines: Vec<_> = runner.calls().iter().map(|c| c.command_line()).collect();
        assert_eq!(lines, ["git add HISTORY.md", "git commit -m chore: history"]);
    }

    #[test]
    fn header_uses_zero_padded_date() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        let (mut io, _, _) = captured_stdio();

        Changelog::new()
            .with_runner(&runner)
            .generate(&release(dir.path()), &mut io)
            .unwrap();

        let written = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        let header = regex!(r"^# 1\.2\.0 \(\d{4}-\d{2}-\d{2}\)\n---\n");
        assert!(header.is_match(&written), "{written}");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> { Err(io::ErrorKind::BrokenPipe.into()) }

        fn flush(&mut self) -> io::Result<()> { Err(io::ErrorKind::BrokenPipe.into()) }
    }

    #[test]
    fn failed_progress_output_keeps_old_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        fs::write(&path, "# 1.0.0 (2023-01-01)\n---\n").unwrap();
        let runner = MockRunner::new();
        let mut io = Stdio::new(Broken, Broken);

        let err = Changelog::new()
            .with_runner(&runner)
            .generate(&release(dir.path()), &mut io)
            .unwrap_err();

        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe), "{err:?}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "# 1.0.0 (2023-01-01)\n---\n");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn non_utf8_history_is_kept_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let previous: &[u8] = b"# 0.9.0\nold \xff\xfe bytes\r\n\x00end";
        fs::write(&path, previous).unwrap();
        let runner = MockRunner::new();
        let (mut io, _, _) = captured_stdio();

        Changelog::new()
            .with_runner(&runner)
            .release_date(date!(2024 - 01 - 09))
            .generate(&release(dir.path()), &mut io)
            .unwrap();

        let written = fs::read(&path).unwrap();
        let mut expected = format!("{ENTRY}\n").into_bytes();
        expected.extend_from_slice(previous);
        assert_eq!(written, expected);
    }
}
