use std::io;

use time::{macros::format_description, Date};

use crate::{
    error::Result,
    fmt::FormatWriter,
    git::{Commit, ReleasePackage},
    link_style::LinkStyle,
    sectionmap::{Section, SectionMap},
};

/// Wraps a `std::io::Write` object to write a changelog entry in Markdown
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use northbrook::{fmt::{FormatWriter, MarkdownWriter}, git::{Package, ReleasePackage}, SectionMap};
/// # let release = ReleasePackage {
/// #     directory: ".".into(),
/// #     pkg: Package { name: "a".into(), version: "1.0.0".into(), url: "https://repo".into() },
/// #     commits: vec![],
/// # };
/// let sm = SectionMap::from_commits(&release.commits);
///
/// // Create a file to hold our results, which the MarkdownWriter will wrap (note, .unwrap() is only
/// // used to keep the example short and concise)
/// let mut file = File::create("my_changelog.md").unwrap();
///
/// let mut writer = MarkdownWriter::new(&mut file);
/// let today = time::OffsetDateTime::now_utc().date();
/// writer.write_changelog(&release, today, &sm).unwrap();
/// ```
pub struct MarkdownWriter<'a> {
    out: &'a mut dyn io::Write,
    link_style: LinkStyle,
}

impl<'a> MarkdownWriter<'a> {
    /// Creates a new instance of the `MarkdownWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write + 'a>(writer: &'a mut T) -> MarkdownWriter<'a> {
        MarkdownWriter {
            out: writer,
            link_style: LinkStyle::default(),
        }
    }

    /// Sets the style of the commit hyper-links
    pub fn link_style(mut self, style: LinkStyle) -> MarkdownWriter<'a> {
        self.link_style = style;
        self
    }

    fn write_header(&mut self, version: &str, date: Date) -> Result<()> {
        let date = date.format(format_description!("[year]-[month]-[day]"))?;
        writeln!(self.out, "# {version} ({date})\n---").map_err(Into::into)
    }

    /// Writes a particular section of a changelog
    fn write_section(&mut self, repo: &str, section: Section, entries: &[&Commit]) -> Result<()> {
        write!(self.out, "\n## {}\n\n", section.title())?;

        for (i, entry) in entries.iter().enumerate() {
            let line = format!("{} {}", subject(entry), self.link(entry, repo));
            match section {
                Section::Breaking => {
                    let note = entry.message.breaking_changes.as_deref().unwrap_or_default();
                    writeln!(self.out, "{}. {note}\n  - {line}", i + 1)?;
                }
                _ => writeln!(self.out, "- {line}")?,
            }
        }

        Ok(())
    }

    fn link(&self, entry: &Commit, repo: &str) -> String {
        let hash = entry.hash.as_str();
        let short = hash.get(..8).unwrap_or(hash);
        format!("[{short}]({})", self.link_style.commit_link(hash, repo))
    }
}

// First line of the raw message
fn subject(entry: &Commit) -> &str {
    entry.message.raw.lines().next().unwrap_or_default().trim()
}

impl<'a> FormatWriter for MarkdownWriter<'a> {
    fn write_changelog(
        &mut self,
        release: &ReleasePackage,
        date: Date,
        sm: &SectionMap,
    ) -> Result<()> {
        self.write_header(&release.pkg.version, date)?;

        for (section, entries) in sm.non_empty() {
            self.write_section(&release.pkg.url, section, entries)?;
        }

        self.out.flush().map_err(Into::into)
    }
}
