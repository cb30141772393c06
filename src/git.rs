use std::path::PathBuf;

use regex::Regex;

/// The struct representation of a `Commit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The 40 char hash
    pub hash: String,
    /// The parsed conventional-commit message
    pub message: CommitMessage,
}

/// The parts of a conventional-commit message the changelog cares about
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitMessage {
    /// The commit type, i.e. `feat`, `fix`, `perf`. Empty when the header is
    /// not a conventional one.
    pub commit_type: String,
    /// The full, unmodified message
    pub raw: String,
    /// The breaking change note, if the commit carries one
    pub breaking_changes: Option<String>,
}

/// A convienience type for multiple commits
pub type Commits = Vec<Commit>;

/// Publishable package metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// The repository used for the base of commit hyper-links
    pub url: String,
}

/// One package ready to be released along with the commits made to it since
/// its last release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePackage {
    /// The package root, where `CHANGELOG.md` lives
    pub directory: PathBuf,
    pub pkg: Package,
    /// Commits in the order they should appear in the changelog
    pub commits: Commits,
}

impl Commit {
    pub fn new<S: Into<String>>(hash: S, message: CommitMessage) -> Commit {
        Commit {
            hash: hash.into(),
            message,
        }
    }
}

/// Splits raw commit messages into the parts the changelog needs.
///
/// Holds its compiled patterns, so one parser can be reused for every commit
/// of a release.
///
/// # Example
///
/// ```
/// # use northbrook::git::CommitParser;
/// let parser = CommitParser::new();
/// let msgs: Vec<_> = ["feat: a", "fix!: b"].iter().map(|raw| parser.parse(*raw)).collect();
/// assert_eq!(msgs[1].breaking_changes.as_deref(), Some("b"));
/// ```
#[derive(Debug, Clone)]
pub struct CommitParser {
    header_regex: Regex,
    footer_regex: Regex,
}

impl Default for CommitParser {
    fn default() -> Self {
        CommitParser {
            header_regex: regex!(r"^([^:\(!\s]+)(?:\(([^\)]*)\))?(!)?:\s*(.*)$"),
            footer_regex: regex!(r"^BREAKING[ -]CHANGES?:\s*"),
        }
    }
}

impl CommitParser {
    pub fn new() -> Self { CommitParser::default() }

    /// Parses a raw commit message in the `type(scope)!: subject` format.
    ///
    /// The breaking change note is taken from a `BREAKING CHANGE:` footer, or,
    /// when only the `!` marker is present, from the subject. A footer with no
    /// text carries no note.
    pub fn parse<S: Into<String>>(&self, raw: S) -> CommitMessage {
        let raw = raw.into();

        let mut lines = raw.lines();
        let (commit_type, bang_note) = match lines.next().and_then(|l| self.header_regex.captures(l.trim())) {
            Some(caps) => {
                let commit_type = caps.get(1).map_or("", |m| m.as_str()).to_owned();
                let subject = caps.get(4).map_or("", |m| m.as_str()).trim();
                let bang_note = caps.get(3).map(|_| subject.to_owned());
                (commit_type, bang_note)
            }
            None => (String::new(), None),
        };

        let footer_note = self.breaking_footer(lines);

        CommitMessage {
            commit_type,
            breaking_changes: footer_note.or(bang_note).filter(|n| !n.trim().is_empty()),
            raw,
        }
    }

    // Everything after the footer keyword, up to the end of its paragraph
    fn breaking_footer<'a>(&self, lines: impl Iterator<Item = &'a str>) -> Option<String> {
        let mut lines = lines.skip_while(|l| !self.footer_regex.is_match(l));
        let first = lines.next()?;
        let mut note = self.footer_regex.replace(first, "").trim().to_owned();
        for line in lines.take_while(|l| !l.trim().is_empty()) {
            if !note.is_empty() {
                note.push('\n');
            }
            note.push_str(line.trim());
        }
        Some(note).filter(|n| !n.is_empty())
    }
}

impl CommitMessage {
    /// Parses a single message with a throwaway [`CommitParser`]. Prefer
    /// holding one parser when handling many commits.
    ///
    /// # Example
    ///
    /// ```
    /// # use northbrook::git::CommitMessage;
    /// let msg = CommitMessage::parse("feat(parser)!: drop v1 syntax");
    /// assert_eq!(msg.commit_type, "feat");
    /// assert_eq!(msg.breaking_changes.as_deref(), Some("drop v1 syntax"));
    /// ```
    pub fn parse<S: Into<String>>(raw: S) -> CommitMessage { CommitParser::new().parse(raw) }
}
