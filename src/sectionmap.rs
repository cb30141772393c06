use indexmap::IndexMap;
use strum::{EnumIter, IntoEnumIterator};

use crate::git::Commit;

/// The fixed set of changelog sections, declared in the order they are
/// written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Section {
    Breaking,
    Feature,
    Fix,
    Performance,
}

impl Section {
    /// The human readable heading of the section
    pub fn title(self) -> &'static str {
        match self {
            Section::Breaking => "Breaking Changes",
            Section::Feature => "Features",
            Section::Fix => "Bug Fixes",
            Section::Performance => "Performance Improvements",
        }
    }

    /// Position of the section within a changelog entry
    pub fn index(self) -> usize { self as usize }

    /// The section a conventional-commit type belongs to, ignoring breaking
    /// changes. Unrecognized types have no section.
    ///
    /// # Example
    ///
    /// ```
    /// # use northbrook::Section;
    /// assert_eq!(Section::for_type("feat"), Some(Section::Feature));
    /// assert_eq!(Section::for_type("chore"), None);
    /// ```
    pub fn for_type(commit_type: &str) -> Option<Section> {
        match commit_type {
            "feat" => Some(Section::Feature),
            "fix" => Some(Section::Fix),
            "perf" => Some(Section::Performance),
            _ => None,
        }
    }

    /// The single section a commit is listed under. A non-blank breaking
    /// change note takes precedence over the commit type.
    pub fn for_commit(commit: &Commit) -> Option<Section> {
        let note = commit.message.breaking_changes.as_deref();
        if note.map_or(false, |n| !n.trim().is_empty()) {
            Some(Section::Breaking)
        } else {
            Section::for_type(&commit.message.commit_type)
        }
    }
}

/// A struct which holds every section, in writing order, and the commits
/// listed under each
#[derive(Debug)]
pub struct SectionMap<'a> {
    pub sections: IndexMap<Section, Vec<&'a Commit>>,
}

impl<'a> SectionMap<'a> {
    /// Creates a section map from a slice of commits, which we can then
    /// iterate through and write
    ///
    /// # Example
    ///
    /// ```
    /// # use northbrook::{git::{Commit, CommitMessage}, SectionMap, Section};
    /// let commits = vec![Commit::new("abcdef1234567890", CommitMessage::parse("fix: null check"))];
    ///
    /// let sm = SectionMap::from_commits(&commits);
    /// assert_eq!(sm.sections[&Section::Fix].len(), 1);
    /// ```
    pub fn from_commits(commits: &'a [Commit]) -> SectionMap<'a> {
        let mut sm = SectionMap {
            sections: Section::iter().map(|s| (s, vec![])).collect(),
        };

        for entry in commits {
            if let Some(section) = Section::for_commit(entry) {
                sm.sections[&section].push(entry);
            }
        }

        sm
    }

    /// The sections with at least one commit, in writing order
    pub fn non_empty(&self) -> impl Iterator<Item = (Section, &[&'a Commit])> + '_ {
        self.sections
            .iter()
            .filter(|(_, commits)| !commits.is_empty())
            .map(|(section, commits)| (*section, commits.as_slice()))
    }
}
