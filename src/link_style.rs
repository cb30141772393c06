use std::{result::Result as StdResult, str::FromStr};

use strum::{Display, EnumString};

/// Determines the hyperlink style used in commit links. Defaults to
/// `LinkStyle::Stash`, i.e. `<repo>/commits/<hash>`, which Bitbucket uses as
/// well.
///
/// # Example
///
/// ```no_run
/// # use northbrook::{Changelog, LinkStyle};
/// let changelog = Changelog::new().link_style(LinkStyle::Github);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum LinkStyle {
    Github,
    Gitlab,
    #[default]
    Stash,
    Cgit,
    Gitweb,
}

impl<'de> serde::de::Deserialize<'de> for LinkStyle {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(|_| serde::de::Error::custom(format!("unrecognized link-style: {s}")))
    }
}

impl LinkStyle {
    /// Gets a hyperlink url to a commit in the specified format.
    ///
    /// # Example
    /// ```
    /// # use northbrook::LinkStyle;
    /// let link = LinkStyle::Stash;
    /// let commit = link.commit_link("abcdef1234567890", "https://repo");
    ///
    /// assert_eq!("https://repo/commits/abcdef1234567890", commit);
    /// ```
    ///
    /// # Example
    /// Note that for `LinkStyle::Gitweb` the actual repository name has to be given as part of the parameter string of the URL:
    ///
    /// ```
    /// # use northbrook::LinkStyle;
    /// let link = LinkStyle::Gitweb;
    /// let commit = link.commit_link("deadbeef", "http://example.com/gitweb/?p=foo.git");
    ///
    /// assert_eq!("http://example.com/gitweb/?p=foo.git;a=commit;h=deadbeef", commit);
    /// ```
    pub fn commit_link<S: AsRef<str>>(&self, hash: S, repo: S) -> String {
        let (hash, link) = (hash.as_ref(), repo.as_ref());
        match *self {
            LinkStyle::Github | LinkStyle::Gitlab => format!("{link}/commit/{hash}"),
            LinkStyle::Stash => format!("{link}/commits/{hash}"),
            LinkStyle::Cgit => format!("{link}/commit/?id={hash}"),
            LinkStyle::Gitweb => format!("{link};a=commit;h={hash}"),
        }
    }
}
