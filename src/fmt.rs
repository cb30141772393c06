mod md_writer;

use time::Date;

pub use self::md_writer::MarkdownWriter;
use crate::{error::Result, git::ReleasePackage, sectionmap::SectionMap};

/// A trait that allows writing the new entry of a changelog in an arbitrary
/// format. The single required function `write_changelog()` accepts a
/// `SectionMap` which can be thought of similiar to an "AST" of the release.
///
/// The preserved contents of the previous changelog are not part of the
/// entry; the caller appends them.
pub trait FormatWriter {
    /// Writes the entry for `release`, dated `date`
    fn write_changelog(
        &mut self,
        release: &ReleasePackage,
        date: Date,
        section_map: &SectionMap,
    ) -> Result<()>;
}
