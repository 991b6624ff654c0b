//! The derived artifact: one `<query-name> <ranges>` line per query entry.
//!
//! ```
//! use ucd_tables::{artifact::{self, Artifact}, codepoints::CodepointSet, derive::QueryEntry};
//!
//! let entries = [QueryEntry::new("Age=1.1", [0x41u32].into_iter().collect::<CodepointSet>())];
//! let mut out = Vec::new();
//! artifact::write(&mut out, &entries).unwrap();
//! let text = String::from_utf8(out).unwrap();
//! assert_eq!(text, format!("{:<40}65\n", "Age=1.1"));
//!
//! let artifact = Artifact::parse("derived.txt", &text).unwrap();
//! assert_eq!(artifact.get("Age=1.1").unwrap().first(), Some(65));
//! ```

use crate::{
    codepoints::Codepoints,
    derive::QueryEntry,
    error::{Error, Result},
    parse::{
        basic::{pair, prefix},
        text::{self, TextInput},
        Error as _, Parse, Span, Success,
    },
};
use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Column at which the range list starts for names shorter than it.
pub const NAME_WIDTH: usize = 40;

/// Writes one line per entry, in the given order.
pub fn write<W: Write>(writer: &mut W, entries: &[QueryEntry]) -> io::Result<()> {
    for entry in entries {
        let padding = NAME_WIDTH.saturating_sub(entry.name.chars().count()).max(1);
        writeln!(
            writer,
            "{}{:padding$}{}",
            entry.name,
            "",
            entry.codepoints,
            padding = padding
        )?;
    }
    Ok(())
}

/// Creates (or truncates) `path` and writes the artifact into it.
pub fn write_file(path: &Path, entries: &[QueryEntry]) -> Result<()> {
    let file = path.display().to_string();
    let mut writer = BufWriter::new(fs::File::create(path).map_err(|err| Error::io(&file, err))?);
    write(&mut writer, entries)
        .and_then(|()| writer.flush())
        .map_err(|err| Error::io(&file, err))?;
    log::info!("wrote {} entries to {file}", entries.len());
    Ok(())
}

/// A line read back from an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub name: String,
    pub codepoints: Codepoints,
    pub line: usize,
}

fn line<I: TextInput>(input: I) -> text::PResult<(Span<I>, Option<Span<I>>), I> {
    pair(
        text::take_while1(|ch| !ch.is_whitespace()),
        prefix(
            text::take_while1(char::is_whitespace),
            text::take_while0(|ch| !ch.is_whitespace()),
        )
        .opt(),
    )
    .complete()
    .parse(input)
}

#[derive(Debug, Clone, Default)]
pub struct Artifact {
    entries: Vec<ArtifactEntry>,
}

impl Artifact {
    /// Parses artifact text. Blank lines are ignored.
    pub fn parse(file: &str, text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, ranges) = match line(trimmed) {
                Ok(Success((name, ranges), _)) => {
                    (<&str>::from(name), ranges.map_or("", <&str>::from))
                }
                Err(_) => {
                    return Err(Error::source_format(
                        file,
                        idx + 1,
                        raw,
                        "expected `<name> <ranges>`",
                    ))
                }
            };
            let codepoints = Codepoints::parse(ranges).map_err(|err| {
                let column = ranges.len() - err.position().len();
                Error::source_format(
                    file,
                    idx + 1,
                    raw,
                    format!("invalid range list at offset {column}"),
                )
            })?;
            entries.push(ArtifactEntry {
                name: name.to_owned(),
                codepoints,
                line: idx + 1,
            });
        }
        Ok(Self { entries })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|err| Error::io(&file, err))?;
        Self::parse(&file, &text)
    }

    /// Looks up the codepoints of a query name.
    pub fn get(&self, name: &str) -> Option<&Codepoints> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.codepoints)
    }

    pub fn entries(&self) -> &[ArtifactEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
