//! Reading UCD text files.
//!
//! All UCD files consumed here share one line grammar: `;`-separated fields,
//! optionally followed by a `#` comment. [`Record`] splits a line along that
//! grammar and [`UcdTable`] interprets records whose first field is a
//! codepoint or `start..end` range.
//!
//! Where the text comes from is abstracted by [`UcdSource`]: an extracted
//! directory, a `UCD.zip` archive, or an in-memory map.

use crate::{
    codepoints::{CodepointRange, CodepointSet},
    error::{Error, Result},
    parse::{
        basic::{pair, prefix, remaining},
        text::{self, TextInput},
        Parse, Span, Success,
    },
};
use indexmap::{IndexMap, IndexSet};
use std::{
    collections::BTreeMap,
    fs,
    io,
    path::{Path, PathBuf},
};

pub const PROPERTY_ALIASES: &str = "PropertyAliases.txt";
pub const PROPERTY_VALUE_ALIASES: &str = "PropertyValueAliases.txt";
pub const DERIVED_GENERAL_CATEGORY: &str = "extracted/DerivedGeneralCategory.txt";
pub const DERIVED_AGE: &str = "DerivedAge.txt";
pub const SCRIPTS: &str = "Scripts.txt";
pub const DERIVED_CORE_PROPERTIES: &str = "DerivedCoreProperties.txt";

/// One logical line of a UCD file, split into trimmed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    pub fields: Vec<&'a str>,
    /// Text after the `#`, trimmed.
    pub comment: Option<&'a str>,
}

fn field<I: TextInput>(input: I) -> text::PResult<Span<I>, I> {
    text::take_while0(|ch| ch != ';' && ch != '#').parse(input)
}

fn record(input: &str) -> text::PResult<Record<'_>, &str> {
    pair(
        pair(
            field,
            prefix(text::verbatim(";"), field).collect_many0::<Vec<_>>(),
        ),
        prefix(
            text::verbatim("#"),
            remaining::<&str, text::Error<&str>>,
        )
        .opt(),
    )
    .map(|((first, rest), comment)| Record {
        fields: std::iter::once(first)
            .chain(rest)
            .map(|span| <&str>::from(span).trim())
            .collect(),
        comment: comment.map(str::trim),
    })
    .complete()
    .parse(input)
}

impl<'a> Record<'a> {
    /// Splits `line` into fields. Returns [`None`] for blank and
    /// comment-only lines.
    ///
    /// ```
    /// use ucd_tables::ucd::Record;
    ///
    /// let record = Record::parse("gc ; L  ; Letter  # Ll | Lm | Lo | Lt | Lu").unwrap();
    /// assert_eq!(record.fields, ["gc", "L", "Letter"]);
    /// assert_eq!(record.comment, Some("Ll | Lm | Lo | Lt | Lu"));
    ///
    /// assert!(Record::parse("# @missing: 0000..10FFFF; Unknown").is_none());
    /// ```
    pub fn parse(line: &'a str) -> Option<Self> {
        let Ok(Success(record, _)) = record(line) else {
            return None;
        };
        if record.fields.iter().all(|field| field.is_empty()) {
            None
        } else {
            Some(record)
        }
    }
}

/// Iterates the data records of a UCD file with their 1-based line numbers.
pub fn records(text: &str) -> impl Iterator<Item = (usize, &str, Record<'_>)> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| Record::parse(line).map(|record| (idx + 1, line, record)))
}

fn codepoint_field<I: TextInput>(input: I) -> text::PResult<CodepointRange, I> {
    pair(text::hex_u32, prefix(text::verbatim(".."), text::hex_u32).opt())
        .try_map(|(start, end)| match end {
            Some(end) if end < start => Err(text::ErrorKind::InvalidInput),
            end => Ok(CodepointRange::new(start, end.unwrap_or(start))),
        })
        .complete()
        .parse(input)
}

/// Codepoint sets keyed by the raw value of the second field, in the order
/// keys first appear in the file.
#[derive(Debug, Clone, Default)]
pub struct UcdTable {
    entries: IndexMap<String, CodepointSet>,
    valued: IndexSet<String>,
}

impl UcdTable {
    /// Parses a `<codepoints> ; <key> [; <value>]` file.
    ///
    /// Blank and comment-only lines are skipped. Any other line must have a
    /// hexadecimal codepoint or range and a non-empty key.
    pub fn parse(file: &str, text: &str) -> Result<Self> {
        let mut table = Self::default();
        for (line_no, line, record) in records(text) {
            let [cp_field, key, rest @ ..] = record.fields.as_slice() else {
                return Err(Error::source_format(
                    file,
                    line_no,
                    line,
                    "expected `<codepoints> ; <value>`",
                ));
            };
            let range = match codepoint_field(*cp_field) {
                Ok(Success(range, _)) => range,
                Err(_) => {
                    return Err(Error::source_format(
                        file,
                        line_no,
                        line,
                        "invalid codepoint field",
                    ))
                }
            };
            if key.is_empty() {
                return Err(Error::source_format(file, line_no, line, "empty value field"));
            }
            if rest.first().is_some_and(|value| !value.is_empty()) {
                table.valued.insert((*key).to_owned());
            }
            table
                .entries
                .entry((*key).to_owned())
                .or_default()
                .add(range);
        }
        log::debug!("{file}: {} distinct values", table.entries.len());
        Ok(table)
    }

    pub fn get(&self, key: &str) -> Option<&CodepointSet> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodepointSet)> {
        self.entries.iter().map(|(key, set)| (key.as_str(), set))
    }

    /// Returns `true` if any record for `key` carried a third field, which
    /// marks an enumerated rather than boolean property.
    pub fn is_enumerated(&self, key: &str) -> bool {
        self.valued.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A provider of UCD files by their path relative to the UCD root.
pub trait UcdSource {
    /// Reads a whole file. An absent file is [`Error::MissingSource`].
    fn read(&mut self, file: &str) -> Result<String>;
}

impl<S: UcdSource + ?Sized> UcdSource for Box<S> {
    fn read(&mut self, file: &str) -> Result<String> {
        (**self).read(file)
    }
}

impl UcdSource for BTreeMap<String, String> {
    fn read(&mut self, file: &str) -> Result<String> {
        self.get(file).cloned().ok_or_else(|| Error::MissingSource {
            file: file.to_owned(),
        })
    }
}

/// An extracted UCD tree on disk.
#[derive(Debug, Clone)]
pub struct UcdDirectory {
    root: PathBuf,
}

impl UcdDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl UcdSource for UcdDirectory {
    fn read(&mut self, file: &str) -> Result<String> {
        let path = self.root.join(file);
        log::debug!("reading {}", path.display());
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::MissingSource {
                file: file.to_owned(),
            },
            _ => Error::io(path.display().to_string(), err),
        })
    }
}

/// A `UCD.zip` archive as published by the Unicode Consortium.
#[cfg(feature = "zip")]
pub struct UcdArchive<R> {
    archive: zip::ZipArchive<R>,
}

#[cfg(feature = "zip")]
impl<R: io::Read + io::Seek> UcdArchive<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive =
            zip::ZipArchive::new(reader).map_err(|err| Error::io("UCD archive", err.into()))?;
        Ok(Self { archive })
    }
}

#[cfg(feature = "zip")]
impl<R: io::Read + io::Seek> UcdSource for UcdArchive<R> {
    fn read(&mut self, file: &str) -> Result<String> {
        use std::io::Read;

        log::debug!("extracting {file}");
        let mut entry = match self.archive.by_name(file) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::MissingSource {
                    file: file.to_owned(),
                })
            }
            Err(err) => return Err(Error::io(file, err.into())),
        };
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|err| Error::io(file, err))?;
        Ok(text)
    }
}

/// Opens `path` as a UCD source: a directory is read as an extracted tree,
/// any other file as a zip archive.
pub fn open(path: &Path) -> Result<Box<dyn UcdSource>> {
    if path.is_dir() {
        return Ok(Box::new(UcdDirectory::new(path)));
    }
    if !path.exists() {
        return Err(Error::Configuration(format!(
            "UCD source {} does not exist",
            path.display()
        )));
    }
    open_archive(path)
}

#[cfg(feature = "zip")]
fn open_archive(path: &Path) -> Result<Box<dyn UcdSource>> {
    let file = fs::File::open(path).map_err(|err| Error::io(path.display().to_string(), err))?;
    Ok(Box::new(UcdArchive::new(io::BufReader::new(file))?))
}

#[cfg(not(feature = "zip"))]
fn open_archive(path: &Path) -> Result<Box<dyn UcdSource>> {
    Err(Error::Configuration(format!(
        "{} is not a directory and archive support is disabled",
        path.display()
    )))
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPTS_SAMPLE: &str = "\
# Scripts-16.0.0.txt

# ================================================

0041..005A    ; Latin # L&  [26] LATIN CAPITAL LETTER A..LATIN CAPITAL LETTER Z
0061..007A    ; Latin # L&  [26] LATIN SMALL LETTER A..LATIN SMALL LETTER Z
00AA          ; Latin # Lo       FEMININE ORDINAL INDICATOR
0370..0373    ; Greek # L&   [4] GREEK CAPITAL LETTER HETA..GREEK SMALL LETTER ARCHAIC SAMPI
";

    #[test]
    fn record_fields_and_comment() {
        let record = Record::parse("0915..0939    ; InCB; Consonant # Lo  [37] ...").unwrap();
        assert_eq!(record.fields, ["0915..0939", "InCB", "Consonant"]);
        assert_eq!(record.comment, Some("Lo  [37] ..."));

        let record = Record::parse("age; 1.1 ; V1_1").unwrap();
        assert_eq!(record.fields, ["age", "1.1", "V1_1"]);
        assert_eq!(record.comment, None);

        assert!(Record::parse("").is_none());
        assert!(Record::parse("   ").is_none());
        assert!(Record::parse("# comment only").is_none());
    }

    #[test]
    fn records_number_lines_from_one() {
        let lines: Vec<_> = records("# header\n\nA ; B\n").collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, 3);
    }

    #[test]
    fn table_accumulates_per_key() {
        let table = UcdTable::parse("Scripts.txt", SCRIPTS_SAMPLE).unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), ["Latin", "Greek"]);
        assert_eq!(table.get("Latin").unwrap().serialize(), "65..90,97..122,170");
        assert_eq!(table.get("Greek").unwrap().serialize(), "880..883");
        assert!(!table.is_enumerated("Latin"));
    }

    #[test]
    fn table_marks_enumerated_keys() {
        let text = "0041 ; Alphabetic # L&\n0915..0939 ; InCB; Consonant # Lo\n";
        let table = UcdTable::parse("DerivedCoreProperties.txt", text).unwrap();
        assert!(table.is_enumerated("InCB"));
        assert!(!table.is_enumerated("Alphabetic"));
    }

    #[test]
    fn malformed_lines_are_fatal() {
        let err = UcdTable::parse("DerivedAge.txt", "# x\nXYZ ; 1.1\n").unwrap_err();
        assert!(matches!(
            err,
            Error::SourceFormat { line: 2, ref file, .. } if file == "DerivedAge.txt"
        ));

        assert!(UcdTable::parse("DerivedAge.txt", "0041\n").is_err());
        assert!(UcdTable::parse("DerivedAge.txt", "0042..0041 ; 1.1\n").is_err());
        assert!(UcdTable::parse("DerivedAge.txt", "0041 ; \n").is_err());
    }

    #[test]
    fn directory_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("extracted")).unwrap();
        fs::write(dir.path().join(DERIVED_GENERAL_CATEGORY), "0041 ; Lu\n").unwrap();

        let mut source = UcdDirectory::new(dir.path());
        assert_eq!(source.read(DERIVED_GENERAL_CATEGORY).unwrap(), "0041 ; Lu\n");
        assert!(matches!(
            source.read(SCRIPTS),
            Err(Error::MissingSource { file }) if file == SCRIPTS
        ));
    }

    #[test]
    fn open_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.zip");
        assert!(matches!(open(&missing), Err(Error::Configuration(_))));
        assert!(open(dir.path()).is_ok());
    }

    #[cfg(feature = "zip")]
    #[test]
    fn archive_source() {
        use std::io::{Cursor, Write};

        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file(SCRIPTS, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(SCRIPTS_SAMPLE.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf.set_position(0);

        let mut source = UcdArchive::new(buf).unwrap();
        assert_eq!(source.read(SCRIPTS).unwrap(), SCRIPTS_SAMPLE);
        assert!(matches!(
            source.read(DERIVED_AGE),
            Err(Error::MissingSource { .. })
        ));
    }
}
