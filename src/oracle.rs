//! Property-matching oracles used as ground truth by the validator.
//!
//! An [`Oracle`] compiles `\p{Name}` or `\p{Key=Value}` patterns into a
//! [`Property`]. A pattern it cannot express yields [`Unsupported`], which is
//! never an [`Error`](crate::Error): it means "could not check", not "failed".

use std::fmt;

/// A compiled codepoint predicate.
pub trait Property: fmt::Debug {
    /// Returns `true` if `ch` has this property.
    fn contains(&self, ch: char) -> bool;
}

/// The oracle cannot compile a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub pattern: String,
    pub reason: String,
}

impl Unsupported {
    pub fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported pattern {}: {}", self.pattern, self.reason)
    }
}

impl std::error::Error for Unsupported {}

pub trait Oracle {
    type Property: Property;

    fn compile(&self, pattern: &str) -> Result<Self::Property, Unsupported>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    type Property = O::Property;

    fn compile(&self, pattern: &str) -> Result<Self::Property, Unsupported> {
        (**self).compile(pattern)
    }
}

const TRUE_SPELLINGS: [&str; 4] = ["Y", "Yes", "T", "True"];

/// Translates an artifact query name into an oracle pattern.
///
/// ```
/// use ucd_tables::oracle::pattern_for;
///
/// assert_eq!(pattern_for("Block=Basic_Latin"), r"\p{InBasic_Latin}");
/// assert_eq!(pattern_for("Alpha=Yes"), r"\p{Alpha}");
/// assert_eq!(pattern_for("Script=Latin"), r"\p{Script=Latin}");
/// ```
pub fn pattern_for(query: &str) -> String {
    match query.split_once('=') {
        Some(("Block" | "blk", block)) => format!("\\p{{In{block}}}"),
        Some((property, value)) if TRUE_SPELLINGS.contains(&value) => format!("\\p{{{property}}}"),
        _ => format!("\\p{{{query}}}"),
    }
}

#[cfg(feature = "icu")]
pub use icu::{IcuOracle, IcuProperty};

#[cfg(feature = "icu")]
mod icu {
    use super::{Oracle, Property, Unsupported};
    use crate::parse::{
        basic::{delimited, pair, prefix},
        text::{self, TextInput},
        Parse, Span, Success,
    };
    use icu_properties::{
        props::{EnumeratedProperty, GeneralCategory, GeneralCategoryGroup, Script},
        CodePointSetData, CodePointSetDataBorrowed, PropertyParser,
    };
    use regex::Regex;

    fn pattern<I: TextInput>(input: I) -> text::PResult<(Span<I>, Option<Span<I>>), I> {
        delimited(
            text::verbatim("\\p{"),
            pair(
                text::take_while1(|ch| ch != '}' && ch != '='),
                prefix(text::verbatim("="), text::take_while1(|ch| ch != '}')).opt(),
            ),
            text::verbatim("}"),
        )
        .complete()
        .parse(input)
    }

    /// A property backed by the ICU4X compiled Unicode data.
    ///
    /// ICU4X has no `Age` data, so ages are answered by the Unicode tables of
    /// `regex`, where `\p{Age=V}` already covers every earlier version.
    #[derive(Debug, Clone)]
    pub enum IcuProperty {
        Category(GeneralCategoryGroup),
        Script(Script),
        Binary(CodePointSetDataBorrowed<'static>),
        Age(Regex),
    }

    impl Property for IcuProperty {
        fn contains(&self, ch: char) -> bool {
            match self {
                Self::Category(group) => group.contains(GeneralCategory::for_char(ch)),
                Self::Script(script) => Script::for_char(ch) == *script,
                Self::Binary(set) => set.contains(ch),
                Self::Age(regex) => regex.is_match(ch.encode_utf8(&mut [0; 4])),
            }
        }
    }

    fn age(source: &str, version: &str) -> Result<IcuProperty, Unsupported> {
        Regex::new(&format!("\\A\\p{{Age={version}}}\\z"))
            .map(IcuProperty::Age)
            .map_err(|_| Unsupported::new(source, format!("unknown age {version}")))
    }

    /// Oracle over `General_Category`, `Script`, `Age` and the ECMA-262
    /// binary properties. Blocks are unsupported.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct IcuOracle;

    impl Oracle for IcuOracle {
        type Property = IcuProperty;

        fn compile(&self, source: &str) -> Result<IcuProperty, Unsupported> {
            let (name, value) = match pattern(source) {
                Ok(Success((name, value), _)) => (<&str>::from(name), value.map(<&str>::from)),
                Err(_) => return Err(Unsupported::new(source, "not a \\p{...} pattern")),
            };
            match (name, value) {
                ("gc" | "General_Category", Some(value)) => {
                    PropertyParser::<GeneralCategoryGroup>::new()
                        .get_strict(value)
                        .map(IcuProperty::Category)
                        .ok_or_else(|| Unsupported::new(source, "unknown general category"))
                }
                ("sc" | "Script", Some(value)) => PropertyParser::<Script>::new()
                    .get_strict(value)
                    .map(IcuProperty::Script)
                    .ok_or_else(|| Unsupported::new(source, "unknown script")),
                ("age" | "Age", Some(value)) => age(source, value),
                (name, None) => CodePointSetData::new_for_ecma262(name.as_bytes())
                    .map(IcuProperty::Binary)
                    .ok_or_else(|| Unsupported::new(source, "not an ECMA-262 binary property")),
                (name, Some(_)) => Err(Unsupported::new(
                    source,
                    format!("no ICU support for {name} values"),
                )),
            }
        }
    }

}
