#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Compact Unicode property tables
//! `ucd_tables` turns the raw Unicode Character Database (UCD) into a single
//! text artifact mapping property queries such as `General_Category=Lu`,
//! `Age=2.0`, `Script=Latin` or `Uppercase=Y` to run-length compressed
//! codepoint ranges, and checks that artifact against an independent property
//! oracle.
//!
//! # Contents
//! * [Example](#example) - Generating and validating a tiny artifact
//! * [Generation](#generation) - How query entries are derived
//! * [Validation](#validation) - How the artifact is checked
//! * [Features](#features) - Available crate features
//!
//! # Example
//! ```
//! use std::collections::BTreeMap;
//! use ucd_tables::{
//!     artifact::{self, Artifact},
//!     derive::Generator,
//!     ucd,
//!     validate::{Mode, ValidateConfig, Validator},
//! };
//!
//! let files: BTreeMap<String, String> = [
//!     (ucd::PROPERTY_ALIASES, "gc ; General_Category\n"),
//!     (
//!         ucd::PROPERTY_VALUE_ALIASES,
//!         "gc ; L ; Letter # Ll | Lu\ngc ; Ll ; Lowercase_Letter\ngc ; Lu ; Uppercase_Letter\n",
//!     ),
//!     (ucd::DERIVED_GENERAL_CATEGORY, "0041..005A ; Lu\n0061..007A ; Ll\n"),
//! ]
//! .into_iter()
//! .map(|(file, text)| (file.to_owned(), text.to_owned()))
//! .collect();
//!
//! let mut generator = Generator::new(files)?;
//! let entries = generator.general_categories()?;
//!
//! let mut out = Vec::new();
//! artifact::write(&mut out, &entries)?;
//! let text = String::from_utf8(out)?;
//! assert!(text.starts_with("General_Category=L "));
//!
//! let artifact = Artifact::parse("derived.txt", &text)?;
//! assert_eq!(artifact.get("General_Category=Letter").unwrap().len(), 52);
//!
//! # #[cfg(feature = "icu")]
//! # {
//! let config = ValidateConfig { mode: Mode::Full, seed: None };
//! let report = Validator::new(ucd_tables::oracle::IcuOracle, config).validate(&artifact)?;
//! assert_eq!(report.entries_checked, 6);
//! # }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Generation
//! A [`Generator`](derive::Generator) reads the alias files once, then runs
//! four derivations over a [`UcdSource`](ucd::UcdSource):
//!
//! * General categories. Categories declaring subsets in their alias comment
//!   (`gc ; L ; Letter # Ll | Lm | Lo | Lt | Lu`) match the union of those
//!   subsets.
//! * Ages, folded in version order so that every version also matches the
//!   codepoints of all earlier versions.
//! * Scripts.
//! * The boolean properties of `DerivedCoreProperties.txt`.
//!
//! Every accepted spelling of a value becomes its own query entry. Unknown
//! names, malformed lines and subset cycles abort the run.
//!
//! # Validation
//! A [`Validator`](validate::Validator) re-reads the artifact, translates each
//! query name into a `\p{...}` pattern and asks an
//! [`Oracle`](oracle::Oracle) about the codepoints picked by the configured
//! [`Mode`](validate::Mode). Surrogates are never checked. Patterns the oracle
//! cannot compile are skipped with a warning, while the first codepoint that
//! does not match is fatal.
//!
//! # Features
//! * `icu` - Enable [`IcuOracle`](oracle::IcuOracle), backed by the
//! `icu_properties` compiled data and, for ages, the Unicode tables of
//! `regex`. Enabled by default.
//! * `zip` - Enable [`UcdArchive`](ucd::UcdArchive), reading sources straight
//! from a `UCD.zip`. Enabled by default.
//! * `cli` - Build the `ucd-tables` binary. Enabled by default.

pub mod alias;
pub mod artifact;
pub mod codepoints;
pub mod derive;
pub mod error;
pub mod oracle;
pub mod parse;
pub mod ucd;
pub mod validate;

pub use error::{AliasError, Error, Result};
