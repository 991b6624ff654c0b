//! Derivation of query entries from the UCD.
//!
//! [`Generator`] owns the UCD source and the alias tables for one run. Each
//! derivation reads the files it needs, resolves raw UCD names through the
//! aliases, and emits one [`QueryEntry`] per accepted spelling.

use crate::{
    alias::{AliasResolver, AliasSet},
    codepoints::CodepointSet,
    error::{AliasError, Error, Result},
    parse::{
        basic::{delimited, pair, prefix, separated_pair},
        text::{self, TextInput},
        Parse, Span, Success,
    },
    ucd::{self, UcdSource, UcdTable},
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A query name and the codepoints it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry {
    pub name: String,
    pub codepoints: CodepointSet,
}

impl QueryEntry {
    pub fn new(name: impl Into<String>, codepoints: CodepointSet) -> Self {
        Self {
            name: name.into(),
            codepoints,
        }
    }
}

fn name<I: TextInput>(input: I) -> text::PResult<Span<I>, I> {
    text::take_while1(|ch| ch.is_ascii_alphanumeric() || ch == '_').parse(input)
}

fn subset_list(input: &str) -> text::PResult<Vec<&str>, &str> {
    pair(
        name,
        prefix(
            delimited(text::space0, text::verbatim("|"), text::space0),
            name,
        )
        .collect_many0::<Vec<_>>(),
    )
    .map(|(first, rest)| {
        std::iter::once(first)
            .chain(rest)
            .map(<&str>::from)
            .collect()
    })
    .complete()
    .parse(input)
}

/// Subset abbreviations listed in a general category's alias comment.
///
/// A category without a comment has no subsets. A comment that is not a
/// `|`-separated list of names is a format error of the alias file.
fn subsets(set: &AliasSet) -> Result<Vec<&str>> {
    let Some(comment) = set.comment.as_deref().filter(|comment| !comment.is_empty()) else {
        return Ok(Vec::new());
    };
    match subset_list(comment) {
        Ok(Success(list, _)) => Ok(list),
        Err(_) => Err(Error::source_format(
            ucd::PROPERTY_VALUE_ALIASES,
            set.line,
            comment,
            "expected a `|`-separated list of subset categories",
        )),
    }
}

fn version(input: &str) -> text::PResult<(u32, u32), &str> {
    separated_pair(text::dec_u32, text::verbatim("."), text::dec_u32)
        .complete()
        .parse(input)
}

/// Generation context for one run.
pub struct Generator<S> {
    source: S,
    aliases: AliasResolver,
}

impl<S: UcdSource> Generator<S> {
    /// Loads both alias files from `source`.
    pub fn new(mut source: S) -> Result<Self> {
        let property_aliases = source.read(ucd::PROPERTY_ALIASES)?;
        let value_aliases = source.read(ucd::PROPERTY_VALUE_ALIASES)?;
        let aliases = AliasResolver::parse(&property_aliases, &value_aliases)?;
        Ok(Self { source, aliases })
    }

    pub fn aliases(&self) -> &AliasResolver {
        &self.aliases
    }

    fn table(&mut self, file: &str) -> Result<UcdTable> {
        let text = self.source.read(file)?;
        UcdTable::parse(file, &text)
    }

    /// Runs every derivation, in artifact order.
    pub fn run(&mut self) -> Result<Vec<QueryEntry>> {
        let mut entries = self.general_categories()?;
        entries.extend(self.ages()?);
        entries.extend(self.scripts()?);
        entries.extend(self.core_properties()?);
        log::info!("derived {} query entries", entries.len());
        Ok(entries)
    }

    /// `General_Category=<spelling>` entries. Categories declaring subsets
    /// match the union of their subsets.
    pub fn general_categories(&mut self) -> Result<Vec<QueryEntry>> {
        let table = self.table(ucd::DERIVED_GENERAL_CATEGORY)?;
        let categories = self.aliases.value_groups("gc");

        // Keyed by abbreviation, whichever spelling the data file uses.
        let mut direct: IndexMap<&str, CodepointSet> = IndexMap::new();
        for (key, codepoints) in table.iter() {
            let set = self.aliases.find_value_group("gc", key)?;
            direct
                .entry(set.abbreviation())
                .or_default()
                .union_with(codepoints);
        }

        let declared = categories
            .iter()
            .map(|set| subsets(set).map(|list| (set.abbreviation(), list)))
            .collect::<Result<IndexMap<&str, Vec<&str>>>>()?;
        let mut resolver = SubsetResolver {
            declared: &declared,
            direct: &direct,
            resolved: HashMap::new(),
            stack: Vec::new(),
        };

        let mut entries = Vec::new();
        for set in categories {
            let codepoints = resolver.resolve(set.abbreviation())?;
            for spelling in &set.spellings {
                entries.push(QueryEntry::new(
                    format!("General_Category={spelling}"),
                    codepoints.clone(),
                ));
            }
        }
        log::info!("General_Category: {} categories", categories.len());
        Ok(entries)
    }

    /// `Age=<spelling>` entries. Each version matches everything assigned in
    /// it or in any earlier version.
    pub fn ages(&mut self) -> Result<Vec<QueryEntry>> {
        let direct = self.table(ucd::DERIVED_AGE)?;

        let mut versions: Vec<((u32, u32), &AliasSet)> = self
            .aliases
            .value_groups("age")
            .iter()
            .filter_map(|set| match version(set.abbreviation()) {
                Ok(Success(version, _)) => Some((version, set)),
                Err(_) => None,
            })
            .collect();
        versions.sort_by_key(|(version, _)| *version);

        for key in direct.keys() {
            if !versions.iter().any(|(_, set)| set.abbreviation() == key) {
                return Err(AliasError::UnknownValue {
                    property: "age".to_owned(),
                    value: key.to_owned(),
                }
                .into());
            }
        }

        let mut cumulative = CodepointSet::new();
        let mut entries = Vec::new();
        for (_, set) in &versions {
            if let Some(assigned) = direct.get(set.abbreviation()) {
                cumulative.union_with(assigned);
                cumulative.normalize();
            }
            for spelling in &set.spellings {
                entries.push(QueryEntry::new(format!("Age={spelling}"), cumulative.clone()));
            }
        }
        log::info!("Age: {} versions", versions.len());
        Ok(entries)
    }

    /// `Script=<spelling>` entries, in `Scripts.txt` order.
    pub fn scripts(&mut self) -> Result<Vec<QueryEntry>> {
        let direct = self.table(ucd::SCRIPTS)?;

        let mut entries = Vec::new();
        for (key, codepoints) in direct.iter() {
            let set = self.aliases.find_value_group("sc", key)?;
            let mut codepoints = codepoints.clone();
            codepoints.normalize();
            for spelling in &set.spellings {
                entries.push(QueryEntry::new(format!("Script={spelling}"), codepoints.clone()));
            }
        }
        log::info!("Script: {} scripts", direct.len());
        Ok(entries)
    }

    /// `<property>=<true>` entries for every boolean property of
    /// `DerivedCoreProperties.txt`, one per combination of property and
    /// `True` spellings.
    pub fn core_properties(&mut self) -> Result<Vec<QueryEntry>> {
        let direct = self.table(ucd::DERIVED_CORE_PROPERTIES)?;

        let mut entries = Vec::new();
        let mut properties = 0;
        for (key, codepoints) in direct.iter() {
            if direct.is_enumerated(key) {
                log::debug!("skipping enumerated property {key}");
                continue;
            }
            let names = self.aliases.find_property_group(key)?;
            let value_key = self.aliases.resolve_boolean_property_value_key(key)?;
            let truthy = self.aliases.find_value_group(value_key, "True")?;

            let mut codepoints = codepoints.clone();
            codepoints.normalize();
            for name in names {
                for value in &truthy.spellings {
                    entries.push(QueryEntry::new(format!("{name}={value}"), codepoints.clone()));
                }
            }
            properties += 1;
        }
        log::info!("core properties: {properties} properties");
        Ok(entries)
    }
}

/// Memoised depth-first resolution of general category subsets.
struct SubsetResolver<'a> {
    declared: &'a IndexMap<&'a str, Vec<&'a str>>,
    direct: &'a IndexMap<&'a str, CodepointSet>,
    resolved: HashMap<&'a str, CodepointSet>,
    stack: Vec<&'a str>,
}

impl<'a> SubsetResolver<'a> {
    fn resolve(&mut self, abbreviation: &'a str) -> Result<CodepointSet> {
        if let Some(set) = self.resolved.get(abbreviation) {
            return Ok(set.clone());
        }
        if let Some(pos) = self.stack.iter().position(|&name| name == abbreviation) {
            let mut chain: Vec<String> = self.stack[pos..].iter().map(|s| (*s).to_owned()).collect();
            chain.push(abbreviation.to_owned());
            return Err(Error::Cycle { chain });
        }

        let declared = self.declared;
        let subsets = declared.get(abbreviation).map(Vec::as_slice).unwrap_or_default();
        let mut set = if subsets.is_empty() {
            self.direct.get(abbreviation).cloned().unwrap_or_default()
        } else {
            self.stack.push(abbreviation);
            let mut union = CodepointSet::new();
            for &subset in subsets {
                if !declared.contains_key(subset) {
                    return Err(AliasError::UnknownValue {
                        property: "gc".to_owned(),
                        value: subset.to_owned(),
                    }
                    .into());
                }
                union.union_with(&self.resolve(subset)?);
            }
            self.stack.pop();
            union
        };
        set.normalize();
        self.resolved.insert(abbreviation, set.clone());
        Ok(set)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    const PROPERTY_ALIASES: &str = "\
age ; Age
gc  ; General_Category
sc  ; Script
Upper ; Uppercase
InCB ; Indic_Conjunct_Break
";

    const VALUE_ALIASES: &str = "\
age; 1.1 ; V1_1
age; 2.0 ; V2_0
age; NA  ; Unassigned
gc ; L   ; Letter                          # Lu | Ll
gc ; Ll  ; Lowercase_Letter
gc ; Lu  ; Uppercase_Letter
gc ; P   ; Punctuation      ; punct       # Po
gc ; Po  ; Other_Punctuation
sc ; Latn ; Latin
sc ; Grek ; Greek
Upper; N ; No ; F ; False
Upper; Y ; Yes ; T ; True
InCB; Consonant ; Consonant
";

    fn source(files: &[(&str, &str)]) -> BTreeMap<String, String> {
        let mut source: BTreeMap<String, String> = [
            (ucd::PROPERTY_ALIASES, PROPERTY_ALIASES),
            (ucd::PROPERTY_VALUE_ALIASES, VALUE_ALIASES),
        ]
        .into_iter()
        .map(|(file, text)| (file.to_owned(), text.to_owned()))
        .collect();
        for (file, text) in files {
            source.insert((*file).to_owned(), (*text).to_owned());
        }
        source
    }

    fn lookup<'a>(entries: &'a [QueryEntry], name: &str) -> String {
        entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.codepoints.serialize())
            .unwrap_or_else(|| panic!("no entry {name}"))
    }

    #[test]
    fn letter_is_union_of_subsets() {
        let mut generator = Generator::new(source(&[(
            ucd::DERIVED_GENERAL_CATEGORY,
            "0041..005A ; Lu # [26]\n0061..007A ; Ll # [26]\n0021 ; Po\n",
        )]))
        .unwrap();
        let entries = generator.general_categories().unwrap();

        assert_eq!(lookup(&entries, "General_Category=Letter"), "65..90,97..122");
        assert_eq!(lookup(&entries, "General_Category=L"), "65..90,97..122");
        assert_eq!(lookup(&entries, "General_Category=Lu"), "65..90");
        assert_eq!(lookup(&entries, "General_Category=Uppercase_Letter"), "65..90");
        assert_eq!(lookup(&entries, "General_Category=punct"), "33");
        assert_eq!(entries.len(), 11);
    }

    #[test]
    fn subset_cycles_are_detected() {
        let mut files = source(&[(ucd::DERIVED_GENERAL_CATEGORY, "0041 ; Lu\n")]);
        files.insert(
            ucd::PROPERTY_VALUE_ALIASES.to_owned(),
            "gc ; A ; Aa # B\ngc ; B ; Bb # Lu | A\ngc ; Lu ; Uppercase_Letter\n".to_owned(),
        );
        let mut generator = Generator::new(files).unwrap();
        match generator.general_categories() {
            Err(Error::Cycle { chain }) => assert_eq!(chain, ["A", "B", "A"]),
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn unknown_subset_or_category_is_fatal() {
        let mut files = source(&[(ucd::DERIVED_GENERAL_CATEGORY, "0041 ; Lu\n")]);
        files.insert(
            ucd::PROPERTY_VALUE_ALIASES.to_owned(),
            "gc ; L ; Letter # Lu | Lx\ngc ; Lu ; Uppercase_Letter\n".to_owned(),
        );
        let mut generator = Generator::new(files).unwrap();
        assert!(matches!(
            generator.general_categories(),
            Err(Error::Alias(AliasError::UnknownValue { value, .. })) if value == "Lx"
        ));

        let mut generator =
            Generator::new(source(&[(ucd::DERIVED_GENERAL_CATEGORY, "0041 ; Zz\n")])).unwrap();
        assert!(matches!(
            generator.general_categories(),
            Err(Error::Alias(AliasError::UnknownValue { .. }))
        ));
    }

    #[test]
    fn malformed_subset_comment_is_fatal() {
        let mut files = source(&[(ucd::DERIVED_GENERAL_CATEGORY, "0041 ; Lu\n")]);
        files.insert(
            ucd::PROPERTY_VALUE_ALIASES.to_owned(),
            "gc ; Lu ; Uppercase_Letter\ngc ; L ; Letter # Lu | \n".to_owned(),
        );
        let mut generator = Generator::new(files).unwrap();
        match generator.general_categories() {
            Err(Error::SourceFormat { file, line, .. }) => {
                assert_eq!(file, ucd::PROPERTY_VALUE_ALIASES);
                assert_eq!(line, 2);
            }
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn data_keys_may_use_any_spelling() {
        let mut generator = Generator::new(source(&[(
            ucd::DERIVED_GENERAL_CATEGORY,
            "0041 ; Uppercase_Letter\n0061 ; Ll\n0042 ; Lu\n",
        )]))
        .unwrap();
        let entries = generator.general_categories().unwrap();

        assert_eq!(lookup(&entries, "General_Category=Lu"), "65..66");
        assert_eq!(lookup(&entries, "General_Category=Uppercase_Letter"), "65..66");
        assert_eq!(lookup(&entries, "General_Category=Letter"), "65..66,97");
    }

    #[test]
    fn ages_are_cumulative() {
        let mut generator =
            Generator::new(source(&[(ucd::DERIVED_AGE, "0041 ; 1.1\n0042 ; 2.0\n")])).unwrap();
        let entries = generator.ages().unwrap();

        assert_eq!(lookup(&entries, "Age=1.1"), "65");
        assert_eq!(lookup(&entries, "Age=V1_1"), "65");
        assert_eq!(lookup(&entries, "Age=2.0"), "65..66");
        assert_eq!(lookup(&entries, "Age=V2_0"), "65..66");
        assert!(entries.iter().all(|entry| !entry.name.contains("NA")));
    }

    #[test]
    fn ages_follow_version_order() {
        let mut files = source(&[(
            ucd::DERIVED_AGE,
            "0030..0039 ; 10.0\n0041 ; 2.0\n0061 ; 1.1\n",
        )]);
        files.insert(
            ucd::PROPERTY_VALUE_ALIASES.to_owned(),
            "age; 10.0 ; V10_0\nage; 1.1 ; V1_1\nage; 2.0 ; V2_0\n".to_owned(),
        );
        let mut generator = Generator::new(files).unwrap();
        let entries = generator.ages().unwrap();

        let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(
            names,
            ["Age=1.1", "Age=V1_1", "Age=2.0", "Age=V2_0", "Age=10.0", "Age=V10_0"]
        );
        for pair in entries.windows(2) {
            let earlier = crate::codepoints::Codepoints::from(&pair[0].codepoints);
            let later = crate::codepoints::Codepoints::from(&pair[1].codepoints);
            assert!(earlier.iter().all(|cp| later.contains(cp)));
        }
        assert_eq!(lookup(&entries, "Age=10.0"), "48..57,65,97");
    }

    #[test]
    fn undeclared_age_is_fatal() {
        let mut generator =
            Generator::new(source(&[(ucd::DERIVED_AGE, "0041 ; 3.0\n")])).unwrap();
        assert!(matches!(
            generator.ages(),
            Err(Error::Alias(AliasError::UnknownValue { property, .. })) if property == "age"
        ));
    }

    #[test]
    fn scripts_emit_every_spelling() {
        let mut generator = Generator::new(source(&[(
            ucd::SCRIPTS,
            "0041..005A ; Latin\n0370 ; Greek\n0061..007A ; Latin\n",
        )]))
        .unwrap();
        let entries = generator.scripts().unwrap();

        let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["Script=Latn", "Script=Latin", "Script=Grek", "Script=Greek"]);
        assert_eq!(lookup(&entries, "Script=Latn"), "65..90,97..122");
    }

    #[test]
    fn core_properties_cross_spellings() {
        let mut generator = Generator::new(source(&[(
            ucd::DERIVED_CORE_PROPERTIES,
            "0041..005A ; Uppercase # L&\n0915 ; InCB; Consonant # Lo\n",
        )]))
        .unwrap();
        let entries = generator.core_properties().unwrap();

        assert_eq!(entries.len(), 8);
        assert_eq!(lookup(&entries, "Upper=Y"), "65..90");
        assert_eq!(lookup(&entries, "Uppercase=True"), "65..90");
        assert!(entries.iter().all(|entry| !entry.name.starts_with("InCB")));
    }

    #[test]
    fn unknown_core_property_is_fatal() {
        let mut generator = Generator::new(source(&[(
            ucd::DERIVED_CORE_PROPERTIES,
            "0041 ; Math\n",
        )]))
        .unwrap();
        assert!(matches!(
            generator.core_properties(),
            Err(Error::Alias(AliasError::UnknownProperty(name))) if name == "Math"
        ));
    }

    #[test]
    fn run_orders_derivations_and_reports_missing_files() {
        let mut generator = Generator::new(source(&[
            (ucd::DERIVED_GENERAL_CATEGORY, "0041 ; Lu\n"),
            (ucd::DERIVED_AGE, "0041 ; 1.1\n"),
            (ucd::SCRIPTS, "0041 ; Latin\n"),
            (ucd::DERIVED_CORE_PROPERTIES, "0041 ; Uppercase\n"),
        ]))
        .unwrap();
        let entries = generator.run().unwrap();
        let first_of = |prefix: &str| {
            entries
                .iter()
                .position(|entry| entry.name.starts_with(prefix))
                .unwrap()
        };
        assert!(first_of("General_Category=") < first_of("Age="));
        assert!(first_of("Age=") < first_of("Script="));
        assert!(first_of("Script=") < first_of("Upper"));

        let mut generator = Generator::new(source(&[])).unwrap();
        assert!(matches!(
            generator.run(),
            Err(Error::MissingSource { file }) if file == ucd::DERIVED_GENERAL_CATEGORY
        ));
    }
}
