//! Property and property-value alias tables.
//!
//! Built once per run from `PropertyAliases.txt` and
//! `PropertyValueAliases.txt`, then only queried.

use crate::{
    error::{AliasError, Error, Result},
    ucd::records,
};
use indexmap::IndexMap;

/// The accepted spellings of one property value, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    pub spellings: Vec<String>,
    /// Trailing comment of the declaring line. For general categories this
    /// lists the subset abbreviations, e.g. `Ll | Lm | Lo | Lt | Lu`.
    pub comment: Option<String>,
    /// Line of `PropertyValueAliases.txt` declaring this set.
    pub line: usize,
}

impl AliasSet {
    pub fn contains(&self, spelling: &str) -> bool {
        self.spellings.iter().any(|s| s == spelling)
    }

    /// The first declared spelling, the short name in UCD files.
    pub fn abbreviation(&self) -> &str {
        self.spellings.first().map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    properties: Vec<Vec<String>>,
    values: IndexMap<String, Vec<AliasSet>>,
}

impl AliasResolver {
    /// Builds the resolver from the text of both alias files.
    ///
    /// ```
    /// use ucd_tables::alias::AliasResolver;
    ///
    /// let aliases = AliasResolver::parse(
    ///     "Upper ; Uppercase\n",
    ///     "Upper ; N ; No ; F ; False\nUpper ; Y ; Yes ; T ; True\n",
    /// )
    /// .unwrap();
    /// assert_eq!(aliases.resolve_boolean_property_value_key("Uppercase").unwrap(), "Upper");
    /// assert_eq!(aliases.find_value_group("Upper", "T").unwrap().spellings, ["Y", "Yes", "T", "True"]);
    /// ```
    pub fn parse(property_aliases: &str, value_aliases: &str) -> Result<Self> {
        let mut resolver = Self::default();

        for (_, _, record) in records(property_aliases) {
            let mut group: Vec<String> = Vec::with_capacity(record.fields.len());
            for field in record.fields.iter().filter(|field| !field.is_empty()) {
                if !group.iter().any(|name| name == field) {
                    group.push((*field).to_owned());
                }
            }
            resolver.properties.push(group);
        }

        for (line_no, line, record) in records(value_aliases) {
            let [key, rest @ ..] = record.fields.as_slice() else {
                continue;
            };
            let spellings: Vec<String> = rest
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| (*s).to_owned())
                .collect();
            if spellings.is_empty() || key.is_empty() {
                return Err(Error::source_format(
                    crate::ucd::PROPERTY_VALUE_ALIASES,
                    line_no,
                    line,
                    "expected `<property> ; <value> [; <alias>...]`",
                ));
            }
            resolver
                .values
                .entry((*key).to_owned())
                .or_default()
                .push(AliasSet {
                    spellings,
                    comment: record.comment.map(str::to_owned),
                    line: line_no,
                });
        }

        log::debug!(
            "{} property groups, {} value groups",
            resolver.properties.len(),
            resolver.values.len()
        );
        Ok(resolver)
    }

    /// Returns every spelling of the property named `raw_name`.
    pub fn find_property_group(&self, raw_name: &str) -> Result<&[String], AliasError> {
        self.properties
            .iter()
            .find(|group| group.iter().any(|name| name == raw_name))
            .map(Vec::as_slice)
            .ok_or_else(|| AliasError::UnknownProperty(raw_name.to_owned()))
    }

    /// Returns the alias-set of `property_key` containing `raw_value`.
    pub fn find_value_group(
        &self,
        property_key: &str,
        raw_value: &str,
    ) -> Result<&AliasSet, AliasError> {
        self.value_groups(property_key)
            .iter()
            .find(|set| set.contains(raw_value))
            .ok_or_else(|| AliasError::UnknownValue {
                property: property_key.to_owned(),
                value: raw_value.to_owned(),
            })
    }

    /// All alias-sets declared for `property_key`, in declaration order.
    pub fn value_groups(&self, property_key: &str) -> &[AliasSet] {
        self.values
            .get(property_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Finds the value alias key under which the boolean property
    /// `property_raw_name` declares its `True`/`False` spellings.
    ///
    /// Exactly one spelling of the property must be used as a value alias
    /// key.
    pub fn resolve_boolean_property_value_key(
        &self,
        property_raw_name: &str,
    ) -> Result<&str, AliasError> {
        let group = self.find_property_group(property_raw_name)?;
        let candidates: Vec<&str> = group
            .iter()
            .filter_map(|name| self.values.get_key_value(name.as_str()))
            .map(|(key, _)| key.as_str())
            .collect();
        match candidates.as_slice() {
            [key] => Ok(*key),
            _ => Err(AliasError::AmbiguousValueKey {
                property: property_raw_name.to_owned(),
                candidates: candidates.iter().map(|s| (*s).to_owned()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PROPERTY_ALIASES: &str = "\
# PropertyAliases-16.0.0.txt

# ================================================
# Catalog Properties
# ================================================

age                      ; Age
blk                      ; Block
sc                       ; Script

# ================================================
# Binary Properties
# ================================================

Alpha                    ; Alphabetic
Upper                    ; Uppercase
gc                       ; General_Category
XIDS                     ; XID_Start
";

    const VALUE_ALIASES: &str = "\
# Age (age)

age; 1.1                              ; V1_1
age; 2.0                              ; V2_0
age; NA                               ; Unassigned

# Alphabetic (Alpha)

Alpha; N                              ; No                               ; F                                ; False
Alpha; Y                              ; Yes                              ; T                                ; True

# General_Category (gc)

gc ; L                                ; Letter                           # Ll | Lm | Lo | Lt | Lu
gc ; Lu                               ; Uppercase_Letter
gc ; P                                ; Punctuation                      ; punct                            # Pc | Pd | Pe | Pf | Pi | Po | Ps

# Script (sc)

sc ; Latn                             ; Latin
";

    fn resolver() -> AliasResolver {
        AliasResolver::parse(PROPERTY_ALIASES, VALUE_ALIASES).unwrap()
    }

    #[test]
    fn property_groups() {
        let aliases = resolver();
        assert_eq!(aliases.find_property_group("Uppercase").unwrap(), ["Upper", "Uppercase"]);
        assert_eq!(aliases.find_property_group("sc").unwrap(), ["sc", "Script"]);
        assert_eq!(
            aliases.find_property_group("Emoji"),
            Err(AliasError::UnknownProperty("Emoji".into()))
        );
    }

    #[test]
    fn value_groups_keep_order_and_comments() {
        let aliases = resolver();
        let letter = aliases.find_value_group("gc", "Letter").unwrap();
        assert_eq!(letter.abbreviation(), "L");
        assert_eq!(letter.comment.as_deref(), Some("Ll | Lm | Lo | Lt | Lu"));
        assert_eq!(letter.line, 14);

        let punct = aliases.find_value_group("gc", "punct").unwrap();
        assert_eq!(punct.spellings, ["P", "Punctuation", "punct"]);

        assert_eq!(
            aliases
                .value_groups("age")
                .iter()
                .map(AliasSet::abbreviation)
                .collect::<Vec<_>>(),
            ["1.1", "2.0", "NA"]
        );
        assert!(matches!(
            aliases.find_value_group("sc", "Greek"),
            Err(AliasError::UnknownValue { .. })
        ));
    }

    #[test]
    fn boolean_value_key() {
        let aliases = resolver();
        assert_eq!(aliases.resolve_boolean_property_value_key("Alphabetic").unwrap(), "Alpha");
        assert_eq!(
            aliases.find_value_group("Alpha", "True").unwrap().spellings,
            ["Y", "Yes", "T", "True"]
        );
    }

    #[test]
    fn boolean_value_key_requires_exactly_one_match() {
        let aliases = resolver();
        assert_eq!(
            aliases.resolve_boolean_property_value_key("XID_Start"),
            Err(AliasError::AmbiguousValueKey {
                property: "XID_Start".into(),
                candidates: vec![],
            })
        );

        let doubled = AliasResolver::parse(
            "Upper ; Uppercase\n",
            "Upper ; Y ; Yes\nUppercase ; Y ; Yes\n",
        )
        .unwrap();
        assert!(matches!(
            doubled.resolve_boolean_property_value_key("Upper"),
            Err(AliasError::AmbiguousValueKey { candidates, .. }) if candidates.len() == 2
        ));
    }

    #[test]
    fn value_line_without_spelling_is_rejected() {
        assert!(matches!(
            AliasResolver::parse("", "gc ; \n"),
            Err(Error::SourceFormat { line: 1, .. })
        ));
    }
}
