//! Checking a derived artifact against an [`Oracle`].

use crate::{
    artifact::Artifact,
    codepoints::Codepoints,
    error::{Error, Result},
    oracle::{pattern_for, Oracle, Property, Unsupported},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{fmt, str::FromStr};

/// Number of codepoints checked per entry by [`Mode::Sample`].
pub const SAMPLE_SIZE: usize = 50;

/// Which codepoints of each entry are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Only the first codepoint.
    #[default]
    First,
    /// [`SAMPLE_SIZE`] distinct codepoints chosen uniformly at random, or all
    /// of them for smaller entries.
    Sample,
    /// Every codepoint.
    Full,
}

impl Mode {
    /// Selects the codepoints to check, in the order they will be checked.
    pub fn select<'a, R: Rng + ?Sized>(
        self,
        codepoints: &'a Codepoints,
        rng: &mut R,
    ) -> Box<dyn Iterator<Item = u32> + 'a> {
        match self {
            Self::First => Box::new(codepoints.first().into_iter()),
            Self::Full => Box::new(codepoints.iter()),
            Self::Sample => {
                let len = usize::try_from(codepoints.len()).unwrap_or(usize::MAX);
                let picked = rand::seq::index::sample(rng, len, SAMPLE_SIZE.min(len));
                Box::new(
                    picked
                        .into_iter()
                        .filter_map(move |idx| codepoints.nth(idx as u64)),
                )
            }
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(Self::First),
            "sample" => Ok(Self::Sample),
            "full" => Ok(Self::Full),
            _ => Err(Error::Configuration(format!(
                "invalid mode {s:?}, expected first, sample or full"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Sample => "sample",
            Self::Full => "full",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateConfig {
    pub mode: Mode,
    /// Seed for [`Mode::Sample`]. Seeded from entropy when absent.
    pub seed: Option<u64>,
}

/// An entry the oracle could not check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub query: String,
    pub reason: Unsupported,
}

/// Outcome of a successful validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub entries_checked: usize,
    pub codepoints_tested: u64,
    pub skipped: Vec<Skipped>,
}

const SURROGATE_QUERIES: [&str; 2] = ["General_Category=Surrogate", "General_Category=Cs"];

/// The surrogate codepoints declared by the artifact itself.
pub fn surrogates(artifact: &Artifact) -> Codepoints {
    match SURROGATE_QUERIES.iter().find_map(|query| artifact.get(query)) {
        Some(codepoints) => codepoints.clone(),
        None => {
            log::warn!("artifact has no surrogate entry, no codepoint will be excluded");
            Codepoints::default()
        }
    }
}

pub struct Validator<O> {
    oracle: O,
    config: ValidateConfig,
}

impl<O: Oracle> Validator<O> {
    pub fn new(oracle: O, config: ValidateConfig) -> Self {
        Self { oracle, config }
    }

    /// Checks every entry of `artifact`, stopping at the first mismatch.
    ///
    /// Entries whose pattern the oracle cannot compile are skipped and listed
    /// in the [`Report`].
    pub fn validate(&self, artifact: &Artifact) -> Result<Report> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let surrogates = surrogates(artifact);
        let mut report = Report::default();

        for entry in artifact.entries() {
            let pattern = pattern_for(&entry.name);
            let property = match self.oracle.compile(&pattern) {
                Ok(property) => property,
                Err(reason) => {
                    log::warn!("skipping {}: {reason}", entry.name);
                    report.skipped.push(Skipped {
                        query: entry.name.clone(),
                        reason,
                    });
                    continue;
                }
            };

            log::info!("validating {} ({pattern})", entry.name);
            for cp in self.config.mode.select(&entry.codepoints, &mut rng) {
                if surrogates.contains(cp) {
                    continue;
                }
                let mismatch = || Error::ValidationMismatch {
                    query: entry.name.clone(),
                    codepoint: cp,
                };
                let ch = char::from_u32(cp).ok_or_else(mismatch)?;
                if !property.contains(ch) {
                    return Err(mismatch());
                }
                report.codepoints_tested += 1;
            }
            report.entries_checked += 1;
        }

        log::info!(
            "{} entries checked, {} codepoints tested, {} skipped",
            report.entries_checked,
            report.codepoints_tested,
            report.skipped.len()
        );
        Ok(report)
    }
}
