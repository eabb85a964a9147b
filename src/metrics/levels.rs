//! Stratification of metrics by sample, library, and read group.

use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use super::results::DerivedMetrics;
use crate::errors::Error;

/// The level at which metrics were accumulated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricAccumulationLevel {
    /// Every read in the experiment.
    #[default]
    AllReads,

    /// Reads from one sample.
    Sample,

    /// Reads from one library of a sample.
    Library,

    /// Reads from one read group of a library.
    ReadGroup,
}

/// Identifies one stratum of an experiment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LevelKey {
    /// The level of accumulation.
    #[serde(default, rename = "ACCUMULATION_LEVEL")]
    pub level: MetricAccumulationLevel,

    /// The sample, for sample level and below.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,

    /// The library, for library level and below.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,

    /// The read group, for read group level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_group: Option<String>,
}

impl LevelKey {
    /// The key for metrics over all reads.
    pub fn all_reads() -> Self {
        Self::default()
    }

    /// The key for metrics over one sample.
    pub fn sample(sample: impl Into<String>) -> Self {
        Self {
            level: MetricAccumulationLevel::Sample,
            sample: Some(sample.into()),
            ..Default::default()
        }
    }

    /// The key for metrics over one library.
    pub fn library(sample: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            level: MetricAccumulationLevel::Library,
            sample: Some(sample.into()),
            library: Some(library.into()),
            ..Default::default()
        }
    }

    /// The key for metrics over one read group.
    pub fn read_group(
        sample: impl Into<String>,
        library: impl Into<String>,
        read_group: impl Into<String>,
    ) -> Self {
        Self {
            level: MetricAccumulationLevel::ReadGroup,
            sample: Some(sample.into()),
            library: Some(library.into()),
            read_group: Some(read_group.into()),
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            ("SAMPLE", &self.sample),
            ("LIBRARY", &self.library),
            ("READ_GROUP", &self.read_group),
        ]
        .into_iter()
        .filter_map(|(label, name)| name.as_ref().map(|name| format!("{}={}", label, name)))
        .join(" ");

        match names.is_empty() {
            true => f.write_str("ALL_READS"),
            false => f.write_str(&names),
        }
    }
}

/// Derived metrics for every stratum of an experiment, in the order the
/// strata were given. Serializes as a list of flat records, each carrying
/// its level columns.
#[derive(Clone, Debug, Default)]
pub struct StratifiedMetrics {
    levels: IndexMap<LevelKey, DerivedMetrics>,
}

impl StratifiedMetrics {
    /// Adds the metrics for a stratum, refusing to replace one that exists.
    pub(crate) fn insert(&mut self, key: LevelKey, metrics: DerivedMetrics) -> Result<(), Error> {
        if self.levels.contains_key(&key) {
            return Err(Error::DuplicateLevel {
                level: key.to_string(),
            });
        }

        self.levels.insert(key, metrics);
        Ok(())
    }

    /// The metrics for one stratum.
    pub fn get(&self, key: &LevelKey) -> Option<&DerivedMetrics> {
        self.levels.get(key)
    }

    /// The metrics over all reads, if they were derived.
    pub fn all_reads(&self) -> Option<&DerivedMetrics> {
        self.get(&LevelKey::all_reads())
    }

    /// Iterates over every stratum in order.
    pub fn iter(&self) -> impl Iterator<Item = (&LevelKey, &DerivedMetrics)> {
        self.levels.iter()
    }

    /// Number of strata.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether there are no strata.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    level: &'a LevelKey,
    #[serde(flatten)]
    metrics: &'a DerivedMetrics,
}

impl Serialize for StratifiedMetrics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.levels.len()))?;
        for (level, metrics) in &self.levels {
            seq.serialize_element(&Row { level, metrics })?;
        }
        seq.end()
    }
}
