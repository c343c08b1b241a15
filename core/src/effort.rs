//! Effort estimator: feature counts × catalog averages.

use crate::{
    size_catalog::{SizeCatalog, SizeClass},
    types::SprintPoints,
};
use serde::{Deserialize, Serialize};

/// Number of backlog features in each size class.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureCounts {
    #[serde(default)]
    pub xs: u32,
    #[serde(default)]
    pub s:  u32,
    #[serde(default)]
    pub m:  u32,
    #[serde(default)]
    pub l:  u32,
}

impl FeatureCounts {
    pub fn new(xs: u32, s: u32, m: u32, l: u32) -> Self {
        Self { xs, s, m, l }
    }

    pub fn get(&self, size: SizeClass) -> u32 {
        match size {
            SizeClass::Xs => self.xs,
            SizeClass::S  => self.s,
            SizeClass::M  => self.m,
            SizeClass::L  => self.l,
        }
    }

    pub fn total_features(&self) -> u64 {
        SizeClass::ALL.iter().map(|s| u64::from(self.get(*s))).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_features() == 0
    }
}

/// Effort contributed by one size class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffortShare {
    pub size:   SizeClass,
    pub count:  u32,
    pub effort: SprintPoints,
}

/// Σ count × average. No rounding is applied here.
pub fn total_effort(counts: &FeatureCounts, catalog: &SizeCatalog) -> SprintPoints {
    SizeClass::ALL
        .iter()
        .map(|size| f64::from(counts.get(*size)) * catalog.average(*size))
        .sum()
}

/// Per-class effort, smallest class first. Classes with no features are
/// left out.
pub fn effort_breakdown(counts: &FeatureCounts, catalog: &SizeCatalog) -> Vec<EffortShare> {
    SizeClass::ALL
        .iter()
        .filter(|size| counts.get(**size) > 0)
        .map(|size| EffortShare {
            size:   *size,
            count:  counts.get(*size),
            effort: f64::from(counts.get(*size)) * catalog.average(*size),
        })
        .collect()
}
