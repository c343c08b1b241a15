//! T-shirt size catalog: size class → sprint-effort range and average.
//!
//! RULE: The catalog is built once (from config) and never mutated.
//! Changing it changes every downstream estimate.

use crate::{
    error::{PlanError, PlanResult},
    types::SprintPoints,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Xs,
    S,
    M,
    L,
}

impl SizeClass {
    /// Smallest to largest.
    pub const ALL: [SizeClass; 4] = [SizeClass::Xs, SizeClass::S, SizeClass::M, SizeClass::L];

    pub fn label(&self) -> &'static str {
        match self {
            SizeClass::Xs => "XS",
            SizeClass::S  => "S",
            SizeClass::M  => "M",
            SizeClass::L  => "L",
        }
    }

    fn index(&self) -> usize {
        match self {
            SizeClass::Xs => 0,
            SizeClass::S  => 1,
            SizeClass::M  => 2,
            SizeClass::L  => 3,
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SizeDefinition {
    pub size:    SizeClass,
    pub min:     SprintPoints,
    pub max:     SprintPoints,
    /// Representative midpoint used for estimation.
    pub average: SprintPoints,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeCatalog {
    entries: [SizeDefinition; 4],
}

impl SizeCatalog {
    /// Build from an unordered list. Every class must appear exactly once
    /// and each average must sit inside its own range.
    pub fn from_definitions(definitions: Vec<SizeDefinition>) -> PlanResult<Self> {
        let mut slots: [Option<SizeDefinition>; 4] = [None; 4];
        for def in definitions {
            if !(def.min >= 0.0 && def.min <= def.average && def.average <= def.max) {
                return Err(PlanError::InvalidConfig(format!(
                    "size {}: expected 0 <= min <= average <= max, got {}/{}/{}",
                    def.size, def.min, def.average, def.max
                )));
            }
            let slot = &mut slots[def.size.index()];
            if slot.is_some() {
                return Err(PlanError::InvalidConfig(format!(
                    "size {} defined more than once",
                    def.size
                )));
            }
            *slot = Some(def);
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for size in SizeClass::ALL {
            ordered.push(slots[size.index()].ok_or_else(|| {
                PlanError::InvalidConfig(format!("size {size} missing from catalog"))
            })?);
        }
        let entries: [SizeDefinition; 4] = ordered
            .try_into()
            .map_err(|_| PlanError::InvalidConfig("size catalog must have 4 classes".into()))?;
        Ok(Self { entries })
    }

    /// The built-in table.
    pub fn standard() -> Self {
        let def = |size, min, max, average| SizeDefinition { size, min, max, average };
        Self {
            entries: [
                def(SizeClass::Xs, 1.0, 1.0, 1.0),
                def(SizeClass::S, 2.0, 4.0, 3.0),
                def(SizeClass::M, 4.0, 12.0, 8.0),
                def(SizeClass::L, 12.0, 24.0, 18.0),
            ],
        }
    }

    pub fn get(&self, size: SizeClass) -> &SizeDefinition {
        &self.entries[size.index()]
    }

    pub fn average(&self, size: SizeClass) -> SprintPoints {
        self.get(size).average
    }

    /// Definitions in size order.
    pub fn iter(&self) -> impl Iterator<Item = &SizeDefinition> {
        self.entries.iter()
    }
}

impl Default for SizeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
