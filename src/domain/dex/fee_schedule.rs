//! Caller-supplied DEX fee schedules and the fee resolution policy

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dex_registry::GENERIC_PLACEHOLDER_DEXES;

/// Keys that describe a fee generically instead of naming a DEX
pub const GENERIC_FEE_KEYS: [&str; 5] = ["Smart Contract", "default", "fee", "from_dex", "to_dex"];

/// Fallback fee in percent when a schedule names DEXs but omits the one asked for
pub const DEFAULT_FEE_PERCENT: f64 = 0.25;

/// Mapping of DEX identifier (or generic key) to fee percent.
///
/// A `BTreeMap` keeps key iteration deterministic, so the derived list of
/// available DEXs is stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeSchedule(BTreeMap<String, f64>);

impl FeeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dex: impl Into<String>, fee_percent: f64) {
        self.0.insert(dex.into(), fee_percent);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Resolve the fee percent charged by `dex`, in order of precedence:
    ///
    /// 1. exact identifier match
    /// 2. a generic key (`Smart Contract`, `default`, `fee`)
    /// 3. a single-entry schedule applies to both legs
    /// 4. the hard-coded default
    ///
    /// An empty schedule means the caller asked for a fee-free scenario.
    pub fn resolve_fee(&self, dex: &str) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        if let Some(fee) = self.0.get(dex) {
            return *fee;
        }
        for key in ["Smart Contract", "default", "fee"] {
            if let Some(fee) = self.0.get(key) {
                return *fee;
            }
        }
        if self.0.len() == 1 {
            return self.0.values().next().copied().unwrap_or(DEFAULT_FEE_PERCENT);
        }
        DEFAULT_FEE_PERCENT
    }

    /// DEX identifiers named by this schedule, excluding generic keys.
    /// A schedule holding only a generic `Smart Contract` fee denotes two
    /// indistinguishable placeholder venues.
    pub fn available_dexes(&self) -> Vec<String> {
        let named: Vec<String> = self
            .0
            .keys()
            .filter(|key| !GENERIC_FEE_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();

        if named.is_empty() && self.0.contains_key("Smart Contract") {
            return GENERIC_PLACEHOLDER_DEXES
                .iter()
                .map(|dex| dex.to_string())
                .collect();
        }
        named
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeeSchedule {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
