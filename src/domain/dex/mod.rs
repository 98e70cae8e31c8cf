//! DEX domain - venue registry and fee schedules

pub mod dex_registry;
pub mod fee_schedule;

pub use dex_registry::{DexInfo, DexRegistry, GENERIC_PLACEHOLDER_DEXES};
pub use fee_schedule::{FeeSchedule, DEFAULT_FEE_PERCENT, GENERIC_FEE_KEYS};
