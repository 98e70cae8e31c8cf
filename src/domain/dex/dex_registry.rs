//! DEX Registry for Aptos mainnet

/// Generic placeholder venue identifiers used when a caller supplies fees
/// without naming concrete DEXs. Two placeholders are indistinguishable, so
/// no artificial spread may be invented between them.
pub const GENERIC_PLACEHOLDER_DEXES: [&str; 2] = ["dex_a", "dex_b"];

/// DEX information
#[derive(Debug, Clone)]
pub struct DexInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    /// Trading fee in percent
    pub fee_percent: f64,
    /// Multiplicative price variation factor relative to the reference venue
    pub price_factor: f64,
    pub is_active: bool,
}

/// DEX Registry for Aptos mainnet
pub struct DexRegistry;

impl DexRegistry {
    /// Get all supported DEXes
    pub fn get_all_dexes() -> Vec<DexInfo> {
        vec![
            DexInfo {
                name: "pancakeswap",
                display_name: "PancakeSwap",
                fee_percent: 0.25,
                price_factor: 1.002,
                is_active: true,
            },
            DexInfo {
                name: "liquidswap",
                display_name: "LiquidSwap",
                fee_percent: 0.30,
                price_factor: 1.000,
                is_active: true,
            },
            DexInfo {
                name: "thalaswap",
                display_name: "ThalaSwap",
                fee_percent: 0.20,
                price_factor: 0.998,
                is_active: true,
            },
            DexInfo {
                name: "hippo",
                display_name: "Hippo",
                fee_percent: 0.30,
                price_factor: 1.001,
                is_active: true,
            },
        ]
    }

    /// Get DEX by identifier
    pub fn get_dex_by_name(name: &str) -> Option<DexInfo> {
        Self::get_all_dexes().into_iter().find(|dex| dex.name == name)
    }

    /// Price variation factor for a venue. Generic placeholders and unknown
    /// venues carry the neutral factor 1.0.
    pub fn price_factor(name: &str) -> f64 {
        Self::get_dex_by_name(name)
            .map(|dex| dex.price_factor)
            .unwrap_or(1.0)
    }

    /// Check if an identifier is a generic placeholder venue
    pub fn is_generic_placeholder(name: &str) -> bool {
        GENERIC_PLACEHOLDER_DEXES.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dex_lookup() {
        let dex = DexRegistry::get_dex_by_name("pancakeswap").unwrap();
        assert_eq!(dex.fee_percent, 0.25);
        assert_eq!(dex.price_factor, 1.002);
    }

    #[test]
    fn test_price_factor_defaults_to_neutral() {
        assert_eq!(DexRegistry::price_factor("liquidswap"), 1.000);
        assert_eq!(DexRegistry::price_factor("thalaswap"), 0.998);
        assert_eq!(DexRegistry::price_factor("dex_a"), 1.0);
        assert_eq!(DexRegistry::price_factor("unknown_venue"), 1.0);
    }

    #[test]
    fn test_generic_placeholder_detection() {
        assert!(DexRegistry::is_generic_placeholder("dex_a"));
        assert!(DexRegistry::is_generic_placeholder("dex_b"));
        assert!(!DexRegistry::is_generic_placeholder("pancakeswap"));
    }
}
