//! Cost-model knobs not fixed by the base-cost table (§4.5, §9).

/// Tunables for rules the base cost table leaves to the caller.
#[derive(Copy, Clone, Debug)]
pub struct CostConfig {
    /// Added to a field select's base cost of 1 when it's a presence test
    /// (`has(e.f)`). Defaults to 1, per the resolved preference for this
    /// otherwise-unspecified case.
    pub presence_test_cost: u64,
}

impl Default for CostConfig {
    fn default() -> Self {
        CostConfig { presence_test_cost: 1 }
    }
}
