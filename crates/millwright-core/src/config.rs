use serde::{Deserialize, Serialize};

/// Tunables for the balancing solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound on simplex pivots per component (both phases together).
    pub max_iterations: usize,
    /// Base pivot and feasibility tolerance, scaled per component by the
    /// conditioning hint.
    pub epsilon: f64,
    /// Solve components on the rayon pool. Ignored unless the `parallel`
    /// feature is enabled.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            epsilon: 1e-9,
            parallel: false,
        }
    }
}
