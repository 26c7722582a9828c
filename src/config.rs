//! Configuration management for the follow-graph miner

/// Default node budget for a crawl when the caller does not pass one
pub const DEFAULT_NODE_BUDGET: usize = 30;

/// Tunables for one pipeline invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of distinct identities the crawler visits
    pub node_budget: usize,

    /// Maximum number of adapter fetches in flight at once (1 = strict BFS)
    pub max_concurrency: usize,

    /// Probability the random walk follows an edge instead of teleporting
    pub damping: f64,

    /// Per-node convergence tolerance for the power iteration
    pub tolerance: f64,

    /// Iteration cap for the power iteration
    pub max_iterations: usize,

    /// Factor applied to centrality before it is handed to display code
    pub score_scale: f64,

    /// Length of the influencer ranking in the report
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_budget: DEFAULT_NODE_BUDGET,
            max_concurrency: 1,
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
            score_scale: 1000.0,
            top_n: 5,
        }
    }
}

impl Config {
    /// Create a configuration with a custom node budget and defaults elsewhere
    pub fn new(node_budget: usize) -> Self {
        Self {
            node_budget,
            ..Self::default()
        }
    }

    pub fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }

    /// Zero is treated as one; the crawler always makes progress.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}
