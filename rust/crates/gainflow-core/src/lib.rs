pub mod flow;
pub mod formulation;
pub mod generator;
pub mod graph;
pub mod lp;
pub mod numerics;

use thiserror::Error;

pub use flow::{max_generalized_flow, FlowAssignment, GeneralizedFlow};
pub use formulation::{build_formulation, Formulation};
pub use generator::{InstanceEdge, InstanceGenerator, InstanceRecord, Topology, TopologyEdge};
pub use graph::{EdgeId, GainEdge, GainGraph, NodeId};
pub use lp::{LpBackend, LpOutcome, LpSolution, MicroLpBackend};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GainFlowError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: usize, to: usize },
    #[error("source and sink must differ (both are node {node})")]
    InvalidTerminal { node: usize },
    #[error("linear program has no feasible flow")]
    Infeasible,
    #[error("lp backend failure: {0}")]
    Solver(String),
    #[error("internal consistency violation: {0}")]
    Logic(String),
}

impl GainFlowError {
    /// Only infeasibility may be answered by redrawing gains; everything else
    /// is either a caller error or fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GainFlowError::Infeasible)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub seed: u64,
    pub gain_low: f64,
    pub gain_high: f64,
    pub gain_decimals: Option<u32>,
    pub tolerance: f64,
    pub max_regenerations: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            seed: 722,
            gain_low: 0.001,
            gain_high: 1.0,
            gain_decimals: Some(3),
            tolerance: numerics::FLOW_EPSILON,
            max_regenerations: 0,
        }
    }
}

impl GeneratorOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GainFlowError> {
        if !self.gain_low.is_finite() || !self.gain_high.is_finite() {
            return Err(GainFlowError::InvalidParameter(
                "gain range must be finite".to_string(),
            ));
        }
        if self.gain_low <= 0.0 {
            return Err(GainFlowError::InvalidParameter(
                "gain range must be strictly positive".to_string(),
            ));
        }
        if self.gain_low >= self.gain_high {
            return Err(GainFlowError::InvalidParameter(
                "gain range lower bound must be below upper bound".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(GainFlowError::InvalidParameter(
                "tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
