use log::debug;

use crate::formulation::build_formulation;
use crate::graph::matrix::gain_incidence_matrix;
use crate::graph::{EdgeId, GainGraph, NodeId};
use crate::lp::{LpBackend, LpOutcome};
use crate::numerics::scaled_tolerance;
use crate::GainFlowError;

/// Flow launched into each edge at its tail, indexed by `EdgeId`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAssignment {
    values: Vec<f64>,
}

impl FlowAssignment {
    pub fn zeros(edge_count: usize) -> Self {
        Self {
            values: vec![0.0; edge_count],
        }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn flow(&self, edge: EdgeId) -> Option<f64> {
        self.values.get(edge.0).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Gained inflow minus outflow at `node`.
    pub fn net_flow_at(&self, graph: &GainGraph, node: NodeId) -> Result<f64, GainFlowError> {
        self.check_len(graph)?;
        let inflow: f64 = graph
            .incoming_edges(node)?
            .map(|e| graph.edge(e).map_or(0.0, |edge| edge.gain) * self.values[e.0])
            .sum();
        let outflow: f64 = graph.outgoing_edges(node)?.map(|e| self.values[e.0]).sum();
        Ok(inflow - outflow)
    }

    /// Largest amount by which any edge leaves `[0, capacity]`.
    pub fn max_capacity_violation(&self, graph: &GainGraph) -> Result<f64, GainFlowError> {
        self.check_len(graph)?;
        Ok(graph
            .edges()
            .map(|(e, edge)| {
                let x = self.values[e.0];
                (-x).max(x - edge.capacity).max(0.0)
            })
            .fold(0.0_f64, f64::max))
    }

    /// Largest absolute imbalance over nodes other than `source` and `sink`.
    pub fn max_conservation_violation(
        &self,
        graph: &GainGraph,
        source: NodeId,
        sink: NodeId,
    ) -> Result<f64, GainFlowError> {
        self.check_len(graph)?;
        let balance = gain_incidence_matrix(graph).multiply(&self.values)?;
        Ok(balance
            .iter()
            .enumerate()
            .filter(|&(node, _)| node != source.0 && node != sink.0)
            .map(|(_, b)| b.abs())
            .fold(0.0_f64, f64::max))
    }

    /// Checks bounds and conservation within `epsilon`, scaled by the largest
    /// edge magnitude in `graph`.
    pub fn verify(
        &self,
        graph: &GainGraph,
        source: NodeId,
        sink: NodeId,
        epsilon: f64,
    ) -> Result<(), GainFlowError> {
        let tolerance = scaled_tolerance(epsilon, graph.magnitude());
        let capacity = self.max_capacity_violation(graph)?;
        if capacity > tolerance {
            return Err(GainFlowError::Logic(format!(
                "flow violates capacity bounds by {capacity:e}"
            )));
        }
        let conservation = self.max_conservation_violation(graph, source, sink)?;
        if conservation > tolerance {
            return Err(GainFlowError::Logic(format!(
                "flow violates conservation by {conservation:e}"
            )));
        }
        Ok(())
    }

    fn check_len(&self, graph: &GainGraph) -> Result<(), GainFlowError> {
        if self.values.len() != graph.edge_count() {
            return Err(GainFlowError::InvalidParameter(format!(
                "flow assignment has {} entries for {} edges",
                self.values.len(),
                graph.edge_count()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizedFlow {
    /// Net gained flow delivered at the sink.
    pub value: f64,
    pub assignment: FlowAssignment,
}

/// Maximum generalized flow from `source` to `sink`, computed by solving the
/// LP formulation with `backend`.
///
/// An unreachable sink is not an error: the optimum is simply zero.
/// Infeasibility surfaces as `GainFlowError::Infeasible`; an unbounded LP can
/// only come from an inconsistent backend and is reported as a logic error.
pub fn max_generalized_flow<B: LpBackend + ?Sized>(
    graph: &GainGraph,
    source: NodeId,
    sink: NodeId,
    backend: &B,
) -> Result<GeneralizedFlow, GainFlowError> {
    let formulation = build_formulation(graph, source, sink)?;
    if !formulation.has_objective() {
        debug!("sink {} has no incident edges, optimum is zero", sink.0);
        return Ok(GeneralizedFlow {
            value: 0.0,
            assignment: FlowAssignment::zeros(graph.edge_count()),
        });
    }

    match backend.solve(&formulation)? {
        LpOutcome::Optimal(solution) => {
            if solution.values.len() != formulation.variable_count() {
                return Err(GainFlowError::Logic(format!(
                    "{} returned {} values for {} variables",
                    backend.name(),
                    solution.values.len(),
                    formulation.variable_count()
                )));
            }
            if !solution.objective.is_finite() {
                return Err(GainFlowError::Logic(format!(
                    "{} returned a non-finite objective",
                    backend.name()
                )));
            }
            Ok(GeneralizedFlow {
                value: solution.objective,
                assignment: FlowAssignment::from_values(solution.values),
            })
        }
        LpOutcome::Infeasible => Err(GainFlowError::Infeasible),
        LpOutcome::Unbounded => Err(GainFlowError::Logic(format!(
            "{} reported an unbounded lp although every capacity is finite",
            backend.name()
        ))),
    }
}
