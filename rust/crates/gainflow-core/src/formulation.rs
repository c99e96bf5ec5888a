use log::debug;

use crate::graph::matrix::gain_incidence_matrix;
use crate::graph::{GainGraph, NodeId};
use crate::GainFlowError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    pub lower: f64,
    pub upper: f64,
}

/// `sum(coef * x[col]) == rhs` for one non-terminal node.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationConstraint {
    pub node: NodeId,
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

/// Maximization LP over one variable per edge. Variable `i` is the flow
/// launched into `EdgeId(i)` at its tail.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub source: NodeId,
    pub sink: NodeId,
    pub variables: Vec<VariableBounds>,
    pub objective: Vec<(usize, f64)>,
    pub constraints: Vec<ConservationConstraint>,
}

impl Formulation {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value at `values`, which must hold one entry per variable.
    pub fn evaluate_objective(&self, values: &[f64]) -> Result<f64, GainFlowError> {
        if values.len() != self.variables.len() {
            return Err(GainFlowError::InvalidParameter(format!(
                "objective evaluated at {} values for {} variables",
                values.len(),
                self.variables.len()
            )));
        }
        Ok(self
            .objective
            .iter()
            .map(|&(col, coef)| coef * values[col])
            .sum())
    }

    pub fn has_objective(&self) -> bool {
        !self.objective.is_empty()
    }
}

/// Builds the generalized max-flow LP for `graph` between `source` and `sink`:
/// capacities become variable bounds, every node other than the terminals gets
/// a gained-inflow-equals-outflow row, and the objective is the net gained
/// inflow at the sink.
pub fn build_formulation(
    graph: &GainGraph,
    source: NodeId,
    sink: NodeId,
) -> Result<Formulation, GainFlowError> {
    let n = graph.node_count();
    if source.0 >= n || sink.0 >= n {
        return Err(GainFlowError::InvalidParameter(format!(
            "terminal outside node range: source {} sink {} with {} nodes",
            source.0, sink.0, n
        )));
    }
    if source == sink {
        return Err(GainFlowError::InvalidTerminal { node: source.0 });
    }

    let variables = graph
        .edges()
        .map(|(_, edge)| VariableBounds {
            lower: 0.0,
            upper: edge.capacity,
        })
        .collect::<Vec<_>>();

    let mut rows = gain_incidence_matrix(graph).row_entries();
    let objective = merge_terms(std::mem::take(&mut rows[sink.0]));

    let mut constraints = Vec::new();
    for (node, entries) in rows.into_iter().enumerate() {
        if node == source.0 || node == sink.0 {
            continue;
        }
        let terms = merge_terms(entries);
        if terms.is_empty() {
            continue;
        }
        constraints.push(ConservationConstraint {
            node: NodeId(node),
            terms,
            rhs: 0.0,
        });
    }

    debug!(
        "built formulation: {} variables, {} conservation rows, {} objective terms",
        variables.len(),
        constraints.len(),
        objective.len()
    );

    Ok(Formulation {
        source,
        sink,
        variables,
        objective,
        constraints,
    })
}

// Self-loops put two entries for one column in the same row.
fn merge_terms(mut entries: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    entries.sort_by_key(|&(col, _)| col);
    let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
    for (col, value) in entries {
        match merged.last_mut() {
            Some((last, acc)) if *last == col => *acc += value,
            _ => merged.push((col, value)),
        }
    }
    merged.retain(|&(_, value)| value != 0.0);
    merged
}
