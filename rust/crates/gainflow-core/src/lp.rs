use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use log::trace;

use crate::formulation::Formulation;
use crate::GainFlowError;

#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub objective: f64,
    /// Primal values indexed like `Formulation::variables`.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    Optimal(LpSolution),
    Infeasible,
    Unbounded,
}

/// A linear-programming backend able to maximise a [`Formulation`].
///
/// Implementations must be silent and must report backend failures through
/// `GainFlowError::Solver` rather than panicking. A backend instance is only
/// ever used for one solve at a time; implementations holding global solver
/// state must not be shared across threads.
pub trait LpBackend {
    fn name(&self) -> &'static str;

    fn solve(&self, formulation: &Formulation) -> Result<LpOutcome, GainFlowError>;
}

/// Pure-Rust simplex backend through `good_lp`'s microlp solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl LpBackend for MicroLpBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, formulation: &Formulation) -> Result<LpOutcome, GainFlowError> {
        let mut vars = ProblemVariables::new();
        let columns: Vec<Variable> = formulation
            .variables
            .iter()
            .map(|bounds| vars.add(variable().min(bounds.lower).max(bounds.upper)))
            .collect();

        let objective = linear_expression(&formulation.objective, &columns);
        let mut model = vars.maximise(objective).using(microlp);
        for row in &formulation.constraints {
            let lhs = linear_expression(&row.terms, &columns);
            model = model.with(constraint::eq(lhs, row.rhs));
        }

        trace!(
            "submitting lp to {}: {} columns, {} rows",
            self.name(),
            columns.len(),
            formulation.constraints.len()
        );

        match model.solve() {
            Ok(solution) => {
                let values: Vec<f64> = columns.iter().map(|&col| solution.value(col)).collect();
                let objective = formulation.evaluate_objective(&values)?;
                Ok(LpOutcome::Optimal(LpSolution { objective, values }))
            }
            Err(ResolutionError::Infeasible) => Ok(LpOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(LpOutcome::Unbounded),
            Err(other) => Err(GainFlowError::Solver(other.to_string())),
        }
    }
}

fn linear_expression(terms: &[(usize, f64)], columns: &[Variable]) -> Expression {
    terms
        .iter()
        .map(|&(col, coef)| coef * columns[col])
        .sum::<Expression>()
}
