use crate::graph::{EdgeId, GainGraph, NodeId};
use crate::GainFlowError;

/// Coordinate-format sparse matrix.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    pub rows: usize,
    pub cols: usize,
    pub row_indices: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_indices: Vec::new(),
            col_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.row_indices.push(row);
        self.col_indices.push(col);
        self.values.push(value);
    }

    /// Entries grouped by row as `(col, value)`, preserving insertion order.
    pub fn row_entries(&self) -> Vec<Vec<(usize, f64)>> {
        let mut grouped = vec![Vec::new(); self.rows];
        for ((&row, &col), &value) in self
            .row_indices
            .iter()
            .zip(self.col_indices.iter())
            .zip(self.values.iter())
        {
            grouped[row].push((col, value));
        }
        grouped
    }

    /// `A x`, with `x` indexed by column.
    pub fn multiply(&self, x: &[f64]) -> Result<Vec<f64>, GainFlowError> {
        if x.len() != self.cols {
            return Err(GainFlowError::InvalidParameter(format!(
                "vector of length {} for a matrix with {} columns",
                x.len(),
                self.cols
            )));
        }
        let mut out = vec![0.0; self.rows];
        for ((&row, &col), &value) in self
            .row_indices
            .iter()
            .zip(self.col_indices.iter())
            .zip(self.values.iter())
        {
            out[row] += value * x[col];
        }
        Ok(out)
    }
}

/// Generalized incidence matrix: column `e` holds `-1` at the tail of `e`
/// and `+gain(e)` at its head, so row `u` of `A x` is the gained inflow minus
/// the outflow at `u`.
pub fn gain_incidence_matrix(graph: &GainGraph) -> SparseMatrix {
    let mut matrix = SparseMatrix::new(graph.node_count(), graph.edge_count());
    for (edge_id, edge) in graph.edges() {
        push_incidence_entry(&mut matrix, edge.tail, edge_id, -1.0);
        push_incidence_entry(&mut matrix, edge.head, edge_id, edge.gain);
    }
    matrix
}

fn push_incidence_entry(matrix: &mut SparseMatrix, node: NodeId, edge: EdgeId, value: f64) {
    matrix.push(node.0, edge.0, value);
}
