use std::collections::HashMap;

use crate::GainFlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Directed edge whose flow is multiplied by `gain` on the way from `tail`
/// to `head`. `capacity` bounds the flow launched at `tail`.
#[derive(Debug, Clone, PartialEq)]
pub struct GainEdge {
    pub tail: NodeId,
    pub head: NodeId,
    pub capacity: f64,
    pub gain: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GainGraph {
    edges: Vec<GainEdge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    by_endpoints: HashMap<(NodeId, NodeId), EdgeId>,
}

impl GainGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            outgoing: vec![Vec::new(); node_count],
            incoming: vec![Vec::new(); node_count],
            by_endpoints: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_node(&mut self) -> NodeId {
        let node_id = NodeId(self.outgoing.len());
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        node_id
    }

    pub fn add_edge(
        &mut self,
        tail: NodeId,
        head: NodeId,
        capacity: f64,
        gain: f64,
    ) -> Result<EdgeId, GainFlowError> {
        if tail.0 >= self.node_count() || head.0 >= self.node_count() {
            return Err(GainFlowError::InvalidParameter(format!(
                "edge endpoint outside node range: {} -> {} with {} nodes",
                tail.0,
                head.0,
                self.node_count()
            )));
        }
        if !(capacity.is_finite() && capacity >= 0.0) {
            return Err(GainFlowError::InvalidParameter(format!(
                "capacity must be finite and non-negative, got {capacity}"
            )));
        }
        if !(gain.is_finite() && gain > 0.0) {
            return Err(GainFlowError::InvalidParameter(format!(
                "gain must be finite and positive, got {gain}"
            )));
        }
        if self.by_endpoints.contains_key(&(tail, head)) {
            return Err(GainFlowError::DuplicateEdge {
                from: tail.0,
                to: head.0,
            });
        }
        let edge_id = EdgeId(self.edges.len());
        self.edges.push(GainEdge {
            tail,
            head,
            capacity,
            gain,
        });
        self.outgoing[tail.0].push(edge_id);
        self.incoming[head.0].push(edge_id);
        self.by_endpoints.insert((tail, head), edge_id);
        Ok(edge_id)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&GainEdge> {
        self.edges.get(edge.0)
    }

    pub fn find_edge(&self, tail: NodeId, head: NodeId) -> Option<EdgeId> {
        self.by_endpoints.get(&(tail, head)).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &GainEdge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(idx, edge)| (EdgeId(idx), edge))
    }

    /// Edges leaving `node`, in insertion order.
    pub fn outgoing_edges(
        &self,
        node: NodeId,
    ) -> Result<impl Iterator<Item = EdgeId> + '_, GainFlowError> {
        self.outgoing
            .get(node.0)
            .map(|edges| edges.iter().copied())
            .ok_or_else(|| GainFlowError::InvalidParameter("node id out of range".to_string()))
    }

    /// Edges entering `node`, in insertion order.
    pub fn incoming_edges(
        &self,
        node: NodeId,
    ) -> Result<impl Iterator<Item = EdgeId> + '_, GainFlowError> {
        self.incoming
            .get(node.0)
            .map(|edges| edges.iter().copied())
            .ok_or_else(|| GainFlowError::InvalidParameter("node id out of range".to_string()))
    }

    pub fn set_capacity(&mut self, edge: EdgeId, capacity: f64) -> Result<(), GainFlowError> {
        if !(capacity.is_finite() && capacity >= 0.0) {
            return Err(GainFlowError::InvalidParameter(format!(
                "capacity must be finite and non-negative, got {capacity}"
            )));
        }
        let slot = self
            .edges
            .get_mut(edge.0)
            .ok_or_else(|| GainFlowError::InvalidParameter("edge id out of range".to_string()))?;
        slot.capacity = capacity;
        Ok(())
    }

    pub fn set_gain(&mut self, edge: EdgeId, gain: f64) -> Result<(), GainFlowError> {
        if !(gain.is_finite() && gain > 0.0) {
            return Err(GainFlowError::InvalidParameter(format!(
                "gain must be finite and positive, got {gain}"
            )));
        }
        let slot = self
            .edges
            .get_mut(edge.0)
            .ok_or_else(|| GainFlowError::InvalidParameter("edge id out of range".to_string()))?;
        slot.gain = gain;
        Ok(())
    }

    /// Largest capacity times the larger of one and the edge gain; the scale
    /// against which flow tolerances are measured.
    pub fn magnitude(&self) -> f64 {
        self.edges
            .iter()
            .map(|edge| edge.capacity * edge.gain.max(1.0))
            .fold(0.0_f64, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_follows_insertion_order() {
        let mut graph = GainGraph::new(3);
        let a = graph.add_edge(NodeId(0), NodeId(2), 1.0, 0.5).unwrap();
        let b = graph.add_edge(NodeId(1), NodeId(2), 2.0, 0.5).unwrap();
        let c = graph.add_edge(NodeId(0), NodeId(1), 3.0, 0.5).unwrap();

        let into_2: Vec<_> = graph.incoming_edges(NodeId(2)).unwrap().collect();
        let from_0: Vec<_> = graph.outgoing_edges(NodeId(0)).unwrap().collect();
        assert_eq!(into_2, vec![a, b]);
        assert_eq!(from_0, vec![a, c]);
        assert_eq!(graph.find_edge(NodeId(1), NodeId(2)), Some(b));
        assert_eq!(graph.find_edge(NodeId(2), NodeId(1)), None);
    }

    #[test]
    fn reverse_direction_is_not_a_duplicate() {
        let mut graph = GainGraph::new(2);
        graph.add_edge(NodeId(0), NodeId(1), 1.0, 1.0).unwrap();
        assert!(graph.add_edge(NodeId(1), NodeId(0), 1.0, 1.0).is_ok());
        assert_eq!(
            graph.add_edge(NodeId(0), NodeId(1), 2.0, 0.3),
            Err(GainFlowError::DuplicateEdge { from: 0, to: 1 })
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn rejects_bad_parameters_without_mutating() {
        let mut graph = GainGraph::new(2);
        assert!(graph.add_edge(NodeId(0), NodeId(1), -1.0, 1.0).is_err());
        assert!(graph.add_edge(NodeId(0), NodeId(1), 1.0, 0.0).is_err());
        assert!(graph.add_edge(NodeId(0), NodeId(1), 1.0, -0.5).is_err());
        assert!(graph.add_edge(NodeId(0), NodeId(1), f64::INFINITY, 1.0).is_err());
        assert!(graph.add_edge(NodeId(0), NodeId(1), 1.0, f64::NAN).is_err());
        assert!(graph.add_edge(NodeId(0), NodeId(5), 1.0, 1.0).is_err());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.add_edge(NodeId(0), NodeId(1), 0.0, 1.0).is_ok());
    }

    #[test]
    fn setters_validate_and_update() {
        let mut graph = GainGraph::new(2);
        let e = graph.add_edge(NodeId(0), NodeId(1), 1.0, 0.5).unwrap();
        graph.set_capacity(e, 4.0).unwrap();
        graph.set_gain(e, 2.0).unwrap();
        assert_eq!(graph.edge(e).unwrap().capacity, 4.0);
        assert_eq!(graph.edge(e).unwrap().gain, 2.0);
        assert_eq!(graph.magnitude(), 8.0);
        assert!(graph.set_gain(e, 0.0).is_err());
        assert!(graph.set_capacity(EdgeId(7), 1.0).is_err());
    }

    #[test]
    fn add_node_extends_range() {
        let mut graph = GainGraph::new(1);
        let node = graph.add_node();
        assert_eq!(node, NodeId(1));
        assert!(graph.add_edge(NodeId(0), node, 1.0, 1.0).is_ok());
        assert!(graph.outgoing_edges(NodeId(2)).is_err());
    }
}
