use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::flow::max_generalized_flow;
use crate::graph::{GainGraph, NodeId};
use crate::lp::{LpBackend, MicroLpBackend};
use crate::numerics::{approx_eq, round_to_decimals, scaled_tolerance};
use crate::{GainFlowError, GeneratorOptions};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyEdge {
    pub from: usize,
    pub to: usize,
    pub capacity: f64,
}

/// Edge list with capacities but no gains yet. Node 0 is the source and the
/// last node is the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub node_count: usize,
    pub edges: Vec<TopologyEdge>,
}

impl Topology {
    pub fn new(node_count: usize, edges: Vec<TopologyEdge>) -> Self {
        Self { node_count, edges }
    }

    pub fn from_triples(node_count: usize, triples: &[(usize, usize, f64)]) -> Self {
        let edges = triples
            .iter()
            .map(|&(from, to, capacity)| TopologyEdge { from, to, capacity })
            .collect();
        Self { node_count, edges }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn source(&self) -> NodeId {
        NodeId(0)
    }

    pub fn sink(&self) -> NodeId {
        NodeId(self.node_count.saturating_sub(1))
    }

    /// Builds the flow network with `gains[i]` on the `i`-th edge.
    pub fn with_gains(&self, gains: &[f64]) -> Result<GainGraph, GainFlowError> {
        if gains.len() != self.edges.len() {
            return Err(GainFlowError::InvalidParameter(format!(
                "{} gains for {} edges",
                gains.len(),
                self.edges.len()
            )));
        }
        let mut graph = GainGraph::new(self.node_count);
        for (edge, &gain) in self.edges.iter().zip(gains.iter()) {
            graph.add_edge(NodeId(edge.from), NodeId(edge.to), edge.capacity, gain)?;
        }
        Ok(graph)
    }

    fn check_terminals(&self) -> Result<(), GainFlowError> {
        match self.node_count {
            0 => Err(GainFlowError::InvalidParameter(
                "topology has no nodes".to_string(),
            )),
            1 => Err(GainFlowError::InvalidTerminal { node: 0 }),
            _ => Ok(()),
        }
    }
}

/// Seeded stream of edge gains drawn uniformly from `[low, high)`.
#[derive(Debug, Clone)]
pub struct GainSampler {
    rng: StdRng,
    low: f64,
    high: f64,
    decimals: Option<u32>,
}

impl GainSampler {
    pub fn new(options: &GeneratorOptions) -> Self {
        Self {
            rng: StdRng::seed_from_u64(options.seed),
            low: options.gain_low,
            high: options.gain_high,
            decimals: options.gain_decimals,
        }
    }

    pub fn sample(&mut self) -> f64 {
        let gain = self.rng.gen_range(self.low..self.high);
        match self.decimals {
            // Rounding may not produce a zero gain.
            Some(decimals) => {
                let step = 1.0 / 10_f64.powi(decimals as i32);
                round_to_decimals(gain, decimals).max(step)
            }
            None => gain,
        }
    }

    pub fn sample_many(&mut self, count: usize) -> Vec<f64> {
        (0..count).map(|_| self.sample()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceEdge {
    pub from: usize,
    pub to: usize,
    pub lower_bound: f64,
    pub capacity: f64,
    pub gain: f64,
}

/// A generated network together with its verified optimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceRecord {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub optimal_value: f64,
    pub edges: Vec<InstanceEdge>,
}

impl InstanceRecord {
    pub fn source(&self) -> NodeId {
        NodeId(0)
    }

    pub fn sink(&self) -> NodeId {
        NodeId(self.num_nodes.saturating_sub(1))
    }

    pub fn gains(&self) -> Vec<f64> {
        self.edges.iter().map(|edge| edge.gain).collect()
    }

    pub fn topology(&self) -> Topology {
        let edges = self
            .edges
            .iter()
            .map(|edge| TopologyEdge {
                from: edge.from,
                to: edge.to,
                capacity: edge.capacity,
            })
            .collect();
        Topology::new(self.num_nodes, edges)
    }

    pub fn to_graph(&self) -> Result<GainGraph, GainFlowError> {
        self.topology().with_gains(&self.gains())
    }

    /// Re-solves the stored network and reports whether its optimum still
    /// matches `optimal_value` within `tolerance`.
    pub fn recheck<B: LpBackend + ?Sized>(
        &self,
        backend: &B,
        tolerance: f64,
    ) -> Result<bool, GainFlowError> {
        let graph = self.to_graph()?;
        let flow = max_generalized_flow(&graph, self.source(), self.sink(), backend)?;
        Ok(approx_eq(flow.value, self.optimal_value, tolerance))
    }
}

/// Assigns random gains to fixed topologies and attaches the verified
/// generalized max-flow optimum to each.
///
/// Gains come from one seeded stream, so a given seed and sequence of
/// topologies always yields the same records.
pub struct InstanceGenerator<B: LpBackend = MicroLpBackend> {
    options: GeneratorOptions,
    sampler: GainSampler,
    backend: B,
    emitted: usize,
}

impl InstanceGenerator<MicroLpBackend> {
    pub fn new(options: GeneratorOptions) -> Result<Self, GainFlowError> {
        Self::with_backend(options, MicroLpBackend)
    }
}

impl<B: LpBackend> InstanceGenerator<B> {
    pub fn with_backend(options: GeneratorOptions, backend: B) -> Result<Self, GainFlowError> {
        options.validate()?;
        Ok(Self {
            sampler: GainSampler::new(&options),
            options,
            backend,
            emitted: 0,
        })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn generate(&mut self, topology: &Topology) -> Result<InstanceRecord, GainFlowError> {
        topology.check_terminals()?;
        let mut regenerations = 0;
        loop {
            let gains = self.sampler.sample_many(topology.edge_count());
            let graph = topology.with_gains(&gains)?;
            match self.solve_verified(&graph, topology.source(), topology.sink()) {
                Ok(optimal_value) => {
                    let record = InstanceRecord {
                        num_nodes: topology.node_count,
                        num_edges: topology.edge_count(),
                        optimal_value,
                        edges: topology
                            .edges
                            .iter()
                            .zip(gains)
                            .map(|(edge, gain)| InstanceEdge {
                                from: edge.from,
                                to: edge.to,
                                lower_bound: 0.0,
                                capacity: edge.capacity,
                                gain,
                            })
                            .collect(),
                    };
                    self.emitted += 1;
                    info!(
                        "instance {}: {} nodes, {} edges, optimum {}",
                        self.emitted, record.num_nodes, record.num_edges, record.optimal_value
                    );
                    return Ok(record);
                }
                Err(err)
                    if err.is_retryable() && regenerations < self.options.max_regenerations =>
                {
                    regenerations += 1;
                    warn!(
                        "lp infeasible, redrawing gains ({regenerations}/{})",
                        self.options.max_regenerations
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Generates one record per topology, in order. Stops at the first error.
    pub fn generate_batch(
        &mut self,
        topologies: &[Topology],
    ) -> Result<Vec<InstanceRecord>, GainFlowError> {
        topologies
            .iter()
            .map(|topology| self.generate(topology))
            .collect()
    }

    fn solve_verified(
        &self,
        graph: &GainGraph,
        source: NodeId,
        sink: NodeId,
    ) -> Result<f64, GainFlowError> {
        let epsilon = self.options.tolerance;
        let flow = max_generalized_flow(graph, source, sink, &self.backend)?;
        flow.assignment.verify(graph, source, sink, epsilon)?;

        let tolerance = scaled_tolerance(epsilon, graph.magnitude());
        let delivered = flow.assignment.net_flow_at(graph, sink)?;
        if (delivered - flow.value).abs() > tolerance {
            return Err(GainFlowError::Logic(format!(
                "objective {} disagrees with delivered flow {}",
                flow.value, delivered
            )));
        }
        if flow.value < -tolerance {
            return Err(GainFlowError::Logic(format!(
                "optimum {} is below the zero flow",
                flow.value
            )));
        }
        Ok(flow.value.max(0.0))
    }
}
