// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Connection graph for pipeline stages
//!
//! One node per stage, one edge per resolved connection. Ordering follows
//! Kahn's algorithm over the feed-forward part of the graph: stages marked
//! feedback-capable, and every edge touching them, take no part in the
//! acyclicity check and are placed after all other stages.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::definition::{ConnectionSpec, PipelineIr, StageKind, StageSpec};

/// Node weight
#[derive(Debug, Clone)]
struct StageNode {
    id: String,
    kind: StageKind,
    feedback_capable: bool,
}

/// Directed stage graph
pub struct ConnectionGraph {
    graph: DiGraph<StageNode, ConnectionSpec>,
    id_to_index: HashMap<String, NodeIndex>,
}

impl ConnectionGraph {
    /// Build a graph from stages and connections
    ///
    /// Stage ids after the first occurrence and connections naming unknown
    /// stages are ignored.
    pub fn new(stages: &[StageSpec], connections: &[ConnectionSpec]) -> Self {
        let mut graph = DiGraph::new();
        let mut id_to_index = HashMap::new();

        for stage in stages {
            if id_to_index.contains_key(&stage.id) {
                continue;
            }
            let node = graph.add_node(StageNode {
                id: stage.id.clone(),
                kind: stage.kind,
                feedback_capable: stage.feedback_capable,
            });
            id_to_index.insert(stage.id.clone(), node);
        }

        for connection in connections {
            let from = id_to_index.get(&connection.from.stage);
            let to = id_to_index.get(&connection.to.stage);
            if let (Some(&from), Some(&to)) = (from, to) {
                graph.add_edge(from, to, connection.clone());
            }
        }

        Self { graph, id_to_index }
    }

    /// Build the graph of a validated pipeline
    pub fn from_ir(ir: &PipelineIr) -> Self {
        Self::new(ir.stages(), ir.connections())
    }

    pub fn stage_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn is_feedback(&self, node: NodeIndex) -> bool {
        self.graph[node].feedback_capable
    }

    /// Whether an edge touches a feedback-capable stage
    fn is_feedback_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.is_feedback(from) || self.is_feedback(to)
    }

    /// Stage ids in feed-forward topological order, then feedback-capable
    /// stages in declaration order
    ///
    /// Among ready stages the earliest declared is taken first, so the
    /// result depends only on the input. `Err` carries the stages that could
    /// not be ordered, in declaration order.
    pub fn feedback_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut in_degree = vec![0usize; self.graph.node_count()];
        for edge in self.graph.edge_references() {
            if !self.is_feedback_edge(edge.source(), edge.target()) {
                in_degree[edge.target().index()] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = self
            .graph
            .node_indices()
            .filter(|&n| !self.is_feedback(n) && in_degree[n.index()] == 0)
            .map(|n| Reverse(n.index()))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut placed = vec![false; self.graph.node_count()];

        while let Some(Reverse(index)) = ready.pop() {
            let node = NodeIndex::new(index);
            placed[index] = true;
            order.push(self.graph[node].id.clone());

            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if self.is_feedback(next) {
                    continue;
                }
                in_degree[next.index()] -= 1;
                if in_degree[next.index()] == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        let unresolved: Vec<String> = self
            .graph
            .node_indices()
            .filter(|&n| !self.is_feedback(n) && !placed[n.index()])
            .map(|n| self.graph[n].id.clone())
            .collect();

        if !unresolved.is_empty() {
            return Err(unresolved);
        }

        order.extend(
            self.graph
                .node_indices()
                .filter(|&n| self.is_feedback(n))
                .map(|n| self.graph[n].id.clone()),
        );

        Ok(order)
    }

    /// Get upstream stages (stages driving one of this stage's inputs)
    pub fn dependencies(&self, stage_id: &str) -> Option<Vec<String>> {
        self.neighbors(stage_id, Direction::Incoming)
    }

    /// Get downstream stages (stages driven by this stage)
    pub fn dependents(&self, stage_id: &str) -> Option<Vec<String>> {
        self.neighbors(stage_id, Direction::Outgoing)
    }

    fn neighbors(&self, stage_id: &str, direction: Direction) -> Option<Vec<String>> {
        let node = self.id_to_index.get(stage_id)?;
        let mut ids: Vec<String> = self
            .graph
            .neighbors_directed(*node, direction)
            .map(|n| self.graph[n].id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Some(ids)
    }

    /// Check if data flows (directly or transitively) from stage B to stage A
    pub fn depends_on(&self, stage_a: &str, stage_b: &str) -> bool {
        let Some(node_a) = self.id_to_index.get(stage_a) else {
            return false;
        };
        let Some(node_b) = self.id_to_index.get(stage_b) else {
            return false;
        };

        petgraph::algo::has_path_connecting(&self.graph, *node_b, *node_a, None)
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");

        for node in self.graph.node_indices() {
            let stage = &self.graph[node];
            out.push_str(&format!("    {}[{}: {}]\n", stage.id, stage.id, stage.kind));
        }

        for edge in self.graph.edge_references() {
            let from = &self.graph[edge.source()].id;
            let to = &self.graph[edge.target()].id;
            let arrow = if self.is_feedback_edge(edge.source(), edge.target()) {
                "-.->"
            } else {
                "-->"
            };
            let label = format!("{}:{}", edge.weight().from.port, edge.weight().to.port);
            out.push_str(&format!("    {} {}|{}| {}\n", from, arrow, label, to));
        }

        out
    }

    /// Generate DOT diagram of the graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for node in self.graph.node_indices() {
            let stage = &self.graph[node];
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\\n({})\"];\n",
                stage.id, stage.id, stage.kind
            ));
        }

        if self.graph.edge_count() > 0 {
            out.push('\n');
        }

        for edge in self.graph.edge_references() {
            let from = &self.graph[edge.source()].id;
            let to = &self.graph[edge.target()].id;
            let style = if self.is_feedback_edge(edge.source(), edge.target()) {
                ", style=dashed"
            } else {
                ""
            };
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{} → {}\"{}];\n",
                from,
                to,
                edge.weight().from.port,
                edge.weight().to.port,
                style
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of the stage order
    pub fn to_text(&self, ir: &PipelineIr) -> String {
        let mut out = String::new();

        for (i, stage) in ir.ordered_stages().enumerate() {
            out.push_str(&format!("{}. {} ({})", i + 1, stage.id, stage.kind));

            let deps = self.dependencies(&stage.id).unwrap_or_default();
            if !deps.is_empty() {
                out.push_str(&format!(" [from: {}]", deps.join(", ")));
            }
            if stage.feedback_capable {
                out.push_str(" [feedback]");
            }

            out.push('\n');
        }

        out
    }
}
