//! The flow graph: the persisted automation definition.
//!
//! A graph is a value. Accessors are pure; mutators return a new graph with a
//! bumped `updated_at`, so the engine can hold a snapshot that nothing
//! mutates underneath it. Structural invariants are checked by [`FlowGraph::validate`]
//! before any execution.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

use super::edge::FlowEdge;
use super::node::FlowNode;
use super::{new_id, now_millis};

/// Complete flow graph: nodes plus conditional edges.
///
/// Serialized as a single JSON document by the store; `version` allows
/// schema migration of persisted flows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_version() -> u32 {
    1
}

impl FlowGraph {
    /// New empty graph with a fresh id and current timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            name: name.into(),
            version: 1,
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The unique Start node, if present.
    pub fn find_start_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.is_start())
    }

    /// Node lookup by id.
    pub fn node_by_id(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edge lookup by id.
    pub fn edge_by_id(&self, id: &str) -> Option<&FlowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All edges originating from a node, in declared order.
    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&FlowEdge> {
        self.edges
            .iter()
            .filter(|e| e.from_node_id == node_id)
            .collect()
    }

    /// The failure edge for a node, if one is designated.
    pub fn failure_edge(&self, node_id: &str) -> Option<&FlowEdge> {
        self.edges
            .iter()
            .find(|e| e.from_node_id == node_id && e.is_failure_path)
    }

    /// New graph with `node` added, or replaced if the id already exists.
    pub fn with_node(&self, node: FlowNode) -> Self {
        let mut nodes = self.nodes.clone();
        match nodes.iter().position(|n| n.id == node.id) {
            Some(idx) => nodes[idx] = node,
            None => nodes.push(node),
        }
        Self {
            nodes,
            updated_at: now_millis(),
            ..self.clone()
        }
    }

    /// New graph with `edge` added, or replaced if the id already exists.
    pub fn with_edge(&self, edge: FlowEdge) -> Self {
        let mut edges = self.edges.clone();
        match edges.iter().position(|e| e.id == edge.id) {
            Some(idx) => edges[idx] = edge,
            None => edges.push(edge),
        }
        Self {
            edges,
            updated_at: now_millis(),
            ..self.clone()
        }
    }

    /// New graph without the node and without every edge touching it.
    pub fn without_node(&self, node_id: &str) -> Self {
        Self {
            nodes: self.nodes.iter().filter(|n| n.id != node_id).cloned().collect(),
            edges: self
                .edges
                .iter()
                .filter(|e| e.from_node_id != node_id && e.to_node_id != node_id)
                .cloned()
                .collect(),
            updated_at: now_millis(),
            ..self.clone()
        }
    }

    /// New graph without the edge.
    pub fn without_edge(&self, edge_id: &str) -> Self {
        Self {
            edges: self.edges.iter().filter(|e| e.id != edge_id).cloned().collect(),
            updated_at: now_millis(),
            ..self.clone()
        }
    }

    /// Checks the structural invariants the engine relies on. Run before any
    /// node executes; a violation here is an editor bug, not a runtime fault.
    pub fn validate(&self) -> Result<(), StructuralError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(StructuralError::DuplicateNodeId(node.id.clone()));
            }
        }

        let start_count = self.nodes.iter().filter(|n| n.is_start()).count();
        match start_count {
            0 => return Err(StructuralError::MissingStart),
            1 => {}
            n => return Err(StructuralError::MultipleStarts(n)),
        }

        let mut edge_ids = HashSet::new();
        let mut failure_sources = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(StructuralError::DuplicateEdgeId(edge.id.clone()));
            }
            if !node_ids.contains(edge.from_node_id.as_str()) {
                return Err(StructuralError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: edge.from_node_id.clone(),
                });
            }
            if !node_ids.contains(edge.to_node_id.as_str()) {
                return Err(StructuralError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: edge.to_node_id.clone(),
                });
            }
            if edge.from_node_id == edge.to_node_id {
                return Err(StructuralError::SelfLoop {
                    edge_id: edge.id.clone(),
                });
            }
            if edge.is_failure_path && !failure_sources.insert(edge.from_node_id.as_str()) {
                return Err(StructuralError::MultipleFailureEdges {
                    node_id: edge.from_node_id.clone(),
                });
            }
        }

        Ok(())
    }
}
