//! Interaction graph: one node per distinct drug name, one edge per record.

use std::collections::HashMap;

use medcheck_common::{InteractionRecord, Severity};
use serde::Serialize;

use crate::layout::{spring_layout, LayoutConfig, Point};

pub const GRAPH_TITLE: &str = "Drug Interaction Network";

/// Line colour for an edge of the given severity.
pub fn edge_color(severity: Severity) -> &'static str {
    match severity {
        Severity::High         => "red",
        Severity::Moderate     => "orange",
        Severity::Mild         => "yellow",
        Severity::None         => "green",
        Severity::Unrecognized => "gray",
    }
}

/// Line width for an edge of the given severity; also the layout spring weight.
pub fn edge_width(severity: Severity) -> u32 {
    match severity {
        Severity::High         => 4,
        Severity::Moderate     => 3,
        Severity::Mild         => 2,
        Severity::None         => 1,
        Severity::Unrecognized => 1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub label: String,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub source_position: Point,
    pub target_position: Point,
    pub severity: Severity,
    pub color: &'static str,
    pub width: u32,
    /// Hover text: `"{drugA} - {drugB}: {description}"`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionGraph {
    pub title: &'static str,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl InteractionGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, label: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.label == label)
    }
}

/// Build the graph with the default layout settings.
pub fn build_graph(records: &[InteractionRecord]) -> InteractionGraph {
    build_graph_with(records, &LayoutConfig::default())
}

pub fn build_graph_with(records: &[InteractionRecord], layout: &LayoutConfig) -> InteractionGraph {
    // Nodes keep first-appearance order.
    let mut labels: Vec<&str> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let mut springs = Vec::with_capacity(records.len());
    for r in records {
        let a = intern(&r.drug_a, &mut labels, &mut index);
        let b = intern(&r.drug_b, &mut labels, &mut index);
        springs.push((a, b, f64::from(edge_width(r.severity))));
    }

    let positions = spring_layout(labels.len(), &springs, layout);

    let nodes: Vec<GraphNode> = labels
        .iter()
        .zip(&positions)
        .map(|(label, position)| GraphNode { label: label.to_string(), position: *position })
        .collect();

    let edges: Vec<GraphEdge> = records
        .iter()
        .zip(&springs)
        .map(|(r, &(a, b, _))| GraphEdge {
            source: r.drug_a.clone(),
            target: r.drug_b.clone(),
            source_position: positions[a],
            target_position: positions[b],
            severity: r.severity,
            color: edge_color(r.severity),
            width: edge_width(r.severity),
            label: r.label(),
        })
        .collect();

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), seed = layout.seed, "Interaction graph built");

    InteractionGraph { title: GRAPH_TITLE, nodes, edges }
}

fn intern<'a>(name: &'a str, labels: &mut Vec<&'a str>, index: &mut HashMap<&'a str, usize>) -> usize {
    *index.entry(name).or_insert_with(|| {
        labels.push(name);
        labels.len() - 1
    })
}
