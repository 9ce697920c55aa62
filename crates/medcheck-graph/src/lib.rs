//! medcheck-graph — Interaction network construction.
//! Turns flagged drug pairs into a styled, laid-out graph that a chart
//! component can draw directly. No rendering or I/O happens here.

pub mod layout;
pub mod graph;

pub use graph::{
    build_graph, build_graph_with, edge_color, edge_width, GraphEdge, GraphNode, InteractionGraph,
};
pub use layout::{spring_layout, LayoutConfig, Point};
