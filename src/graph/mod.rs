//! Causal dependency graph.
//!
//! An immutable DAG over metric names: nodes in a dense array addressed by
//! integer index, edges as adjacency lists of indices. Cycles and edges to
//! unknown nodes are rejected at construction; there is no mutation API
//! afterwards, so a graph can be shared freely between training and
//! diagnosis.

mod dag;


pub use dag::{CausalGraph, GraphError};
