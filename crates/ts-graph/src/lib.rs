//! ts-graph: network graph layer for transit-spread.
//!
//! Provides:
//! - Core graph data structures (Vertex, Edge, Line, Graph)
//! - Graph construction from snapshot records
//! - Copy-on-write structural edits
//! - Key-based queries and stable indexing for analysis passes
//!
//! # Example
//!
//! ```
//! use ts_core::{Location, VertexKind};
//! use ts_graph::{EditEngine, GraphBuilder};
//! use ts_records::{LineRecord, StopRecord};
//!
//! let stops: Vec<StopRecord> = ["A", "B"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, id)| StopRecord {
//!         id: id.to_string(),
//!         name: id.to_string(),
//!         location: Location::new(1000.0 * i as f64, 0.0),
//!         mode: VertexKind::SubwayStop,
//!     })
//!     .collect();
//! let lines = [LineRecord {
//!     id: "1".into(),
//!     name: "One".into(),
//!     stops: vec!["A".into(), "B".into()],
//! }];
//! let graph = GraphBuilder::default()
//!     .build_from_records(&stops, &[], &lines)
//!     .unwrap();
//! assert_eq!(graph.edge_count(), 1);
//!
//! let edited = EditEngine::new().remove_line(&graph, "1").unwrap();
//! assert_eq!(edited.edge_count(), 0);
//! assert_eq!(graph.edge_count(), 1);
//! ```

pub mod builder;
pub mod edit;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod search;
pub mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use edit::{EditCommand, EditEngine, StationSpec};
pub use error::GraphError;
pub use graph::{Edge, Estimates, Graph, Line, Origin, Tombstone, Vertex};
pub use indexing::IndexMap;
pub use validate::check_invariants;
