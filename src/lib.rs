//! # Tocsin - Workflow Definition Compiler and Graph Editing Engine
//!
//! **Tocsin** keeps the two faces of an alert workflow consistent: the
//! textual YAML document operators check into their repos, and the node
//! graph an interactive editor renders. The same definition model sits in
//! the middle; parsing and serialization are inverse compilations over it,
//! and a mutation store keeps a live graph valid while it is being edited.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: [`parser::parse`] lowers a textual document into a
//!     [`workflow::WorkflowDefinition`], resolving condition aliases and
//!     loop scoping in a single pass and collecting non-fatal diagnostics.
//! 2.  **Edit**: a [`graph::WorkflowStore`] owns the definition plus the
//!     derived node/edge view. Insertions, deletions, connections and
//!     property edits all go through it, and every mutation is followed by
//!     a full validation pass.
//! 3.  **Validate**: [`validation`] enforces the per-node structural rules
//!     (what a loop may contain, what a branch may hold) and the
//!     whole-graph ordering rules, and decides deployability.
//! 4.  **Serialize**: [`serializer::serialize`] emits the canonical
//!     textual form, reconstructing branch aliasing and loop wrapping so a
//!     re-parse yields the same structure.
//!
//! Custom front-end formats plug in through the
//! [`workflow::IntoWorkflow`] trait instead of the YAML document.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tocsin::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let text = std::fs::read_to_string("workflows/disk-alert.yaml")?;
//!
//!     // Parse the textual form into the definition model.
//!     let output = parse(&text)?;
//!     for warning in &output.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!
//!     // Open an editing session over the derived graph.
//!     let catalog = ProviderCatalog::new(vec![]);
//!     let mut store = WorkflowStore::new(output.workflow, catalog);
//!
//!     // Mutate through the store; validation runs after every edit.
//!     let first_edge = store.edges()[0].id.clone();
//!     store.add_node_between(&first_edge, NodeSpec::Trigger(Trigger::Manual))?;
//!     println!("deployable: {}", store.can_deploy());
//!
//!     // Serialize the edited graph back to canonical text.
//!     let canonical = store.to_document()?;
//!     println!("{}", canonical);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod document;
pub mod error;
pub mod graph;
pub mod parser;
pub mod prelude;
pub mod serializer;
pub mod validation;
pub mod workflow;
