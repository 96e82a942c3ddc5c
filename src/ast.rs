//! # Graph Navigation Language - Abstract Syntax Tree
//!
//! This module defines the tree the parser produces and the evaluator walks.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Binary and prefix operators, selection kinds
//! - **[node]** - The node type, its variants and literal constants
//! - **[display]** - Normalized source form of a tree
//!
//! ## Quick Start
//!
//! ```text
//! bean.items[#LAST].name
//! ```
//!
//! Reads `bean` from the root, `items` from the bean, takes the last element
//! and reads its `name`.
//!
//! ## Core Concepts
//!
//! ### Navigation chains
//!
//! A chain threads a value left to right: each step is evaluated with the
//! previous step's result as its source. Chains never nest; building a chain
//! out of chains splices the inner steps in place.
//!
//! ### Get and set
//!
//! Every node can be read. Variables, `#root`, properties, chains ending in a
//! property, and sequences ending in one of those can also be written.
//!
//! ### Arguments see the root
//!
//! Method, constructor and index arguments are evaluated against the
//! expression root, not the value the chain has reached:
//!
//! ```text
//! bean.lookup(key)     // key is read from the root, not from bean
//! ```
//!
//! ## Examples
//!
//! ### Arithmetic and conditionals
//!
//! ```text
//! total > 100 ? total * 0.9 : total
//! ```
//!
//! ### Projection and selection
//!
//! ```text
//! orders.{? #this.paid }.{ amount }
//! ```
//!
//! ### Assignment and sequences
//!
//! ```text
//! #count = items.size(), #count > 0
//! ```
//!
//! ### Static members and construction
//!
//! ```text
//! @Math@max(a, b)
//! new int[] {1, 2, 3}
//! ```
pub mod display;
pub mod node;
pub mod operators;
pub mod tokens;

pub use node::{Literal, Node, NodeId, NodeKind};
pub use operators::{BinaryOp, SelectKind, UnaryOp};
pub use tokens::Token;
