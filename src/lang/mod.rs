//! # Cinder Syntax Tree
//!
//! The tree is produced by the parser and consumed exactly once by the code
//! generator. Nodes are closed sum types; every consumer matches them
//! exhaustively, so a new variant does not build until each stage handles it.

pub mod function;
pub mod node;
