//! Quire Core Library
//!
//! Context retrieval and compression for long-form writing: a chunk and
//! keyword index over chapter text, relevance-scored retrieval, context pack
//! assembly and a tiered compressor that fits a pack into a token budget.

pub mod assembler;
pub mod compression;
pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod logging;
pub mod store;
pub mod text;
