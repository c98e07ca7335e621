//! Syntax tree of the Kestrel language.
//!
//! Parsing happens outside this workspace; [`builder::AstBuilder`] builds trees
//! programmatically and [`visitor::Visitor`] walks them read-only.
#![warn(clippy::pedantic)]
pub mod builder;
pub mod nodes;
pub(crate) mod nodes_impl;
pub mod visitor;
