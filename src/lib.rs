//! # scenequery
//!
//! A selector query language for locating nodes in an editor's scene graph.
//!
//! Queries look like CSS selectors: `Node.bar:visible(true)`, `* > #child`,
//! `Mesh[name=Head]`. They are recognised by a small backtracking grammar engine
//! (see [query::grammar] and [query::engine]) and can be turned into a typed
//! [query::selector::SelectorQuery] for downstream filtering.

pub mod query;
