//! Incremental dependency gatherer: walks the transitive closure of a set of
//! root packages, querying a package source only for version ranges not
//! already covered, with one lock per package id.

pub mod cache;
pub mod feed;
pub mod gatherer;
pub mod source;
