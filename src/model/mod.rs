//! Graph representation shared by all projectors.
//!
//! Both CycloneDX and SPDX documents are projected into the same element
//! stream: [`GraphElement`] nodes of one of four [`NodeKind`]s, identified by
//! namespaced [`NodeId`]s and linked through embedded edge lists.

mod attributes;
mod element;
mod identifiers;
mod sink;

pub use attributes::{
    attributes_excluding, flatten, flatten_with, try_flatten, Attributes, FlattenError,
    FlattenOptions, DEFAULT_MAX_DEPTH, DEFAULT_SEPARATOR, RESERVED_PREFIX,
};
pub use element::{GraphElement, RecordLayout, ATTRIBUTES_KEY, TYPE_KEY};
pub use identifiers::{EdgeName, EdgeRef, NodeId, NodeKind};
pub use sink::ElementSink;
