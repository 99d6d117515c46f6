//! Per-document element sink.

use super::element::GraphElement;
use super::identifiers::NodeKind;

/// Ordered, append-only collection of the elements produced by one document's
/// projection.
///
/// A sink is owned by a single transformation. Elements cannot be modified
/// once pushed; they can only be read or drained out as a sequence. Dropping
/// the sink discards everything staged in it, which is how a failed projection
/// avoids handing a partial graph downstream.
#[derive(Debug, Default)]
pub struct ElementSink {
    elements: Vec<GraphElement>,
}

impl ElementSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one element.
    pub fn push(&mut self, element: GraphElement) {
        self.elements.push(element);
    }

    /// Append several elements, preserving their order.
    pub fn extend<I: IntoIterator<Item = GraphElement>>(&mut self, elements: I) {
        self.elements.extend(elements);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphElement> {
        self.elements.iter()
    }

    /// Number of staged elements of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.elements.iter().filter(|e| e.kind() == kind).count()
    }

    /// Remove and yield all staged elements in emission order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, GraphElement> {
        self.elements.drain(..)
    }

    /// Consume the sink and return its elements in emission order.
    #[must_use]
    pub fn into_elements(self) -> Vec<GraphElement> {
        self.elements
    }
}
