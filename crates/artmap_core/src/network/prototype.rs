//! Long-term memory of a network: one weight vector per committed category.

use crate::error::{ArtError, Result};
use crate::PrototypeId;

/// A prototype is the weight vector from every F1 node to one F2 node.
pub type Prototype = Vec<f32>;

/// Append-only arena of prototypes addressed by their creation index.
///
/// Prototypes are never removed, so a [`PrototypeId`] handed out once stays
/// valid for the lifetime of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrototypeStore {
    prototypes: Vec<Prototype>,
}

impl PrototypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_prototypes(prototypes: Vec<Prototype>) -> Self {
        Self { prototypes }
    }

    /// Commit a new category and return its id.
    pub fn push(&mut self, prototype: Prototype) -> PrototypeId {
        self.prototypes.push(prototype);
        self.prototypes.len() - 1
    }

    pub fn get(&self, id: PrototypeId) -> Result<&[f32]> {
        self.prototypes
            .get(id)
            .map(Vec::as_slice)
            .ok_or(ArtError::PrototypeNotFound {
                id,
                count: self.prototypes.len(),
            })
    }

    pub(crate) fn get_mut(&mut self, id: PrototypeId) -> Result<&mut [f32]> {
        let count = self.prototypes.len();
        self.prototypes
            .get_mut(id)
            .map(Vec::as_mut_slice)
            .ok_or(ArtError::PrototypeNotFound { id, count })
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrototypeId, &[f32])> {
        self.prototypes
            .iter()
            .enumerate()
            .map(|(id, p)| (id, p.as_slice()))
    }

    pub fn as_slice(&self) -> &[Prototype] {
        &self.prototypes
    }
}
