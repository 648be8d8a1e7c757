//! Error type shared by every ARTMAP component.

use thiserror::Error;

use crate::{ClassId, MapNodeId, NetworkId, PrototypeId};

/// Errors raised by networks, the map field and persistence.
#[derive(Debug, Error)]
pub enum ArtError {
    /// Underlying file or stream failure during save/load.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted payload was readable but structurally invalid.
    #[error("corrupt payload: {0}")]
    Corrupt(String),

    #[error("prototype {id} not found (network holds {count})")]
    PrototypeNotFound { id: PrototypeId, count: usize },

    #[error("map node {id} not found (map field holds {count})")]
    MapNodeNotFound { id: MapNodeId, count: usize },

    #[error("network {id} not found (manager holds {count})")]
    NetworkNotFound { id: NetworkId, count: usize },

    #[error("class {class} of network {network} has no association row")]
    ClassNotFound { network: NetworkId, class: ClassId },

    /// A view must carry exactly one slot per network.
    #[error("view has {got} slots but {expected} networks are attached")]
    ViewLength { expected: usize, got: usize },

    /// Requested behaviour exists only as a stub (distributed output).
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, ArtError>;
