//! # artmap_core
//!
//! Incremental classification with Adaptive Resonance Theory.
//!
//! A [`Network`] learns an open-ended set of prototype categories from a
//! stream of feature vectors: inputs close enough to an existing prototype
//! (by the vigilance test) refine it, everything else opens a new category.
//!
//! An [`AssociationManager`] links the classes of several networks through a
//! [`MapField`], so the class of one network can be predicted from the
//! others. Networks with reliability 1.0 supervise the rest: when they
//! disagree with a slave network, the slave is match-tracked to a different
//! (or new) class.
//!
//! ```no_run
//! use artmap_core::{AssociationManager, Network};
//!
//! let mut input = Network::new(true, true, true);
//! input.set_vigilance(0.8);
//! let mut label = Network::new(false, true, true);
//! label.set_vigilance(0.99);
//! let mut networks = [input, label];
//!
//! let mut artmap = AssociationManager::new(&mut networks, 1.0);
//! artmap.classify(&[Some(&[0.2, 0.4][..]), Some(&[1.0][..])])?;
//! let predicted = artmap.classify(&[Some(&[0.21, 0.4][..]), None])?;
//! println!("label class: {:?}", predicted[1]);
//! # Ok::<(), artmap_core::ArtError>(())
//! ```

pub mod association;
pub mod config;
pub mod error;
pub mod mapfield;
pub mod network;
pub mod persistence;

/// Index of a prototype inside its network; doubles as the class id.
pub type PrototypeId = usize;
/// Output class of a network.
pub type ClassId = PrototypeId;
pub type MapNodeId = usize;
/// Position of a network in the slice given to an [`AssociationManager`].
pub type NetworkId = usize;

pub use association::{AssociationManager, MultiViewOutcome, Resolution};
pub use config::{ActivationMode, MapFieldConfig, NetworkConfig, Verbosity};
pub use error::{ArtError, Result};
pub use mapfield::MapField;
pub use network::{Network, Selection};
pub use persistence::Persist;
