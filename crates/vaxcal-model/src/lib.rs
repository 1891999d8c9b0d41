//! External data-collaborator interfaces
//!
//! The engine owns no wire or storage format; everything it reads is
//! fetched by a collaborator and handed over as a decoded snapshot. This
//! crate provides that seam:
//!
//! - [`ImmunizationSource`]: the async trait transports implement
//! - [`ChildVaccinations`]: the five-bucket wire shape and its conversion
//!   to and from the single-collection [`vaxcal_types::RecordStore`]
//! - [`SnapshotRegistry`]: the refreshable holder callers take catalog
//!   clones from
//! - [`InMemorySource`]: a collection-backed source for tests and tooling

pub mod memory;
pub mod provider;
pub mod registry;
pub mod wire;

pub use memory::InMemorySource;
pub use provider::{ImmunizationSource, SourceError};
pub use registry::SnapshotRegistry;
pub use wire::{ChildVaccinations, WireRecord};
