//! Refinement of primvar data through a topology hierarchy.
pub mod primvar;
pub use primvar::{Accumulate, Primvar};

pub mod topology_level;
pub use topology_level::TopologyLevel;

pub mod topology_refiner;
pub use topology_refiner::{Refinement, Topology, TopologyRefiner};

pub mod stencil_table;
pub use stencil_table::{InterpolationMode, Stencil, StencilTable, StencilTableOptions};

pub mod primvar_refiner;
pub use primvar_refiner::PrimvarRefiner;

pub mod dispatch;
pub use dispatch::Width;
