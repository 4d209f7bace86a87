//! Track catalog: the fixed, ordered list of playable entries.
//!
//! Built once from the playlist manifest at startup; read-only afterwards.
//! Order is significant, it defines the next/previous wrap order.

mod load;
mod model;

pub use load::{CatalogError, load};
pub use model::{BackendKind, Catalog, MediaRef, TrackDescriptor};

#[cfg(test)]
mod tests;
