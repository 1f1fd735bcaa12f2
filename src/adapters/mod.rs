// Adapters layer: concrete implementations of the domain ports (catalog sources, sector storage).

pub mod catalog;
pub mod store;

pub use catalog::{HttpCatalog, InMemoryCatalog};
pub use store::InMemorySectorStore;
