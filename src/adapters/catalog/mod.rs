//! Catalog adapters - static coaching configuration loaded from files.

mod yaml_catalog;

pub use yaml_catalog::{parse_catalog, CatalogError, YamlCatalogLoader};
