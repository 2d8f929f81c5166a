mod errors;
pub mod models;
pub mod repository;
pub mod seed;

pub use errors::{CatalogError, InventoryError};
pub use models::{CreditOutcome, InventorySummary, OwnedCard};
pub use repository::{CatalogPort, InMemoryCatalog, InMemoryInventory, InventoryPort};
pub use seed::seed_catalog;
