pub mod builders;
pub mod doubles;
pub mod strategies;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use builders::{drive, CardBuilder};
#[allow(unused_imports)]
pub use doubles::{FailingInventory, FailingStore, ScriptedRngSource};
#[allow(unused_imports)]
pub use strategies::ScriptedStrategy;
