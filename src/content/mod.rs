//! Static content and parameter overrides

pub mod loader;
pub mod overrides;
pub mod table;

pub use loader::{load_content, parse_content};
pub use overrides::{OverrideSet, ParameterOverride};
pub use table::{ContentEntry, ContentTable, ItemCategory, ResourceCost};
