pub mod table_registry;

pub use table_registry::TableRegistry;
