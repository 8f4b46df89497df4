pub mod memory_store;
pub mod metadata;
pub mod settings_file;
