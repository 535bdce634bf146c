pub mod docstore;
pub mod memory;
