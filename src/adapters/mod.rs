// Adapters layer: concrete implementations of the domain ports (storage, lead persistence).

pub mod http;
pub mod json_store;
pub mod memory;
pub mod storage;

pub use http::HttpLeadRepository;
pub use json_store::JsonFileLeadRepository;
pub use memory::MemoryLeadRepository;
pub use storage::LocalStorage;
