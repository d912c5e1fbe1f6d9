// Adapters layer: concrete implementations of the domain ports (stores, HTTP clients, identity).

pub mod chat_completions;
pub mod drift;
pub mod file_store;
pub mod identity;
pub mod memory_store;
pub mod vercel;
