pub mod candidate_store;
pub mod memory_store;
pub mod pool;
