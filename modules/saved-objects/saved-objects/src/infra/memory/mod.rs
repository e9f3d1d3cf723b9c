//! Process-local persistence: a shared document store and the repositories reading it.

pub mod factory;
pub mod repository;
pub mod store;


pub use factory::InMemoryRepositoryFactory;
pub use repository::InMemoryRepository;
pub use store::DocumentStore;
