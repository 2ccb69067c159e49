pub mod http_gateway;
pub mod memory_repository;
pub mod postgres_repository;

pub use http_gateway::HttpHistoryGateway;
pub use memory_repository::InMemoryHistoryRepository;
pub use postgres_repository::PostgresHistoryRepository;
