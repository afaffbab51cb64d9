pub mod pinot;
pub use pinot::PinotEndpoint;
pub mod order_repo;
pub use order_repo::OrderRepository;
