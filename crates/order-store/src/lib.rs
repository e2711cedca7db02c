pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod query;
pub mod stats;
pub mod store;

pub use common::{OrderId, OrderStatus, Page, ServiceId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderRepository;
pub use order::{Customer, NewOrder, Order, OrderPatch};
pub use postgres::PostgresOrderRepository;
pub use query::OrderQuery;
pub use stats::OrderStatistics;
pub use store::{OrderRepository, OrderRepositoryExt, UpdateOptions};
