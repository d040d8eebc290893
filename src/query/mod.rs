pub mod exec;
pub mod plan;
pub mod translate;

pub use exec::{FindResult, ReadExecutor};
pub use plan::{FilterExpr, Order, Projection, ReadPlan};
