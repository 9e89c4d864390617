mod fetch;
mod row;

pub use fetch::{execute, query_prefix};
pub use row::RowResult;
