//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginatedTransactions, PaginationMeta, PaginationParams};
pub use response::MessageResponse;
