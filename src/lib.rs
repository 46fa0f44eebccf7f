pub mod context;
pub mod credential;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod pagination;
pub mod query;

pub use context::RequestContext;
pub use credential::{ApiTokenCredential, BasicAuthCredential, BearerTokenCredential, Credential};
pub use error::{ApiError, Error, Result};
pub use http::{BaseApi, Client};
pub use pagination::{CursorPagination, CursorPaginationMeta};
pub use query::add_options;
