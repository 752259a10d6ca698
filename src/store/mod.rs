//! In-memory user collection and the trait the HTTP surface talks to.

mod service;
pub mod types;

pub use service::{UserApi, UserStore};
pub use types::{IdAllocation, StoreError, User, UserFields, UserId};
