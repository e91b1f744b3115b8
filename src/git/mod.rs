mod branch;
mod range;
mod remote;
mod repository;
mod store;

#[cfg(test)]
pub mod memory;

pub use branch::{remote_ref, short_name, Branch, UpstreamLink};
pub use range::{short_id, AncestryFact, Range};
pub use remote::Remote;
pub use repository::Repository;
pub use store::RefStore;
