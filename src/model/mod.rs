pub mod page;
pub mod principal;
pub mod snapshot;
pub mod request_metadata;
