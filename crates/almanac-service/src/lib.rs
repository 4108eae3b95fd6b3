pub mod error;
pub mod materialize;
pub mod request;
pub mod store;
pub mod timeline;
pub mod validation;
