//! Public data types exposed by the `phonebook-core` crate.

pub mod dataset;
pub mod record;

pub use dataset::{Dataset, Group, Meta};
pub use record::Record;
