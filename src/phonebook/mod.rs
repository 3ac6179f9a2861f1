//! Core `Phonebook` type tying credentials, lockout, session, and the
//! active dataset together.

mod admin;
mod auth;
pub mod lifecycle;

pub use lifecycle::Phonebook;
