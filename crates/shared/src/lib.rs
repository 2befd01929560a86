//! Domain types and wire shapes shared between the Roomzy client and its backend.

pub mod domain;
pub mod error;
pub mod protocol;
