//! Participant and message storage
//!
//! A single explicitly constructed store client shared by reference with
//! every component. Per-statement atomicity comes from the database.

pub mod sqlite_store;

pub use sqlite_store::ChatStore;
