//! Catalog domain: pure logic with no I/O.
pub mod aggregates;
pub mod events;
pub mod value_objects;
pub mod variants;
pub mod vocabulary;
