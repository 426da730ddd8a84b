//! Aggregates module
pub mod product;
pub mod cart;

pub use product::{Product, ProductDetails};
pub use cart::{Cart, CartError, CartItem};
