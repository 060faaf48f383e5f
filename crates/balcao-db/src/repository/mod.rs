//! # Repository Implementations
//!
//! One repository per entity collection. Repositories own simple CRUD and
//! query access against the pool; multi-entity atomic flows live in
//! [`crate::checkout`] and [`crate::reconcile`], which call the `*_in_tx`
//! associated functions with the transaction's connection.

pub mod cash;
pub mod customer;
pub mod product;
pub mod receivable;
pub mod sale;
pub mod user;
