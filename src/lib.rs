//! Feature Board Library
//!
//! This library provides a feature request board: features are created,
//! upvoted by id-deduplicated ledger, and deleted through one form
//! endpoint, and clients can overlay their in-flight submissions on the
//! confirmed list to render optimistically.

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod view;
