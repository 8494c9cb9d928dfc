//! Request handlers, one per record operation.

pub mod records;
