pub mod categories;
pub mod questions;
