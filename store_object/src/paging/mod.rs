//! Paging and sorting
//!
//! Request and result types shared by every store adapter.

pub mod page;
pub mod sort;

pub use page::{Page, PageRequest};
pub use sort::{Direction, Order, Sort};
