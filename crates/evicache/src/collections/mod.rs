//! Collection types backing the eviction handlers

pub mod key_list;

pub use key_list::KeyList;
