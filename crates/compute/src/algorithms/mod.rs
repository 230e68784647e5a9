pub mod coordination;
pub mod union_find;
