pub mod branches;
pub mod symbols;
pub mod tree;
