pub mod book;
pub mod relation;
