pub mod auth;
pub mod book;
pub mod relation;
pub mod shared;
