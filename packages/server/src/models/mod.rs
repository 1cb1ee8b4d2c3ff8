pub mod admin;
pub mod judge;
pub mod project;
pub mod shared;
