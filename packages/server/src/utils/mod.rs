pub mod code;
pub mod import;
pub mod jwt;
