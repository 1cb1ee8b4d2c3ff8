mod admin;
mod common;
mod judge;
mod project;
