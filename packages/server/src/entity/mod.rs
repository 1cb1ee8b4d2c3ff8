pub mod flag;
pub mod judge;
pub mod log;
pub mod options;
pub mod project;
