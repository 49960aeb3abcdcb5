pub mod database;
pub mod tasks;
