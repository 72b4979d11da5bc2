pub mod agent;
pub mod console;
