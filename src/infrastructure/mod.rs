pub mod model;
pub mod schema;
pub mod server;
pub mod warehouse;
