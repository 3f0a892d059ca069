pub mod dispatcher;
pub mod routes;
pub mod routing;
pub mod server;
pub mod types;
