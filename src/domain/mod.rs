pub mod environment;
pub mod todo;
