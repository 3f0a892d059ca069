pub mod app;
pub mod reducer;
pub mod todo_reducer;
