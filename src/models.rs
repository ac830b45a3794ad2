pub mod note;
pub mod objective;
pub mod slot;
pub mod store;
pub mod task;
