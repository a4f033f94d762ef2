pub mod shutdown;
pub mod threads;
