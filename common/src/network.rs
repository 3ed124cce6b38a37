pub mod port;
pub mod range;
pub mod target;
