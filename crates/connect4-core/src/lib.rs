pub mod board;
pub mod protocol;
