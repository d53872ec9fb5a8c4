pub mod board;
pub mod carousel;
pub mod classify;
