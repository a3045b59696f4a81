pub mod board;
pub mod registry;
