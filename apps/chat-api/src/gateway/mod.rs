pub mod connections;
pub mod events;
pub mod handler;
pub mod presence;
pub mod scoreboard;
pub mod server;
