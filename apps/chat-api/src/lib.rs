pub mod chat;
pub mod config;
pub mod error;
pub mod game;
pub mod gateway;
pub mod profile;
pub mod routes;

use std::sync::Arc;

use chat::ChatStore;
use config::Config;
use game::registry::GameRegistry;
use gateway::connections::ConnectionRegistry;
use gateway::presence::PresenceRegistry;
use gateway::scoreboard::MatchTracker;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: Arc<dyn ChatStore>,
    pub presence: Arc<PresenceRegistry>,
    pub games: Arc<GameRegistry>,
    pub matches: Arc<MatchTracker>,
    pub connections: Arc<ConnectionRegistry>,
}
