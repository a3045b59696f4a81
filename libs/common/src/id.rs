use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = folio_common::id::prefixed_ulid("game");
/// assert!(id.starts_with("game_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// Well-known ID prefixes.
pub mod prefix {
    pub const GAME: &str = "game";
    pub const CONNECTION: &str = "conn";
}
