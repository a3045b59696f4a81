pub mod id;
pub mod snowflake;

pub use id::{prefix, prefixed_ulid};
pub use snowflake::SnowflakeGenerator;
