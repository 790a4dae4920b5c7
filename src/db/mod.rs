pub mod catalog;
pub mod postgres;
pub mod redis;
pub mod session;

pub use catalog::{read_catalog_file, CandidateStore, MemoryCandidateStore, PgCandidateStore};
pub use postgres::{create_pool, run_migrations};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use session::{MemorySessionStore, RedisSessionStore, SessionStore};
