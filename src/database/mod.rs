pub mod db;
#[cfg(test)]
pub mod memory;
pub mod redis;

pub use self::db::connect_to_mongo;
pub use self::redis::RedisService;
