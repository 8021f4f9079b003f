/// Database plumbing
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded schema migrations
///
/// Entity queries live in the `models` module at the crate root.

pub mod migrations;
pub mod pool;
