/// Database layer
///
/// - `pool`: PostgreSQL connection pool with connect timeout and TLS selection
///
/// Models and their queries live in the `models` module at crate root level.

pub mod pool;
