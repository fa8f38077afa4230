/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: sqlx migration runner
///
/// The models themselves live in the `models` module at crate root level;
/// everything that executes SQL against them is in `store::postgres`.

pub mod migrations;
pub mod pool;
