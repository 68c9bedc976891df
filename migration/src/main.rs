use sea_orm_migration::prelude::*;

/// Migration CLI for the logger database. Reads `DATABASE_URL` (or `-u`),
/// e.g. `sqlite://logger_data.db?mode=rwc`.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(migration::Migrator).await;
}
