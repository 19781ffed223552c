//! Migration runner for the Rebar schema.
//!
//! Wraps the standard sea-orm-migration CLI: `up`, `down`, `status`, and
//! `fresh` against `DATABASE_URL`.

use rebar_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
