use sea_orm_migration::prelude::*;

use clinpush_install_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
