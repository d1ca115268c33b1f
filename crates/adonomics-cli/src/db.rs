use clap::Subcommand;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Migrate => {
            adonomics_db::run_migrations(pool).await?;
            println!("migrations applied");
        }
        DbCommands::Ping => {
            adonomics_db::health_check(pool).await?;
            println!("database ok");
        }
    }
    Ok(())
}
