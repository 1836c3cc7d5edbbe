//! `ordersd db <migrate|status>` subcommand.

pub async fn run_db_command(args: Vec<String>) -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is required for db commands"))?;
    let pool = orders_db::connect(&database_url).await?;

    match args.get(2).map(String::as_str) {
        Some("migrate") => orders_db::migrate(&pool).await,
        Some("status") => orders_db::status(&pool).await,
        other => Err(anyhow::anyhow!("unknown db subcommand: {:?} (expected migrate or status)", other)),
    }
}
