//! Account Server Binary
//!
//! Serves signup, signin, and user management over HTTP.
//! Users live in PostgreSQL when `DB_URL` is set, in memory otherwise.

use carvalue::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log()?;
    let config = Config::from_env()?;
    log::info!("loaded {:?}", config);
    match config.database() {
        #[cfg(feature = "database")]
        Some(url) => {
            let client = db(url).await?;
            migrate(&client).await?;
            Server::run(config.clone(), client).await
        }
        #[cfg(not(feature = "database"))]
        Some(_) => anyhow::bail!("DB_URL is set but this build has no database support"),
        None => {
            log::warn!("DB_URL unset, users are kept in memory");
            Server::run(config.clone(), Memory::default()).await
        }
    }
}
