use super::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;

pub struct Server;

impl Server {
    /// Serves the account routes over `directory` until shutdown.
    pub async fn run<D>(config: Config, directory: D) -> anyhow::Result<()>
    where
        D: UserDirectory + Send + Sync + 'static,
    {
        let sessions = web::Data::new(Sessions::from_config(&config)?);
        let auth = web::Data::new(AuthService::new(directory, Scrypt).with_timeout(config.timeout()));
        log::info!("starting server on {}", config.bind());
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(auth.clone())
                .app_data(sessions.clone())
                .configure(routes::<D>)
        })
        .workers(4)
        .bind(config.bind())?
        .run()
        .await?;
        Ok(())
    }
}
