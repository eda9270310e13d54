use crate::auth::token::TokenIssuer;
use crate::config::AppConfig;
use crate::database::connection::DbConnection;

pub struct AppState {
    pub config: AppConfig,
    pub db_connection: DbConnection,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub async fn try_init(config: &AppConfig) -> anyhow::Result<Self> {
        let db_connection = DbConnection::connect(&config.database).await?;
        let tokens = TokenIssuer::new(&config.auth)?;
        Ok(Self {
            config: config.clone(),
            db_connection,
            tokens,
        })
    }
}
