// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{EntregaRepository, LicaoRepository, TurmaRepository, UserRepository},
    services::{
        auth::AuthService, licao_service::LicaoService, painel_service::PainelService,
        turma_service::TurmaService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub turma_service: TurmaService,
    pub licao_service: LicaoService,
    pub painel_service: PainelService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let turma_repo = TurmaRepository::new(db_pool.clone());
        let licao_repo = LicaoRepository::new(db_pool.clone());
        let entrega_repo = EntregaRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret, db_pool.clone());
        let turma_service = TurmaService::new(turma_repo.clone(), db_pool.clone());
        let licao_service = LicaoService::new(
            licao_repo,
            turma_repo.clone(),
            entrega_repo.clone(),
            db_pool.clone(),
        );
        let painel_service = PainelService::new(turma_repo, entrega_repo);

        Ok(Self {
            db_pool,
            auth_service,
            turma_service,
            licao_service,
            painel_service,
        })
    }
}
