// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é aceitável aqui: se a configuração falhar, a aplicação
    // não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Consultas abertas: listagem de lições, alunos e as visões públicas
    // de acompanhamento (resumo por período e analytics por aluno).
    let public_routes = Router::new()
        .route("/licoes", get(handlers::licoes::listar_licoes))
        .route("/alunos", get(handlers::painel::listar_alunos))
        .route("/resumo", get(handlers::painel::resumo))
        .route("/aluno-analytics", get(handlers::painel::analise_aluno));

    // Tudo que muda estado (ou expõe a visão do professor) exige sessão.
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route(
            "/turmas",
            post(handlers::turmas::criar_turma).put(handlers::turmas::atualizar_turma),
        )
        .route("/nova-licao", post(handlers::licoes::criar_licao))
        .route("/licoes/{id}", put(handlers::licoes::atualizar_licao))
        .route("/licoes/{id}/falta", post(handlers::licoes::alternar_falta))
        .route("/salvar-entregas", post(handlers::licoes::salvar_entregas))
        .route("/dashboard", get(handlers::painel::dashboard))
        .route(
            "/dashboard/disciplinas",
            get(handlers::painel::dashboard_disciplinas),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let porta = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{porta}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
