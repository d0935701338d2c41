// src/handlers/licoes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::licao_repo::FiltroLicoes,
    middleware::auth::AuthenticatedUser,
    models::licao::{FaltaPayload, LicaoPayload, ListagemLicoes, SalvarEntregasPayload},
};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicoesQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
    pub disciplina: Option<String>,
    pub material: Option<String>,
}

fn filtro_opcional(valor: Option<String>) -> Option<String> {
    valor
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// GET /api/licoes
#[utoipa::path(
    get,
    path = "/api/licoes",
    tag = "Lições",
    params(
        ("page" = Option<i64>, Query, description = "Página (1-based)"),
        ("pageSize" = Option<i64>, Query, description = "Itens por página (máx. 100)"),
        ("search" = Option<String>, Query, description = "Busca no título"),
        ("disciplina" = Option<String>, Query, description = "Filtro por disciplina"),
        ("material" = Option<String>, Query, description = "Filtro por material")
    ),
    responses(
        (status = 200, description = "Página de lições com sub-lições e catálogos de filtro", body = ListagemLicoes)
    )
)]
pub async fn listar_licoes(
    State(app_state): State<AppState>,
    Query(query): Query<LicoesQuery>,
) -> Result<Json<ListagemLicoes>, AppError> {
    let filtro = FiltroLicoes {
        search: filtro_opcional(query.search),
        disciplina: filtro_opcional(query.disciplina),
        material: filtro_opcional(query.material),
    };

    let listagem = app_state
        .licao_service
        .listar_licoes(query.page, query.page_size, filtro)
        .await?;

    Ok(Json(listagem))
}

// POST /api/nova-licao
#[utoipa::path(
    post,
    path = "/api/nova-licao",
    tag = "Lições",
    request_body = LicaoPayload,
    responses(
        (status = 201, description = "Lição criada com fan-out de entregas"),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_licao(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<LicaoPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let licao = app_state.licao_service.criar_licao(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": licao.id }))))
}

// PUT /api/licoes/{id}
#[utoipa::path(
    put,
    path = "/api/licoes/{id}",
    tag = "Lições",
    params(("id" = Uuid, Path, description = "Id da lição")),
    request_body = LicaoPayload,
    responses(
        (status = 200, description = "Lição atualizada"),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Lição não pertence ao professor")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_licao(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(licao_id): Path<Uuid>,
    Json(payload): Json<LicaoPayload>,
) -> Result<Json<Value>, AppError> {
    let id = app_state
        .licao_service
        .atualizar_licao(user.id, licao_id, payload)
        .await?;

    Ok(Json(json!({ "id": id })))
}

// POST /api/licoes/{id}/falta
#[utoipa::path(
    post,
    path = "/api/licoes/{id}/falta",
    tag = "Lições",
    params(("id" = Uuid, Path, description = "Id da lição")),
    request_body = FaltaPayload,
    responses(
        (status = 200, description = "Falta aplicada (ou revertida) em todas as sub-lições"),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Lição ou aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn alternar_falta(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(licao_id): Path<Uuid>,
    Json(payload): Json<FaltaPayload>,
) -> Result<Json<Value>, AppError> {
    app_state
        .licao_service
        .alternar_falta(user.id, licao_id, payload.aluno_id, payload.falta)
        .await?;

    Ok(Json(json!({ "ok": true })))
}

// POST /api/salvar-entregas
#[utoipa::path(
    post,
    path = "/api/salvar-entregas",
    tag = "Lições",
    request_body = SalvarEntregasPayload,
    responses(
        (status = 200, description = "Status gravados via upsert"),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Lição não pertence ao professor")
    ),
    security(("api_jwt" = []))
)]
pub async fn salvar_entregas(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SalvarEntregasPayload>,
) -> Result<Json<Value>, AppError> {
    let gravadas = app_state
        .licao_service
        .salvar_entregas(user.id, payload.licao_id, payload.entregas)
        .await?;

    tracing::info!("{} entregas gravadas na lição {}", gravadas, payload.licao_id);
    Ok(Json(json!({ "ok": true })))
}
