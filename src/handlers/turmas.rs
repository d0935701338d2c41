// src/handlers/turmas.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::turma::{TurmaComAlunos, TurmaPayload},
};

// POST /api/turmas
#[utoipa::path(
    post,
    path = "/api/turmas",
    tag = "Turmas",
    request_body = TurmaPayload,
    responses(
        (status = 201, description = "Turma criada com o roster inicial", body = TurmaComAlunos),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_turma(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<TurmaPayload>,
) -> Result<(StatusCode, Json<TurmaComAlunos>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let turma = app_state.turma_service.criar_turma(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(turma)))
}

// PUT /api/turmas
#[utoipa::path(
    put,
    path = "/api/turmas",
    tag = "Turmas",
    request_body = TurmaPayload,
    responses(
        (status = 200, description = "Turma atualizada; alunos novos entram, nenhum sai", body = TurmaComAlunos),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Professor ainda não tem turma")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_turma(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<TurmaPayload>,
) -> Result<Json<TurmaComAlunos>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let turma = app_state
        .turma_service
        .atualizar_turma(user.id, payload)
        .await?;

    Ok(Json(turma))
}
