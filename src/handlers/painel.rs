// src/handlers/painel.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::{error::AppError, periodo::Periodo},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        painel::{AnaliseAlunoResposta, DisciplinaResumo, PainelResposta, ResumoAluno},
        turma::AlunoResumido,
    },
};

#[derive(Debug, Deserialize)]
pub struct PeriodoQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Painel",
    params(
        ("from" = Option<String>, Query, description = "Início do período (RFC 3339 ou YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Fim do período")
    ),
    responses(
        (status = 200, description = "Grade mensal de entregas por aluno e dia", body = PainelResposta),
        (status = 400, description = "Intervalo de data inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PeriodoQuery>,
) -> Result<Json<PainelResposta>, AppError> {
    let periodo = Periodo::from_params(query.from.as_deref(), query.to.as_deref())?;

    let painel = app_state
        .painel_service
        .painel_mensal(user.id, periodo)
        .await?;

    Ok(Json(painel))
}

// GET /api/dashboard/disciplinas
#[utoipa::path(
    get,
    path = "/api/dashboard/disciplinas",
    tag = "Painel",
    params(
        ("from" = Option<String>, Query, description = "Início do período"),
        ("to" = Option<String>, Query, description = "Fim do período")
    ),
    responses(
        (status = 200, description = "Resumo por disciplina pré-semeado pelo catálogo da turma", body = Vec<DisciplinaResumo>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard_disciplinas(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PeriodoQuery>,
) -> Result<Json<Vec<DisciplinaResumo>>, AppError> {
    let periodo = Periodo::from_params(query.from.as_deref(), query.to.as_deref())?;

    let disciplinas = app_state
        .painel_service
        .disciplinas_da_turma(user.id, periodo)
        .await?;

    Ok(Json(disciplinas))
}

// GET /api/resumo
// Contrato do cliente: sem `from`/`to` completos, responde lista vazia.
#[utoipa::path(
    get,
    path = "/api/resumo",
    tag = "Painel",
    params(
        ("from" = Option<String>, Query, description = "Início do período (obrigatório para haver resultado)"),
        ("to" = Option<String>, Query, description = "Fim do período")
    ),
    responses(
        (status = 200, description = "Contagens por aluno no período", body = Vec<ResumoAluno>),
        (status = 400, description = "Intervalo de data inválido")
    )
)]
pub async fn resumo(
    State(app_state): State<AppState>,
    Query(query): Query<PeriodoQuery>,
) -> Result<Json<Vec<ResumoAluno>>, AppError> {
    let (Some(from), Some(to)) = (query.from.as_deref(), query.to.as_deref()) else {
        return Ok(Json(Vec::new()));
    };

    let periodo = Periodo::from_params(Some(from), Some(to))?;
    let resumos = app_state.painel_service.resumo_periodo(periodo).await?;

    Ok(Json(resumos))
}

#[derive(Debug, Deserialize)]
pub struct AlunoQuery {
    pub id: Option<Uuid>,
}

// GET /api/aluno-analytics
#[utoipa::path(
    get,
    path = "/api/aluno-analytics",
    tag = "Painel",
    params(
        ("id" = Uuid, Query, description = "ID do aluno")
    ),
    responses(
        (status = 200, description = "Timeline, disciplinas e resumo geral do aluno", body = AnaliseAlunoResposta),
        (status = 400, description = "Aluno não informado")
    )
)]
pub async fn analise_aluno(
    State(app_state): State<AppState>,
    Query(query): Query<AlunoQuery>,
) -> Result<Json<AnaliseAlunoResposta>, AppError> {
    let aluno_id = query
        .id
        .ok_or_else(|| AppError::DadosInvalidos("Aluno não informado".to_string()))?;

    // Aluno inexistente produz agregados vazios, não erro.
    let analise = app_state.painel_service.analise_aluno(aluno_id).await?;

    Ok(Json(analise))
}

// GET /api/alunos
#[utoipa::path(
    get,
    path = "/api/alunos",
    tag = "Painel",
    responses(
        (status = 200, description = "Todos os alunos, ordenados por nome", body = Vec<AlunoResumido>)
    )
)]
pub async fn listar_alunos(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<AlunoResumido>>, AppError> {
    let alunos = app_state.turma_service.listar_alunos().await?;
    Ok(Json(alunos))
}
