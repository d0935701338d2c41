// src/models/turma.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// A turma do professor: roster de alunos mais os catálogos declarados de
// disciplinas e materiais (TEXT[] no Postgres, Vec<String> no Rust).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Turma {
    pub id: Uuid,
    pub nome: String,
    pub user_id: Uuid,
    pub disciplinas: Vec<String>,
    pub materiais: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Aluno {
    pub id: Uuid,
    pub nome: String,
    pub turma_id: Uuid,
}

// Turma com o roster embutido, como o formulário de edição espera receber.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurmaComAlunos {
    #[serde(flatten)]
    pub turma: Turma,
    pub alunos: Vec<Aluno>,
}

// Payload de criação/atualização de turma. As listas são normalizadas
// (trim, deduplicação, remoção de vazios) antes da validação de tamanho.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurmaPayload {
    #[validate(length(min = 1, message = "O nome da turma é obrigatório."))]
    pub nome: String,
    #[serde(default)]
    pub alunos: Vec<String>,
    #[serde(default)]
    pub disciplinas: Vec<String>,
    #[serde(default)]
    pub materiais: Vec<String>,
}

// Versão enxuta para o endpoint de listagem de alunos.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlunoResumido {
    pub id: Uuid,
    pub nome: String,
}
