// src/models/painel.rs
//
// Tipos das visões agregadas do painel: linha "achatada" que alimenta o
// agregador e os formatos aninhados que o cliente renderiza direto.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

// Uma entrega já juntada com aluno, disciplina e a data-âncora da visão
// (data de entrega da lição, data de envio ou updated_at, conforme a query).
#[derive(Debug, Clone, FromRow)]
pub struct EntregaDetalhada {
    pub aluno_id: Uuid,
    pub aluno_nome: String,
    pub disciplina: String,
    pub status: crate::models::licao::StatusEntrega,
    pub data_referencia: DateTime<Utc>,
}

// --- PAINEL MENSAL (grade por aluno x dia) ---

// Coluna do eixo de dias: chave "YYYY-MM-DD" e o número do dia para o rótulo.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiaColuna {
    pub key: String,
    pub label: u32,
}

// Célula da grade. total == 0 significa "sem dados" (diferente de "tudo
// feito"); `pendentes` lista as disciplinas NAO_FEZ/FALTA em ordem pt-BR.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiaResumo {
    pub total: u32,
    pub fez: u32,
    pub falta: u32,
    pub pendentes: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinhaAluno {
    pub nome: String,
    pub total_fez: u32,
    pub total_geral: u32,
    pub por_dia: BTreeMap<String, DiaResumo>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PainelResposta {
    pub mes: String,
    pub dias: Vec<DiaColuna>,
    pub rows: Vec<LinhaAluno>,
}

// --- ANALYTICS POR ALUNO ---

// Ponto da timeline (esparsa: dias sem entrega ficam de fora).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePonto {
    pub data: String,
    pub fez: u32,
    pub nao_fez: u32,
    pub falta: u32,
    pub disciplinas_fez: Vec<String>,
    pub disciplinas_nao_fez: Vec<String>,
    pub disciplinas_falta: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisciplinaResumo {
    pub disciplina: String,
    pub fez: u32,
    pub nao_fez: u32,
    pub falta: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoGeral {
    pub fez: u32,
    pub nao_fez: u32,
    pub falta: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnaliseAlunoResposta {
    pub timeline: Vec<TimelinePonto>,
    pub disciplinas: Vec<DisciplinaResumo>,
    pub geral: ResumoGeral,
}

// --- RESUMO POR PERÍODO ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoAluno {
    pub nome: String,
    pub fez: u32,
    pub nao_fez: u32,
    pub falta: u32,
}
