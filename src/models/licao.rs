// src/models/licao.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE status_entrega do banco. Variante de três estados:
// FEZ / NAO_FEZ / FALTA. Toda agregação trata os três explicitamente.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "status_entrega", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEntrega {
    Fez,
    NaoFez,
    Falta,
}

// --- LIÇÃO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Licao {
    pub id: Uuid,
    pub titulo: Option<String>,
    pub data_envio: DateTime<Utc>,
    pub data_entrega: DateTime<Utc>,
    pub turma_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// Uma unidade (disciplina, material, descrição) dentro da lição.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubLicao {
    pub id: Uuid,
    pub disciplina: String,
    pub material: String,
    pub descricao: String,
    pub ordem: i32,
    pub licao_id: Uuid,
}

// Item da listagem paginada, com as sub-lições embutidas.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicaoComSubLicoes {
    #[serde(flatten)]
    pub licao: Licao,
    pub sub_licoes: Vec<SubLicao>,
}

// O registro agregado: status de um aluno para uma sub-lição.
// Par (aluno_id, sub_licao_id) único no banco; escrita sempre via upsert.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntregaSubLicao {
    pub id: Uuid,
    pub aluno_id: Uuid,
    pub sub_licao_id: Uuid,
    pub status: StatusEntrega,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

// Sub-lição submetida no formulário. `id` presente = atualizar existente;
// ausente = criar. Linhas em branco são filtradas antes da validação.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubLicaoInput {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub disciplina: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub descricao: String,
}

impl SubLicaoInput {
    pub fn preenchida(&self) -> bool {
        !self.disciplina.trim().is_empty()
            && !self.material.trim().is_empty()
            && !self.descricao.trim().is_empty()
    }
}

// Criação e atualização de lição compartilham o mesmo formato.
// As datas chegam como texto e são validadas cedo (RFC 3339 ou YYYY-MM-DD).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicaoPayload {
    pub titulo: Option<String>,
    pub data_envio: Option<String>,
    pub data_entrega: Option<String>,
    #[serde(default)]
    pub sub_licoes: Vec<SubLicaoInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntregaInput {
    pub aluno_id: Uuid,
    pub sub_licao_id: Uuid,
    pub status: StatusEntrega,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalvarEntregasPayload {
    pub licao_id: Uuid,
    #[serde(default)]
    pub entregas: Vec<EntregaInput>,
}

// Interruptor "faltou a lição inteira" de um aluno.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaltaPayload {
    pub aluno_id: Uuid,
    pub falta: bool,
}

// Resposta da listagem paginada.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListagemLicoes {
    pub items: Vec<LicaoComSubLicoes>,
    pub total_pages: i64,
    pub disciplinas_disponiveis: Vec<String>,
    pub materiais_disponiveis: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_licao_em_branco_nao_conta_como_preenchida() {
        let em_branco = SubLicaoInput {
            id: None,
            disciplina: "Matemática".to_string(),
            material: "  ".to_string(),
            descricao: "Página 10".to_string(),
        };
        assert!(!em_branco.preenchida());

        let completa = SubLicaoInput {
            id: None,
            disciplina: "Matemática".to_string(),
            material: "Livro".to_string(),
            descricao: "Página 10".to_string(),
        };
        assert!(completa.preenchida());
    }

    #[test]
    fn status_serializa_nos_valores_do_contrato() {
        assert_eq!(serde_json::to_string(&StatusEntrega::Fez).unwrap(), "\"FEZ\"");
        assert_eq!(
            serde_json::to_string(&StatusEntrega::NaoFez).unwrap(),
            "\"NAO_FEZ\""
        );
        assert_eq!(
            serde_json::to_string(&StatusEntrega::Falta).unwrap(),
            "\"FALTA\""
        );
    }

    #[test]
    fn status_desserializa_do_payload_do_cliente() {
        let status: StatusEntrega = serde_json::from_str("\"FALTA\"").unwrap();
        assert_eq!(status, StatusEntrega::Falta);
    }
}
