// src/services/turma_service.rs

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TurmaRepository,
    models::turma::{AlunoResumido, TurmaComAlunos, TurmaPayload},
};

/// Normaliza uma lista vinda do formulário: trim, remoção de vazios e
/// deduplicação preservando a primeira ocorrência.
pub fn normalizar_lista(valores: &[String]) -> Vec<String> {
    let mut vistos = HashSet::new();
    valores
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| vistos.insert(v.clone()))
        .collect()
}

#[derive(Clone)]
pub struct TurmaService {
    repo: TurmaRepository,
    pool: PgPool,
}

impl TurmaService {
    pub fn new(repo: TurmaRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn criar_turma(
        &self,
        user_id: Uuid,
        payload: TurmaPayload,
    ) -> Result<TurmaComAlunos, AppError> {
        let nome = payload.nome.trim().to_string();
        let alunos = normalizar_lista(&payload.alunos);
        let disciplinas = normalizar_lista(&payload.disciplinas);
        let materiais = normalizar_lista(&payload.materiais);

        if nome.is_empty() || alunos.is_empty() || disciplinas.is_empty() || materiais.is_empty() {
            return Err(AppError::DadosInvalidos("Dados inválidos".to_string()));
        }

        // Turma e roster nascem juntos ou não nascem.
        let mut tx = self.pool.begin().await?;
        let turma = self
            .repo
            .criar_turma(&mut *tx, &nome, user_id, &disciplinas, &materiais)
            .await?;
        let alunos = self.repo.criar_alunos(&mut *tx, turma.id, &alunos).await?;
        tx.commit().await?;

        Ok(TurmaComAlunos { turma, alunos })
    }

    pub async fn atualizar_turma(
        &self,
        user_id: Uuid,
        payload: TurmaPayload,
    ) -> Result<TurmaComAlunos, AppError> {
        let nome = payload.nome.trim().to_string();
        let alunos = normalizar_lista(&payload.alunos);
        let disciplinas = normalizar_lista(&payload.disciplinas);
        let materiais = normalizar_lista(&payload.materiais);

        if nome.is_empty() || alunos.is_empty() || disciplinas.is_empty() || materiais.is_empty() {
            return Err(AppError::DadosInvalidos("Dados inválidos".to_string()));
        }

        let turma = self
            .repo
            .ultima_turma_do_usuario(user_id)
            .await?
            .ok_or(AppError::NaoEncontrado("Turma"))?;

        // Só entram no roster os nomes que ainda não existem; remoção de
        // aluno não acontece por aqui (apagaria o histórico de entregas).
        let existentes: HashSet<String> = self
            .repo
            .alunos_da_turma(turma.id)
            .await?
            .into_iter()
            .map(|a| a.nome)
            .collect();
        let novos: Vec<String> = alunos
            .into_iter()
            .filter(|nome| !existentes.contains(nome))
            .collect();

        let mut tx = self.pool.begin().await?;
        let turma = self
            .repo
            .atualizar_turma(&mut *tx, turma.id, &nome, &disciplinas, &materiais)
            .await?;
        self.repo.criar_alunos(&mut *tx, turma.id, &novos).await?;
        tx.commit().await?;

        let alunos = self.repo.alunos_da_turma(turma.id).await?;
        Ok(TurmaComAlunos { turma, alunos })
    }

    pub async fn listar_alunos(&self) -> Result<Vec<AlunoResumido>, AppError> {
        self.repo.listar_alunos().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizar_lista_apara_deduplica_e_remove_vazios() {
        let entrada = vec![
            " Ana ".to_string(),
            "Bruno".to_string(),
            "".to_string(),
            "Ana".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalizar_lista(&entrada), vec!["Ana", "Bruno"]);
    }

    #[test]
    fn normalizar_lista_preserva_a_ordem_de_chegada() {
        let entrada = vec!["Zeca".to_string(), "Ana".to_string(), "Zeca".to_string()];
        assert_eq!(normalizar_lista(&entrada), vec!["Zeca", "Ana"]);
    }
}
