// src/db/entrega_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{licao::StatusEntrega, painel::EntregaDetalhada},
};

#[derive(Clone)]
pub struct EntregaRepository {
    pool: PgPool,
}

impl EntregaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fan-out das entregas na criação de uma lição: um INSERT só, via
    /// UNNEST, dentro da transação do chamador. Todo par nasce NAO_FEZ.
    pub async fn criar_em_lote<'e, E>(
        &self,
        executor: E,
        aluno_ids: &[Uuid],
        sub_licao_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if aluno_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO entregas_sub_licao (aluno_id, sub_licao_id)
            SELECT t.aluno_id, t.sub_licao_id
            FROM UNNEST($1::uuid[], $2::uuid[]) AS t(aluno_id, sub_licao_id)
            "#,
        )
        .bind(aluno_ids)
        .bind(sub_licao_ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Upsert atômico por par (aluno, sub-lição): nunca read-modify-write,
    /// para gravações concorrentes convergirem para a última escrita.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        aluno_id: Uuid,
        sub_licao_id: Uuid,
        status: StatusEntrega,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO entregas_sub_licao (aluno_id, sub_licao_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (aluno_id, sub_licao_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
            "#,
        )
        .bind(aluno_id)
        .bind(sub_licao_id)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(())
    }

    // --- LEITURAS ACHATADAS QUE ALIMENTAM O AGREGADOR ---

    // Painel mensal: entregas das turmas do professor cuja lição vence no
    // período; a data-âncora do bucket diário é a data de entrega da lição.
    pub async fn entregas_do_periodo(
        &self,
        user_id: Uuid,
        inicio: DateTime<Utc>,
        fim: DateTime<Utc>,
    ) -> Result<Vec<EntregaDetalhada>, AppError> {
        let entregas = sqlx::query_as::<_, EntregaDetalhada>(
            r#"
            SELECT
                e.aluno_id,
                a.nome AS aluno_nome,
                s.disciplina,
                e.status,
                l.data_entrega AS data_referencia
            FROM entregas_sub_licao e
            INNER JOIN alunos a ON a.id = e.aluno_id
            INNER JOIN sub_licoes s ON s.id = e.sub_licao_id
            INNER JOIN licoes l ON l.id = s.licao_id
            INNER JOIN turmas t ON t.id = a.turma_id
            WHERE t.user_id = $1
              AND l.data_entrega >= $2
              AND l.data_entrega <= $3
            "#,
        )
        .bind(user_id)
        .bind(inicio)
        .bind(fim)
        .fetch_all(&self.pool)
        .await?;

        Ok(entregas)
    }

    // Analytics por aluno: todas as entregas dele, ancoradas na data de
    // envio da lição. Aluno inexistente devolve lista vazia, não erro.
    pub async fn entregas_do_aluno(
        &self,
        aluno_id: Uuid,
    ) -> Result<Vec<EntregaDetalhada>, AppError> {
        let entregas = sqlx::query_as::<_, EntregaDetalhada>(
            r#"
            SELECT
                e.aluno_id,
                a.nome AS aluno_nome,
                s.disciplina,
                e.status,
                l.data_envio AS data_referencia
            FROM entregas_sub_licao e
            INNER JOIN alunos a ON a.id = e.aluno_id
            INNER JOIN sub_licoes s ON s.id = e.sub_licao_id
            INNER JOIN licoes l ON l.id = s.licao_id
            WHERE e.aluno_id = $1
            ORDER BY l.data_envio ASC
            "#,
        )
        .bind(aluno_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entregas)
    }

    // Resumo do período: agrupado pelo instante da última atualização da
    // entrega (quando o professor marcou), não pela data da lição.
    pub async fn entregas_atualizadas_no_periodo(
        &self,
        inicio: DateTime<Utc>,
        fim: DateTime<Utc>,
    ) -> Result<Vec<EntregaDetalhada>, AppError> {
        let entregas = sqlx::query_as::<_, EntregaDetalhada>(
            r#"
            SELECT
                e.aluno_id,
                a.nome AS aluno_nome,
                s.disciplina,
                e.status,
                e.updated_at AS data_referencia
            FROM entregas_sub_licao e
            INNER JOIN alunos a ON a.id = e.aluno_id
            INNER JOIN sub_licoes s ON s.id = e.sub_licao_id
            WHERE e.updated_at >= $1
              AND e.updated_at <= $2
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(&self.pool)
        .await?;

        Ok(entregas)
    }
}
