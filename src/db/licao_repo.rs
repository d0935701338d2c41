// src/db/licao_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::licao::{Licao, SubLicao},
};

// Filtros da listagem paginada, aplicados na query (não no agregador).
#[derive(Debug, Default, Clone)]
pub struct FiltroLicoes {
    pub search: Option<String>,
    pub disciplina: Option<String>,
    pub material: Option<String>,
}

const COLUNAS_LICAO: &str = "id, titulo, data_envio, data_entrega, turma_id, created_at";

// Cláusula compartilhada entre contagem e listagem. Filtros ausentes viram
// binds NULL e a condição correspondente é neutralizada.
const WHERE_FILTROS: &str = r#"
    ($1::text IS NULL OR l.titulo ILIKE '%' || $1 || '%')
    AND (
        ($2::text IS NULL AND $3::text IS NULL)
        OR EXISTS (
            SELECT 1 FROM sub_licoes s
            WHERE s.licao_id = l.id
              AND ($2::text IS NULL OR s.disciplina = $2)
              AND ($3::text IS NULL OR s.material = $3)
        )
    )
"#;

#[derive(Clone)]
pub struct LicaoRepository {
    pool: PgPool,
}

impl LicaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn criar_licao<'e, E>(
        &self,
        executor: E,
        turma_id: Uuid,
        titulo: Option<&str>,
        data_envio: DateTime<Utc>,
        data_entrega: DateTime<Utc>,
    ) -> Result<Licao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let licao = sqlx::query_as::<_, Licao>(&format!(
            r#"
            INSERT INTO licoes (titulo, data_envio, data_entrega, turma_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUNAS_LICAO}
            "#
        ))
        .bind(titulo)
        .bind(data_envio)
        .bind(data_entrega)
        .bind(turma_id)
        .fetch_one(executor)
        .await?;

        Ok(licao)
    }

    pub async fn atualizar_licao<'e, E>(
        &self,
        executor: E,
        licao_id: Uuid,
        titulo: Option<&str>,
        data_envio: DateTime<Utc>,
        data_entrega: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE licoes
            SET titulo = $2, data_envio = $3, data_entrega = $4
            WHERE id = $1
            "#,
        )
        .bind(licao_id)
        .bind(titulo)
        .bind(data_envio)
        .bind(data_entrega)
        .execute(executor)
        .await?;

        Ok(())
    }

    // Só devolve a lição se ela pertencer a uma turma do professor.
    pub async fn buscar_licao_do_usuario(
        &self,
        licao_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Licao>, AppError> {
        let licao = sqlx::query_as::<_, Licao>(
            r#"
            SELECT l.id, l.titulo, l.data_envio, l.data_entrega, l.turma_id, l.created_at
            FROM licoes l
            INNER JOIN turmas t ON t.id = l.turma_id
            WHERE l.id = $1 AND t.user_id = $2
            "#,
        )
        .bind(licao_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(licao)
    }

    // Inserção em lote das sub-lições, preservando a ordem submetida.
    pub async fn criar_sub_licoes<'e, E>(
        &self,
        executor: E,
        licao_id: Uuid,
        disciplinas: &[String],
        materiais: &[String],
        descricoes: &[String],
        ordens: &[i32],
    ) -> Result<Vec<SubLicao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if disciplinas.is_empty() {
            return Ok(Vec::new());
        }

        let sub_licoes = sqlx::query_as::<_, SubLicao>(
            r#"
            INSERT INTO sub_licoes (disciplina, material, descricao, ordem, licao_id)
            SELECT t.disciplina, t.material, t.descricao, t.ordem, $5
            FROM UNNEST($1::text[], $2::text[], $3::text[], $4::int[])
                AS t(disciplina, material, descricao, ordem)
            RETURNING id, disciplina, material, descricao, ordem, licao_id
            "#,
        )
        .bind(disciplinas)
        .bind(materiais)
        .bind(descricoes)
        .bind(ordens)
        .bind(licao_id)
        .fetch_all(executor)
        .await?;

        Ok(sub_licoes)
    }

    pub async fn atualizar_sub_licao<'e, E>(
        &self,
        executor: E,
        sub_licao_id: Uuid,
        disciplina: &str,
        material: &str,
        descricao: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE sub_licoes
            SET disciplina = $2, material = $3, descricao = $4
            WHERE id = $1
            "#,
        )
        .bind(sub_licao_id)
        .bind(disciplina)
        .bind(material)
        .bind(descricao)
        .execute(executor)
        .await?;

        Ok(())
    }

    // As entregas associadas caem junto via ON DELETE CASCADE.
    pub async fn excluir_sub_licoes<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM sub_licoes WHERE id = ANY($1)")
            .bind(ids)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn sub_licoes_da_licao(&self, licao_id: Uuid) -> Result<Vec<SubLicao>, AppError> {
        let sub_licoes = sqlx::query_as::<_, SubLicao>(
            r#"
            SELECT id, disciplina, material, descricao, ordem, licao_id
            FROM sub_licoes
            WHERE licao_id = $1
            ORDER BY ordem ASC
            "#,
        )
        .bind(licao_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sub_licoes)
    }

    pub async fn sub_licoes_das_licoes(
        &self,
        licao_ids: &[Uuid],
    ) -> Result<Vec<SubLicao>, AppError> {
        if licao_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sub_licoes = sqlx::query_as::<_, SubLicao>(
            r#"
            SELECT id, disciplina, material, descricao, ordem, licao_id
            FROM sub_licoes
            WHERE licao_id = ANY($1)
            ORDER BY ordem ASC
            "#,
        )
        .bind(licao_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(sub_licoes)
    }

    pub async fn contar_licoes(&self, filtro: &FiltroLicoes) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM licoes l WHERE {WHERE_FILTROS}"
        ))
        .bind(filtro.search.as_deref())
        .bind(filtro.disciplina.as_deref())
        .bind(filtro.material.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    pub async fn listar_licoes(
        &self,
        filtro: &FiltroLicoes,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Licao>, AppError> {
        let licoes = sqlx::query_as::<_, Licao>(&format!(
            r#"
            SELECT {COLUNAS_LICAO}
            FROM licoes l
            WHERE {WHERE_FILTROS}
            ORDER BY l.data_envio DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filtro.search.as_deref())
        .bind(filtro.disciplina.as_deref())
        .bind(filtro.material.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(licoes)
    }

    // Catálogo exibido nos filtros: disciplinas/materiais declarados nas
    // turmas unidos aos valores realmente observados nas sub-lições.
    pub async fn disciplinas_disponiveis(&self) -> Result<Vec<String>, AppError> {
        let disciplinas = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT disciplina FROM (
                SELECT UNNEST(disciplinas) AS disciplina FROM turmas
                UNION
                SELECT disciplina FROM sub_licoes
            ) todas
            ORDER BY disciplina ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(disciplinas)
    }

    pub async fn materiais_disponiveis(&self) -> Result<Vec<String>, AppError> {
        let materiais = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT material FROM (
                SELECT UNNEST(materiais) AS material FROM turmas
                UNION
                SELECT material FROM sub_licoes
            ) todos
            ORDER BY material ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(materiais)
    }
}
