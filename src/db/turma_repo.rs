// src/db/turma_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::turma::{Aluno, AlunoResumido, Turma},
};

#[derive(Clone)]
pub struct TurmaRepository {
    pool: PgPool,
}

impl TurmaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn criar_turma<'e, E>(
        &self,
        executor: E,
        nome: &str,
        user_id: Uuid,
        disciplinas: &[String],
        materiais: &[String],
    ) -> Result<Turma, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let turma = sqlx::query_as::<_, Turma>(
            r#"
            INSERT INTO turmas (nome, user_id, disciplinas, materiais)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nome, user_id, disciplinas, materiais, created_at
            "#,
        )
        .bind(nome)
        .bind(user_id)
        .bind(disciplinas)
        .bind(materiais)
        .fetch_one(executor)
        .await?;

        Ok(turma)
    }

    pub async fn atualizar_turma<'e, E>(
        &self,
        executor: E,
        turma_id: Uuid,
        nome: &str,
        disciplinas: &[String],
        materiais: &[String],
    ) -> Result<Turma, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let turma = sqlx::query_as::<_, Turma>(
            r#"
            UPDATE turmas
            SET nome = $2, disciplinas = $3, materiais = $4
            WHERE id = $1
            RETURNING id, nome, user_id, disciplinas, materiais, created_at
            "#,
        )
        .bind(turma_id)
        .bind(nome)
        .bind(disciplinas)
        .bind(materiais)
        .fetch_one(executor)
        .await?;

        Ok(turma)
    }

    // Inserção em lote do roster via UNNEST, uma ida só ao banco.
    pub async fn criar_alunos<'e, E>(
        &self,
        executor: E,
        turma_id: Uuid,
        nomes: &[String],
    ) -> Result<Vec<Aluno>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if nomes.is_empty() {
            return Ok(Vec::new());
        }

        let alunos = sqlx::query_as::<_, Aluno>(
            r#"
            INSERT INTO alunos (nome, turma_id)
            SELECT t.nome, $2
            FROM UNNEST($1::text[]) AS t(nome)
            RETURNING id, nome, turma_id
            "#,
        )
        .bind(nomes)
        .bind(turma_id)
        .fetch_all(executor)
        .await?;

        Ok(alunos)
    }

    // A turma "corrente" do professor é sempre a criada por último.
    pub async fn ultima_turma_do_usuario(&self, user_id: Uuid) -> Result<Option<Turma>, AppError> {
        let turma = sqlx::query_as::<_, Turma>(
            r#"
            SELECT id, nome, user_id, disciplinas, materiais, created_at
            FROM turmas
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(turma)
    }

    pub async fn alunos_da_turma(&self, turma_id: Uuid) -> Result<Vec<Aluno>, AppError> {
        let alunos = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT id, nome, turma_id
            FROM alunos
            WHERE turma_id = $1
            ORDER BY nome ASC
            "#,
        )
        .bind(turma_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alunos)
    }

    // Alunos de todas as turmas do professor (o painel mensal enumera todos).
    pub async fn alunos_do_usuario(&self, user_id: Uuid) -> Result<Vec<Aluno>, AppError> {
        let alunos = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT a.id, a.nome, a.turma_id
            FROM alunos a
            INNER JOIN turmas t ON t.id = a.turma_id
            WHERE t.user_id = $1
            ORDER BY a.nome ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alunos)
    }

    pub async fn listar_alunos(&self) -> Result<Vec<AlunoResumido>, AppError> {
        let alunos = sqlx::query_as::<_, AlunoResumido>(
            r#"
            SELECT id, nome
            FROM alunos
            ORDER BY nome ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(alunos)
    }
}
