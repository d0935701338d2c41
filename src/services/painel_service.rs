// src/services/painel_service.rs
//
// Camada fina entre os repositórios e o agregador: cada visão carrega seu
// conjunto de trabalho do banco e delega a agregação (pura) ao agregador.

use uuid::Uuid;

use crate::{
    common::{error::AppError, periodo::Periodo},
    db::{EntregaRepository, TurmaRepository},
    models::painel::{AnaliseAlunoResposta, DisciplinaResumo, PainelResposta, ResumoAluno},
    services::agregador,
};

#[derive(Clone)]
pub struct PainelService {
    turma_repo: TurmaRepository,
    entrega_repo: EntregaRepository,
}

impl PainelService {
    pub fn new(turma_repo: TurmaRepository, entrega_repo: EntregaRepository) -> Self {
        Self {
            turma_repo,
            entrega_repo,
        }
    }

    /// Painel mensal: grade densa aluno x dia (todo dia do período aparece,
    /// mesmo sem entregas), ancorada na data de entrega da lição.
    pub async fn painel_mensal(
        &self,
        user_id: Uuid,
        periodo: Periodo,
    ) -> Result<PainelResposta, AppError> {
        let dias = periodo.dias();
        let alunos = self.turma_repo.alunos_do_usuario(user_id).await?;
        let entregas = self
            .entrega_repo
            .entregas_do_periodo(user_id, periodo.inicio, periodo.fim)
            .await?;

        Ok(PainelResposta {
            mes: periodo.rotulo_mes(),
            dias: agregador::colunas_de_dias(&dias),
            rows: agregador::grade_por_dia(&alunos, &entregas, &dias),
        })
    }

    /// Resumo por disciplina da turma inteira, pré-semeado pelo catálogo de
    /// disciplinas declarado na turma do professor.
    pub async fn disciplinas_da_turma(
        &self,
        user_id: Uuid,
        periodo: Periodo,
    ) -> Result<Vec<DisciplinaResumo>, AppError> {
        let catalogo = self
            .turma_repo
            .ultima_turma_do_usuario(user_id)
            .await?
            .map(|turma| turma.disciplinas)
            .unwrap_or_default();
        let entregas = self
            .entrega_repo
            .entregas_do_periodo(user_id, periodo.inicio, periodo.fim)
            .await?;

        Ok(agregador::resumo_por_disciplina(&entregas, Some(&catalogo)))
    }

    /// Analytics de um aluno: timeline esparsa por data de envio, resumo
    /// por disciplina (sem catálogo) e totais gerais. Aluno inexistente
    /// produz agregados vazios, não erro.
    pub async fn analise_aluno(&self, aluno_id: Uuid) -> Result<AnaliseAlunoResposta, AppError> {
        let entregas = self.entrega_repo.entregas_do_aluno(aluno_id).await?;

        Ok(AnaliseAlunoResposta {
            timeline: agregador::timeline_por_dia(&entregas),
            disciplinas: agregador::resumo_por_disciplina(&entregas, None),
            geral: agregador::resumo_geral(&entregas),
        })
    }

    /// Resumo por aluno das entregas atualizadas no período.
    pub async fn resumo_periodo(&self, periodo: Periodo) -> Result<Vec<ResumoAluno>, AppError> {
        let entregas = self
            .entrega_repo
            .entregas_atualizadas_no_periodo(periodo.inicio, periodo.fim)
            .await?;

        Ok(agregador::resumo_por_aluno(&entregas))
    }
}
