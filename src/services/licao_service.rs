// src/services/licao_service.rs
//
// Ciclo de vida da lição: criação com fan-out de entregas (alunos x
// sub-lições), edição com diff de três vias das sub-lições, gravação de
// status via upsert e o interruptor de falta por aluno. Toda mutação de
// múltiplas linhas roda dentro de uma única transação: aplicação parcial
// não é um modo de falha aceitável.

use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::{
    common::{error::AppError, periodo::parse_instante},
    db::{licao_repo::FiltroLicoes, EntregaRepository, LicaoRepository, TurmaRepository},
    models::licao::{
        EntregaInput, Licao, LicaoComSubLicoes, LicaoPayload, ListagemLicoes, StatusEntrega,
        SubLicaoInput,
    },
};

// --- HELPERS PUROS ---

/// Produto alunos x sub-lições como arrays paralelos, prontos para o
/// INSERT em lote via UNNEST. N alunos e M sub-lições geram N*M pares.
pub fn pares_fan_out(aluno_ids: &[Uuid], sub_licao_ids: &[Uuid]) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut alunos = Vec::with_capacity(aluno_ids.len() * sub_licao_ids.len());
    let mut subs = Vec::with_capacity(aluno_ids.len() * sub_licao_ids.len());
    for aluno_id in aluno_ids {
        for sub_licao_id in sub_licao_ids {
            alunos.push(*aluno_id);
            subs.push(*sub_licao_id);
        }
    }
    (alunos, subs)
}

#[derive(Debug)]
pub struct DiffSubLicoes {
    pub excluir: Vec<Uuid>,
    pub atualizar: Vec<SubLicaoInput>,
    pub criar: Vec<SubLicaoInput>,
}

/// Diff de três vias entre as sub-lições existentes e as submetidas:
/// id ausente = criar, id presente = atualizar, id existente não submetido
/// = excluir. Id submetido que não existe na lição é erro de validação.
pub fn diff_sub_licoes(
    existentes: &[Uuid],
    submetidas: Vec<SubLicaoInput>,
) -> Result<DiffSubLicoes, AppError> {
    let ids_existentes: HashSet<Uuid> = existentes.iter().copied().collect();
    let ids_submetidos: HashSet<Uuid> = submetidas.iter().filter_map(|s| s.id).collect();

    for id in &ids_submetidos {
        if !ids_existentes.contains(id) {
            return Err(AppError::DadosInvalidos("Sublição inválida".to_string()));
        }
    }

    let excluir = existentes
        .iter()
        .filter(|id| !ids_submetidos.contains(id))
        .copied()
        .collect();
    let (atualizar, criar) = submetidas.into_iter().partition(|s| s.id.is_some());

    Ok(DiffSubLicoes {
        excluir,
        atualizar,
        criar,
    })
}

/// Só passam entregas cujo aluno pertence à turma da lição e cuja
/// sub-lição pertence à própria lição; o resto é descartado em silêncio.
pub fn filtrar_entregas_validas(
    entregas: Vec<EntregaInput>,
    alunos_validos: &HashSet<Uuid>,
    sub_licoes_validas: &HashSet<Uuid>,
) -> Vec<EntregaInput> {
    entregas
        .into_iter()
        .filter(|e| {
            alunos_validos.contains(&e.aluno_id) && sub_licoes_validas.contains(&e.sub_licao_id)
        })
        .collect()
}

/// Expansão do interruptor de falta: liga = toda sub-lição do aluno vira
/// FALTA; desliga = tudo volta para NAO_FEZ. A escrita é última-que-vence
/// na linha inteira: um FEZ anterior é sobrescrito de propósito.
pub fn expandir_falta(
    sub_licao_ids: &[Uuid],
    aluno_id: Uuid,
    falta: bool,
) -> Vec<EntregaInput> {
    let status = if falta {
        StatusEntrega::Falta
    } else {
        StatusEntrega::NaoFez
    };
    sub_licao_ids
        .iter()
        .map(|sub_licao_id| EntregaInput {
            aluno_id,
            sub_licao_id: *sub_licao_id,
            status,
        })
        .collect()
}

fn paginas_totais(total: i64, page_size: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + page_size - 1) / page_size
    }
}

// --- SERVIÇO ---

#[derive(Clone)]
pub struct LicaoService {
    licao_repo: LicaoRepository,
    turma_repo: TurmaRepository,
    entrega_repo: EntregaRepository,
    pool: PgPool,
}

impl LicaoService {
    pub fn new(
        licao_repo: LicaoRepository,
        turma_repo: TurmaRepository,
        entrega_repo: EntregaRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            licao_repo,
            turma_repo,
            entrega_repo,
            pool,
        }
    }

    fn validar_payload(
        payload: LicaoPayload,
    ) -> Result<
        (
            Option<String>,
            chrono::DateTime<chrono::Utc>,
            chrono::DateTime<chrono::Utc>,
            Vec<SubLicaoInput>,
        ),
        AppError,
    > {
        let dados_invalidos = || AppError::DadosInvalidos("Dados inválidos".to_string());

        let data_envio = parse_instante(payload.data_envio.as_deref().ok_or_else(dados_invalidos)?)?;
        let data_entrega =
            parse_instante(payload.data_entrega.as_deref().ok_or_else(dados_invalidos)?)?;

        let sub_licoes: Vec<SubLicaoInput> = payload
            .sub_licoes
            .into_iter()
            .filter(SubLicaoInput::preenchida)
            .collect();
        if sub_licoes.is_empty() {
            return Err(dados_invalidos());
        }

        let titulo = payload
            .titulo
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok((titulo, data_envio, data_entrega, sub_licoes))
    }

    /// Cria a lição, suas sub-lições e o fan-out de entregas (toda
    /// combinação aluno x sub-lição nasce NAO_FEZ), tudo em uma transação.
    pub async fn criar_licao(
        &self,
        user_id: Uuid,
        payload: LicaoPayload,
    ) -> Result<Licao, AppError> {
        let (titulo, data_envio, data_entrega, sub_licoes) = Self::validar_payload(payload)?;

        let turma = self
            .turma_repo
            .ultima_turma_do_usuario(user_id)
            .await?
            .ok_or_else(|| {
                AppError::DadosInvalidos("Nenhuma turma encontrada para este usuário".to_string())
            })?;
        let alunos = self.turma_repo.alunos_da_turma(turma.id).await?;

        let mut tx = self.pool.begin().await?;

        let licao = self
            .licao_repo
            .criar_licao(&mut *tx, turma.id, titulo.as_deref(), data_envio, data_entrega)
            .await?;
        let criadas = self
            .criar_sub_licoes_em_lote(&mut tx, licao.id, &sub_licoes, 0)
            .await?;

        let aluno_ids: Vec<Uuid> = alunos.iter().map(|a| a.id).collect();
        let (fan_alunos, fan_subs) = pares_fan_out(&aluno_ids, &criadas);
        self.entrega_repo
            .criar_em_lote(&mut *tx, &fan_alunos, &fan_subs)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Lição {} criada: {} sub-lições, {} entregas",
            licao.id,
            criadas.len(),
            fan_alunos.len()
        );
        Ok(licao)
    }

    /// Edita a lição aplicando o diff de três vias nas sub-lições.
    /// Exclusões cascateiam as entregas; criações ganham fan-out próprio.
    pub async fn atualizar_licao(
        &self,
        user_id: Uuid,
        licao_id: Uuid,
        payload: LicaoPayload,
    ) -> Result<Uuid, AppError> {
        let (titulo, data_envio, data_entrega, sub_licoes) = Self::validar_payload(payload)?;

        let licao = self
            .licao_repo
            .buscar_licao_do_usuario(licao_id, user_id)
            .await?
            .ok_or(AppError::NaoEncontrado("Lição"))?;

        let existentes = self.licao_repo.sub_licoes_da_licao(licao.id).await?;
        let ids_existentes: Vec<Uuid> = existentes.iter().map(|s| s.id).collect();

        // Validação antes de qualquer mutação.
        let diff = diff_sub_licoes(&ids_existentes, sub_licoes)?;

        let alunos = self.turma_repo.alunos_da_turma(licao.turma_id).await?;

        let mut tx = self.pool.begin().await?;

        self.licao_repo
            .atualizar_licao(&mut *tx, licao.id, titulo.as_deref(), data_envio, data_entrega)
            .await?;

        for sub in &diff.atualizar {
            let Some(id) = sub.id else { continue };
            self.licao_repo
                .atualizar_sub_licao(
                    &mut *tx,
                    id,
                    sub.disciplina.trim(),
                    sub.material.trim(),
                    sub.descricao.trim(),
                )
                .await?;
        }

        self.licao_repo.excluir_sub_licoes(&mut *tx, &diff.excluir).await?;

        if !diff.criar.is_empty() {
            let criadas = self
                .criar_sub_licoes_em_lote(&mut tx, licao.id, &diff.criar, existentes.len() as i32)
                .await?;
            let aluno_ids: Vec<Uuid> = alunos.iter().map(|a| a.id).collect();
            let (fan_alunos, fan_subs) = pares_fan_out(&aluno_ids, &criadas);
            self.entrega_repo
                .criar_em_lote(&mut *tx, &fan_alunos, &fan_subs)
                .await?;
        }

        tx.commit().await?;
        Ok(licao.id)
    }

    async fn criar_sub_licoes_em_lote(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        licao_id: Uuid,
        sub_licoes: &[SubLicaoInput],
        ordem_base: i32,
    ) -> Result<Vec<Uuid>, AppError> {
        let disciplinas: Vec<String> =
            sub_licoes.iter().map(|s| s.disciplina.trim().to_string()).collect();
        let materiais: Vec<String> =
            sub_licoes.iter().map(|s| s.material.trim().to_string()).collect();
        let descricoes: Vec<String> =
            sub_licoes.iter().map(|s| s.descricao.trim().to_string()).collect();
        let ordens: Vec<i32> = (0..sub_licoes.len() as i32).map(|i| ordem_base + i).collect();

        let criadas = self
            .licao_repo
            .criar_sub_licoes(&mut **tx, licao_id, &disciplinas, &materiais, &descricoes, &ordens)
            .await?;
        Ok(criadas.into_iter().map(|s| s.id).collect())
    }

    /// Grava o lote de status submetido pelo formulário da lição. Entradas
    /// que não pertencem à lição/turma são descartadas; as demais viram
    /// upserts atômicos dentro de uma transação (idempotente: reenviar o
    /// mesmo payload produz o mesmo estado).
    pub async fn salvar_entregas(
        &self,
        user_id: Uuid,
        licao_id: Uuid,
        entregas: Vec<EntregaInput>,
    ) -> Result<usize, AppError> {
        let licao = self
            .licao_repo
            .buscar_licao_do_usuario(licao_id, user_id)
            .await?
            .ok_or(AppError::NaoEncontrado("Lição"))?;

        let alunos_validos: HashSet<Uuid> = self
            .turma_repo
            .alunos_da_turma(licao.turma_id)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let sub_licoes_validas: HashSet<Uuid> = self
            .licao_repo
            .sub_licoes_da_licao(licao.id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let validas = filtrar_entregas_validas(entregas, &alunos_validos, &sub_licoes_validas);
        if validas.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for entrega in &validas {
            self.entrega_repo
                .upsert(&mut *tx, entrega.aluno_id, entrega.sub_licao_id, entrega.status)
                .await?;
        }
        tx.commit().await?;

        Ok(validas.len())
    }

    /// Interruptor "faltou a lição inteira": marca (ou desmarca) todas as
    /// sub-lições do aluno nesta lição em uma única operação transacional.
    pub async fn alternar_falta(
        &self,
        user_id: Uuid,
        licao_id: Uuid,
        aluno_id: Uuid,
        falta: bool,
    ) -> Result<(), AppError> {
        let licao = self
            .licao_repo
            .buscar_licao_do_usuario(licao_id, user_id)
            .await?
            .ok_or(AppError::NaoEncontrado("Lição"))?;

        let pertence = self
            .turma_repo
            .alunos_da_turma(licao.turma_id)
            .await?
            .iter()
            .any(|a| a.id == aluno_id);
        if !pertence {
            return Err(AppError::NaoEncontrado("Aluno"));
        }

        let sub_licao_ids: Vec<Uuid> = self
            .licao_repo
            .sub_licoes_da_licao(licao.id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let entradas = expandir_falta(&sub_licao_ids, aluno_id, falta);

        let mut tx = self.pool.begin().await?;
        for entrega in &entradas {
            self.entrega_repo
                .upsert(&mut *tx, entrega.aluno_id, entrega.sub_licao_id, entrega.status)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Listagem paginada com filtros aplicados na query, nunca no agregador.
    pub async fn listar_licoes(
        &self,
        page: i64,
        page_size: i64,
        filtro: FiltroLicoes,
    ) -> Result<ListagemLicoes, AppError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let total = self.licao_repo.contar_licoes(&filtro).await?;
        let licoes = self
            .licao_repo
            .listar_licoes(&filtro, page_size, (page - 1) * page_size)
            .await?;

        let licao_ids: Vec<Uuid> = licoes.iter().map(|l| l.id).collect();
        let mut por_licao: HashMap<Uuid, Vec<_>> = HashMap::new();
        for sub in self.licao_repo.sub_licoes_das_licoes(&licao_ids).await? {
            por_licao.entry(sub.licao_id).or_default().push(sub);
        }

        let items = licoes
            .into_iter()
            .map(|licao| {
                let sub_licoes = por_licao.remove(&licao.id).unwrap_or_default();
                LicaoComSubLicoes { licao, sub_licoes }
            })
            .collect();

        Ok(ListagemLicoes {
            items,
            total_pages: paginas_totais(total, page_size),
            disciplinas_disponiveis: self.licao_repo.disciplinas_disponiveis().await?,
            materiais_disponiveis: self.licao_repo.materiais_disponiveis().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(id: Option<Uuid>) -> SubLicaoInput {
        SubLicaoInput {
            id,
            disciplina: "Matemática".to_string(),
            material: "Livro".to_string(),
            descricao: "Página 10".to_string(),
        }
    }

    #[test]
    fn fan_out_gera_n_vezes_m_pares() {
        let alunos: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let subs: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();

        let (fan_alunos, fan_subs) = pares_fan_out(&alunos, &subs);
        assert_eq!(fan_alunos.len(), 6);
        assert_eq!(fan_subs.len(), 6);

        // Cada par (aluno, sub-lição) aparece exatamente uma vez.
        let pares: HashSet<(Uuid, Uuid)> = fan_alunos
            .iter()
            .zip(&fan_subs)
            .map(|(a, s)| (*a, *s))
            .collect();
        assert_eq!(pares.len(), 6);
    }

    #[test]
    fn fan_out_sem_alunos_e_vazio() {
        let subs = vec![Uuid::new_v4()];
        let (fan_alunos, fan_subs) = pares_fan_out(&[], &subs);
        assert!(fan_alunos.is_empty() && fan_subs.is_empty());
    }

    #[test]
    fn diff_particiona_excluir_atualizar_criar() {
        let mantida = Uuid::new_v4();
        let removida = Uuid::new_v4();
        let existentes = vec![mantida, removida];
        let submetidas = vec![sub(Some(mantida)), sub(None)];

        let diff = diff_sub_licoes(&existentes, submetidas).unwrap();
        assert_eq!(diff.excluir, vec![removida]);
        assert_eq!(diff.atualizar.len(), 1);
        assert_eq!(diff.atualizar[0].id, Some(mantida));
        assert_eq!(diff.criar.len(), 1);
        assert!(diff.criar[0].id.is_none());
    }

    #[test]
    fn diff_rejeita_id_que_nao_pertence_a_licao() {
        let existentes = vec![Uuid::new_v4()];
        let submetidas = vec![sub(Some(Uuid::new_v4()))];
        assert!(matches!(
            diff_sub_licoes(&existentes, submetidas),
            Err(AppError::DadosInvalidos(_))
        ));
    }

    #[test]
    fn filtra_entregas_de_fora_da_turma_ou_da_licao() {
        let aluno_ok = Uuid::new_v4();
        let sub_ok = Uuid::new_v4();
        let alunos: HashSet<Uuid> = [aluno_ok].into();
        let subs: HashSet<Uuid> = [sub_ok].into();

        let entregas = vec![
            EntregaInput {
                aluno_id: aluno_ok,
                sub_licao_id: sub_ok,
                status: StatusEntrega::Fez,
            },
            EntregaInput {
                aluno_id: Uuid::new_v4(),
                sub_licao_id: sub_ok,
                status: StatusEntrega::Fez,
            },
            EntregaInput {
                aluno_id: aluno_ok,
                sub_licao_id: Uuid::new_v4(),
                status: StatusEntrega::NaoFez,
            },
        ];

        let validas = filtrar_entregas_validas(entregas, &alunos, &subs);
        assert_eq!(validas.len(), 1);
        assert_eq!(validas[0].aluno_id, aluno_ok);
    }

    #[test]
    fn expandir_falta_liga_tudo_para_falta_e_desliga_para_nao_fez() {
        let aluno = Uuid::new_v4();
        let subs: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        let ligado = expandir_falta(&subs, aluno, true);
        assert_eq!(ligado.len(), 3);
        assert!(ligado.iter().all(|e| e.status == StatusEntrega::Falta));

        // Desligar nunca restaura um FEZ anterior: volta tudo a NAO_FEZ.
        let desligado = expandir_falta(&subs, aluno, false);
        assert!(desligado.iter().all(|e| e.status == StatusEntrega::NaoFez));
        assert!(desligado.iter().all(|e| e.aluno_id == aluno));
    }

    #[test]
    fn paginas_totais_arredonda_para_cima() {
        assert_eq!(paginas_totais(0, 5), 0);
        assert_eq!(paginas_totais(5, 5), 1);
        assert_eq!(paginas_totais(6, 5), 2);
    }
}
