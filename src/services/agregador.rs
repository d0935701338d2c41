// src/services/agregador.rs
//
// O agregador de entregas: transforma a lista achatada de entregas
// (aluno, disciplina, status, data-âncora) nas três visões derivadas do
// painel. Funções puras, sem I/O; cada chamada é determinística dado o
// input. Um único caminho de código cobre os três status (FEZ / NAO_FEZ /
// FALTA); não existe variante binária paralela.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

use crate::models::{
    licao::StatusEntrega,
    painel::{
        DiaColuna, DiaResumo, DisciplinaResumo, EntregaDetalhada, LinhaAluno, ResumoAluno,
        ResumoGeral, TimelinePonto,
    },
    turma::Aluno,
};

/// Chave do bucket diário: truncagem do instante à data UTC.
pub fn dia_utc(instante: DateTime<Utc>) -> NaiveDate {
    instante.date_naive()
}

fn chave_dia(dia: NaiveDate) -> String {
    dia.format("%Y-%m-%d").to_string()
}

/// Colunas do eixo de dias do painel (chave ISO + número do dia).
pub fn colunas_de_dias(dias: &[NaiveDate]) -> Vec<DiaColuna> {
    dias.iter()
        .map(|dia| DiaColuna {
            key: chave_dia(*dia),
            label: dia.day(),
        })
        .collect()
}

// --- ORDENAÇÃO pt-BR ---

// Chave de colação: minúsculas com acentos dobrados (á→a, ç→c...).
// Suficiente para nomes de disciplinas e alunos; desempate pela string crua.
fn chave_ptbr(texto: &str) -> String {
    texto
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            outro => outro,
        })
        .collect()
}

fn ordenar_ptbr(valores: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut valores: Vec<String> = valores.into_iter().collect();
    valores.sort_by(|a, b| chave_ptbr(a).cmp(&chave_ptbr(b)).then_with(|| a.cmp(b)));
    valores
}

// --- OPERAÇÃO A: TIMELINE DIÁRIA (esparsa) ---

#[derive(Default)]
struct TimelineAcc {
    fez: u32,
    nao_fez: u32,
    falta: u32,
    disciplinas_fez: BTreeSet<String>,
    disciplinas_nao_fez: BTreeSet<String>,
    disciplinas_falta: BTreeSet<String>,
}

/// Contagens por dia mais o conjunto de disciplinas de cada categoria
/// (deduplicado, para o tooltip). Dias sem entrega ficam de fora: a
/// timeline por aluno é esparsa, ao contrário da grade do painel.
pub fn timeline_por_dia(entregas: &[EntregaDetalhada]) -> Vec<TimelinePonto> {
    let mut por_dia: BTreeMap<NaiveDate, TimelineAcc> = BTreeMap::new();

    for entrega in entregas {
        let acc = por_dia.entry(dia_utc(entrega.data_referencia)).or_default();
        match entrega.status {
            StatusEntrega::Fez => {
                acc.fez += 1;
                acc.disciplinas_fez.insert(entrega.disciplina.clone());
            }
            StatusEntrega::NaoFez => {
                acc.nao_fez += 1;
                acc.disciplinas_nao_fez.insert(entrega.disciplina.clone());
            }
            StatusEntrega::Falta => {
                acc.falta += 1;
                acc.disciplinas_falta.insert(entrega.disciplina.clone());
            }
        }
    }

    por_dia
        .into_iter()
        .map(|(dia, acc)| TimelinePonto {
            data: chave_dia(dia),
            fez: acc.fez,
            nao_fez: acc.nao_fez,
            falta: acc.falta,
            disciplinas_fez: ordenar_ptbr(acc.disciplinas_fez),
            disciplinas_nao_fez: ordenar_ptbr(acc.disciplinas_nao_fez),
            disciplinas_falta: ordenar_ptbr(acc.disciplinas_falta),
        })
        .collect()
}

// --- OPERAÇÃO B: RESUMO POR DISCIPLINA ---

/// Totais por disciplina. Com `catalogo`, o resultado é pré-semeado com as
/// disciplinas declaradas da turma (zeradas quando sem entregas) unidas às
/// observadas nos dados: entregas antigas cuja disciplina saiu do catálogo
/// continuam aparecendo. Sem catálogo, disciplinas sem entrega são omitidas.
pub fn resumo_por_disciplina(
    entregas: &[EntregaDetalhada],
    catalogo: Option<&[String]>,
) -> Vec<DisciplinaResumo> {
    let mut por_disciplina: BTreeMap<String, (u32, u32, u32)> = BTreeMap::new();

    if let Some(catalogo) = catalogo {
        for disciplina in catalogo {
            por_disciplina.insert(disciplina.clone(), (0, 0, 0));
        }
    }

    for entrega in entregas {
        let acc = por_disciplina.entry(entrega.disciplina.clone()).or_insert((0, 0, 0));
        match entrega.status {
            StatusEntrega::Fez => acc.0 += 1,
            StatusEntrega::NaoFez => acc.1 += 1,
            StatusEntrega::Falta => acc.2 += 1,
        }
    }

    let mut resumos: Vec<DisciplinaResumo> = por_disciplina
        .into_iter()
        .map(|(disciplina, (fez, nao_fez, falta))| DisciplinaResumo {
            disciplina,
            fez,
            nao_fez,
            falta,
        })
        .collect();
    resumos.sort_by(|a, b| {
        chave_ptbr(&a.disciplina)
            .cmp(&chave_ptbr(&b.disciplina))
            .then_with(|| a.disciplina.cmp(&b.disciplina))
    });
    resumos
}

// --- RESUMO GERAL ---

pub fn resumo_geral(entregas: &[EntregaDetalhada]) -> ResumoGeral {
    let mut geral = ResumoGeral::default();
    for entrega in entregas {
        match entrega.status {
            StatusEntrega::Fez => geral.fez += 1,
            StatusEntrega::NaoFez => geral.nao_fez += 1,
            StatusEntrega::Falta => geral.falta += 1,
        }
    }
    geral
}

// --- OPERAÇÃO C: GRADE POR ALUNO x DIA (densa) ---

#[derive(Default)]
struct CelulaAcc {
    total: u32,
    fez: u32,
    falta: u32,
    pendentes: BTreeSet<String>,
}

/// Para cada aluno, uma célula por dia do período; o eixo de dias é sempre
/// completo (fins de semana e dias sem lição incluídos). Entregas fora do
/// eixo são descartadas. Linhas ordenadas pelo nome do aluno em pt-BR.
pub fn grade_por_dia(
    alunos: &[Aluno],
    entregas: &[EntregaDetalhada],
    dias: &[NaiveDate],
) -> Vec<LinhaAluno> {
    let mut por_aluno: HashMap<Uuid, Vec<&EntregaDetalhada>> = HashMap::new();
    for entrega in entregas {
        por_aluno.entry(entrega.aluno_id).or_default().push(entrega);
    }

    let mut linhas: Vec<LinhaAluno> = alunos
        .iter()
        .map(|aluno| {
            // Pré-semeia cada dia do eixo com contagens zeradas.
            let mut celulas: BTreeMap<NaiveDate, CelulaAcc> =
                dias.iter().map(|dia| (*dia, CelulaAcc::default())).collect();

            let entregas_do_aluno = por_aluno.get(&aluno.id).map(Vec::as_slice).unwrap_or(&[]);

            let mut total_fez = 0;
            let mut total_geral = 0;
            for entrega in entregas_do_aluno {
                total_geral += 1;
                if entrega.status == StatusEntrega::Fez {
                    total_fez += 1;
                }

                let Some(celula) = celulas.get_mut(&dia_utc(entrega.data_referencia)) else {
                    continue;
                };
                celula.total += 1;
                match entrega.status {
                    StatusEntrega::Fez => celula.fez += 1,
                    StatusEntrega::NaoFez => {
                        celula.pendentes.insert(entrega.disciplina.clone());
                    }
                    StatusEntrega::Falta => {
                        celula.falta += 1;
                        celula.pendentes.insert(entrega.disciplina.clone());
                    }
                }
            }

            let por_dia = celulas
                .into_iter()
                .map(|(dia, celula)| {
                    (
                        chave_dia(dia),
                        DiaResumo {
                            total: celula.total,
                            fez: celula.fez,
                            falta: celula.falta,
                            pendentes: ordenar_ptbr(celula.pendentes),
                        },
                    )
                })
                .collect();

            LinhaAluno {
                nome: aluno.nome.clone(),
                total_fez,
                total_geral,
                por_dia,
            }
        })
        .collect();

    linhas.sort_by(|a, b| chave_ptbr(&a.nome).cmp(&chave_ptbr(&b.nome)).then_with(|| a.nome.cmp(&b.nome)));
    linhas
}

// --- RESUMO POR ALUNO (período) ---

/// Contagens por aluno para o gráfico de resumo do período.
pub fn resumo_por_aluno(entregas: &[EntregaDetalhada]) -> Vec<ResumoAluno> {
    let mut por_aluno: BTreeMap<Uuid, ResumoAluno> = BTreeMap::new();

    for entrega in entregas {
        let resumo = por_aluno.entry(entrega.aluno_id).or_insert_with(|| ResumoAluno {
            nome: entrega.aluno_nome.clone(),
            fez: 0,
            nao_fez: 0,
            falta: 0,
        });
        match entrega.status {
            StatusEntrega::Fez => resumo.fez += 1,
            StatusEntrega::NaoFez => resumo.nao_fez += 1,
            StatusEntrega::Falta => resumo.falta += 1,
        }
    }

    let mut resumos: Vec<ResumoAluno> = por_aluno.into_values().collect();
    resumos.sort_by(|a, b| chave_ptbr(&a.nome).cmp(&chave_ptbr(&b.nome)).then_with(|| a.nome.cmp(&b.nome)));
    resumos
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entrega(
        aluno_id: Uuid,
        aluno_nome: &str,
        disciplina: &str,
        status: StatusEntrega,
        dia: (i32, u32, u32),
    ) -> EntregaDetalhada {
        EntregaDetalhada {
            aluno_id,
            aluno_nome: aluno_nome.to_string(),
            disciplina: disciplina.to_string(),
            status,
            data_referencia: Utc
                .with_ymd_and_hms(dia.0, dia.1, dia.2, 12, 0, 0)
                .unwrap(),
        }
    }

    fn aluno(id: Uuid, nome: &str) -> Aluno {
        Aluno {
            id,
            nome: nome.to_string(),
            turma_id: Uuid::nil(),
        }
    }

    #[test]
    fn timeline_agrupa_por_dia_e_deduplica_disciplinas() {
        let a = Uuid::new_v4();
        let entregas = vec![
            entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4)),
            entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4)),
            entrega(a, "Ana", "Português", StatusEntrega::NaoFez, (2024, 3, 4)),
            entrega(a, "Ana", "Ciências", StatusEntrega::Falta, (2024, 3, 6)),
        ];

        let timeline = timeline_por_dia(&entregas);
        assert_eq!(timeline.len(), 2);

        let dia4 = &timeline[0];
        assert_eq!(dia4.data, "2024-03-04");
        assert_eq!((dia4.fez, dia4.nao_fez, dia4.falta), (2, 1, 0));
        assert_eq!(dia4.disciplinas_fez, vec!["Matemática"]);
        assert_eq!(dia4.disciplinas_nao_fez, vec!["Português"]);

        let dia6 = &timeline[1];
        assert_eq!(dia6.falta, 1);
        assert_eq!(dia6.disciplinas_falta, vec!["Ciências"]);
    }

    #[test]
    fn timeline_e_esparsa() {
        let a = Uuid::new_v4();
        let entregas = vec![
            entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 1)),
            entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 10)),
        ];
        // Dias 2 a 9 não aparecem: a timeline não preenche buracos.
        assert_eq!(timeline_por_dia(&entregas).len(), 2);
    }

    #[test]
    fn soma_das_categorias_e_o_total_em_todas_as_visoes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entregas = vec![
            entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4)),
            entrega(a, "Ana", "Português", StatusEntrega::NaoFez, (2024, 3, 4)),
            entrega(b, "Bruno", "Matemática", StatusEntrega::Falta, (2024, 3, 4)),
            entrega(b, "Bruno", "Português", StatusEntrega::Falta, (2024, 3, 5)),
        ];

        let geral = resumo_geral(&entregas);
        assert_eq!(
            geral.fez + geral.nao_fez + geral.falta,
            entregas.len() as u32
        );

        let por_disciplina = resumo_por_disciplina(&entregas, None);
        let soma: u32 = por_disciplina.iter().map(|d| d.fez + d.nao_fez + d.falta).sum();
        assert_eq!(soma, entregas.len() as u32);

        let timeline = timeline_por_dia(&entregas);
        let soma: u32 = timeline.iter().map(|p| p.fez + p.nao_fez + p.falta).sum();
        assert_eq!(soma, entregas.len() as u32);
    }

    #[test]
    fn resumo_por_disciplina_sem_catalogo_omite_disciplinas_sem_entrega() {
        let a = Uuid::new_v4();
        let entregas = vec![entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4))];
        let resumos = resumo_por_disciplina(&entregas, None);
        assert_eq!(resumos.len(), 1);
        assert_eq!(resumos[0].disciplina, "Matemática");
    }

    #[test]
    fn catalogo_pre_semeia_zerados_e_tolera_disciplina_fora_do_catalogo() {
        let a = Uuid::new_v4();
        // "Latim" é uma entrega antiga, já removida do catálogo da turma.
        let entregas = vec![
            entrega(a, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4)),
            entrega(a, "Ana", "Latim", StatusEntrega::NaoFez, (2024, 3, 4)),
        ];
        let catalogo = vec!["Matemática".to_string(), "Português".to_string()];

        let resumos = resumo_por_disciplina(&entregas, Some(&catalogo));
        let nomes: Vec<&str> = resumos.iter().map(|r| r.disciplina.as_str()).collect();
        assert_eq!(nomes, vec!["Latim", "Matemática", "Português"]);

        let portugues = resumos.iter().find(|r| r.disciplina == "Português").unwrap();
        assert_eq!((portugues.fez, portugues.nao_fez, portugues.falta), (0, 0, 0));
    }

    #[test]
    fn grade_cobre_todos_os_dias_para_todos_os_alunos() {
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let alunos = vec![aluno(ana, "Ana"), aluno(bruno, "Bruno")];
        let dias: Vec<NaiveDate> = (1..=7)
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
            .collect();
        let entregas = vec![entrega(ana, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4))];

        let linhas = grade_por_dia(&alunos, &entregas, &dias);
        assert_eq!(linhas.len(), 2);
        for linha in &linhas {
            assert_eq!(linha.por_dia.len(), 7);
        }

        // Dia sem entrega é "sem dados", não "tudo feito".
        let bruno_dia4 = &linhas[1].por_dia["2024-03-04"];
        assert_eq!(bruno_dia4.total, 0);
    }

    #[test]
    fn cenario_turma_5b() {
        // Turma "5B" com Ana e Bruno; lição com (Matemática, Livro) e
        // (Português, Exercício) para 2024-03-05. Após a criação existem
        // 4 entregas NAO_FEZ; Ana marca Matemática como FEZ.
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let alunos = vec![aluno(ana, "Ana"), aluno(bruno, "Bruno")];
        let dias = vec![NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()];
        let entregas = vec![
            entrega(ana, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 5)),
            entrega(ana, "Ana", "Português", StatusEntrega::NaoFez, (2024, 3, 5)),
            entrega(bruno, "Bruno", "Matemática", StatusEntrega::NaoFez, (2024, 3, 5)),
            entrega(bruno, "Bruno", "Português", StatusEntrega::NaoFez, (2024, 3, 5)),
        ];

        let linhas = grade_por_dia(&alunos, &entregas, &dias);
        let ana_dia = &linhas[0].por_dia["2024-03-05"];
        assert_eq!(
            *ana_dia,
            DiaResumo {
                total: 2,
                fez: 1,
                falta: 0,
                pendentes: vec!["Português".to_string()],
            }
        );
    }

    #[test]
    fn falta_conta_como_pendencia_com_marcador_proprio() {
        let ana = Uuid::new_v4();
        let alunos = vec![aluno(ana, "Ana")];
        let dias = vec![NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()];
        let entregas = vec![
            entrega(ana, "Ana", "Matemática", StatusEntrega::Falta, (2024, 3, 5)),
            entrega(ana, "Ana", "Português", StatusEntrega::Falta, (2024, 3, 5)),
        ];

        let linhas = grade_por_dia(&alunos, &entregas, &dias);
        let celula = &linhas[0].por_dia["2024-03-05"];
        assert_eq!(celula.falta, 2);
        assert_eq!(celula.pendentes, vec!["Matemática", "Português"]);
    }

    #[test]
    fn entrega_fora_do_eixo_de_dias_e_descartada_da_grade() {
        let ana = Uuid::new_v4();
        let alunos = vec![aluno(ana, "Ana")];
        let dias = vec![NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()];
        let entregas = vec![entrega(ana, "Ana", "Matemática", StatusEntrega::Fez, (2024, 4, 1))];

        let linhas = grade_por_dia(&alunos, &entregas, &dias);
        assert_eq!(linhas[0].por_dia["2024-03-05"].total, 0);
        // Os totais da linha seguem contando a entrega carregada.
        assert_eq!(linhas[0].total_geral, 1);
    }

    #[test]
    fn input_vazio_produz_agregados_vazios_sem_panico() {
        assert!(timeline_por_dia(&[]).is_empty());
        assert!(resumo_por_disciplina(&[], None).is_empty());
        assert!(resumo_por_aluno(&[]).is_empty());
        assert_eq!(resumo_geral(&[]), ResumoGeral::default());
        assert!(grade_por_dia(&[], &[], &[]).is_empty());
    }

    #[test]
    fn resumo_por_aluno_agrupa_e_ordena_por_nome() {
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let entregas = vec![
            entrega(bruno, "Bruno", "Matemática", StatusEntrega::NaoFez, (2024, 3, 4)),
            entrega(ana, "Ana", "Matemática", StatusEntrega::Fez, (2024, 3, 4)),
            entrega(ana, "Ana", "Português", StatusEntrega::Falta, (2024, 3, 5)),
        ];

        let resumos = resumo_por_aluno(&entregas);
        assert_eq!(resumos.len(), 2);
        assert_eq!(resumos[0].nome, "Ana");
        assert_eq!((resumos[0].fez, resumos[0].nao_fez, resumos[0].falta), (1, 0, 1));
        assert_eq!(resumos[1].nome, "Bruno");
    }

    #[test]
    fn ordenacao_ptbr_dobra_acentos() {
        let valores = vec![
            "Português".to_string(),
            "Água".to_string(),
            "Ciências".to_string(),
            "Educação Física".to_string(),
        ];
        assert_eq!(
            ordenar_ptbr(valores),
            vec!["Água", "Ciências", "Educação Física", "Português"]
        );
    }
}
