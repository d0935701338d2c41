// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Turmas ---
        handlers::turmas::criar_turma,
        handlers::turmas::atualizar_turma,

        // --- Lições ---
        handlers::licoes::listar_licoes,
        handlers::licoes::criar_licao,
        handlers::licoes::atualizar_licao,
        handlers::licoes::alternar_falta,
        handlers::licoes::salvar_entregas,

        // --- Painel ---
        handlers::painel::dashboard,
        handlers::painel::dashboard_disciplinas,
        handlers::painel::resumo,
        handlers::painel::analise_aluno,
        handlers::painel::listar_alunos,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Turmas ---
            models::turma::Turma,
            models::turma::Aluno,
            models::turma::TurmaComAlunos,
            models::turma::TurmaPayload,
            models::turma::AlunoResumido,

            // --- Lições ---
            models::licao::StatusEntrega,
            models::licao::Licao,
            models::licao::SubLicao,
            models::licao::LicaoComSubLicoes,
            models::licao::EntregaSubLicao,
            models::licao::SubLicaoInput,
            models::licao::LicaoPayload,
            models::licao::EntregaInput,
            models::licao::SalvarEntregasPayload,
            models::licao::FaltaPayload,
            models::licao::ListagemLicoes,

            // --- Painel ---
            models::painel::DiaColuna,
            models::painel::DiaResumo,
            models::painel::LinhaAluno,
            models::painel::PainelResposta,
            models::painel::TimelinePonto,
            models::painel::DisciplinaResumo,
            models::painel::ResumoGeral,
            models::painel::AnaliseAlunoResposta,
            models::painel::ResumoAluno,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro do Professor"),
        (name = "Turmas", description = "Turma, Roster de Alunos e Catálogos"),
        (name = "Lições", description = "Lições, Sub-lições e Registro de Entregas"),
        (name = "Painel", description = "Visões Agregadas de Acompanhamento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
