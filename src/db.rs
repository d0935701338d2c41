pub mod user_repo;
pub use user_repo::UserRepository;
pub mod turma_repo;
pub use turma_repo::TurmaRepository;
pub mod licao_repo;
pub use licao_repo::LicaoRepository;
pub mod entrega_repo;
pub use entrega_repo::EntregaRepository;
