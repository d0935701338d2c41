pub mod auth;
pub mod licao;
pub mod painel;
pub mod turma;
