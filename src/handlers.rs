pub mod auth;
pub mod licoes;
pub mod painel;
pub mod turmas;
