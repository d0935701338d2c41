pub mod agregador;
pub mod auth;
pub mod licao_service;
pub mod painel_service;
pub mod turma_service;
