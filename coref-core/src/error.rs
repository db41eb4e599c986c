//! # Erros do Motor de Correferência
//!
//! A taxonomia segue a regra de ouro do resolvedor: **só a construção falha**.
//! Uma vez montados os resolvedores, nenhuma menção isolada aborta o documento.
//!
//! | Categoria | Tratamento |
//! |-----------|------------|
//! | Lookup ausente no léxico | vazio / 0 / `None`, nunca erro |
//! | Resolvedor não aplicável | `Decision::NotApplicable` |
//! | Falha de pontuação | probabilidade 0 para o candidato, log de diagnóstico |
//! | Configuração inválida | [`CorefError::Config`] na construção |

use thiserror::Error;

use crate::entity::EntityId;
use crate::mention::MentionId;

/// Atalho para resultados do crate.
pub type Result<T> = std::result::Result<T, CorefError>;

/// Erros que podem ser devolvidos pelo motor de correferência.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CorefError {
    /// Configuração, modelo ou dicionário inválido (fatal na construção).
    #[error("Configuração inválida: {0}")]
    Config(String),

    /// O classificador não conseguiu pontuar um vetor de features.
    #[error("Falha ao pontuar candidato: {0}")]
    Scoring(String),

    /// Uma decisão aponta para uma entidade que não está no log.
    #[error("Entidade desconhecida: {0}")]
    UnknownEntity(EntityId),

    /// Duas menções do mesmo documento com o mesmo identificador.
    #[error("Menção duplicada no documento: {0}")]
    DuplicateMention(MentionId),

    /// Erro ao (des)serializar JSON de configuração ou de modelo.
    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Padrão de pronomes que não compila.
    #[error("Padrão inválido: {0}")]
    Pattern(#[from] regex::Error),
}

impl CorefError {
    /// Cria um erro de configuração.
    pub fn config(msg: impl Into<String>) -> Self {
        CorefError::Config(msg.into())
    }

    /// Cria um erro de pontuação.
    pub fn scoring(msg: impl Into<String>) -> Self {
        CorefError::Scoring(msg.into())
    }
}
