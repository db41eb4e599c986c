//! # Configuração dos Resolvedores
//!
//! Todos os parâmetros de um resolvedor são fixados na construção e nunca mudam
//! depois: o identificador do projeto/modelo, o modo de operação, o limiar de
//! aceitação e as janelas de busca.
//!
//! A configuração pode vir de JSON (campos ausentes assumem o padrão):
//!
//! ```rust
//! use coref_core::config::{ResolverConfig, ResolverMode};
//!
//! let config = ResolverConfig::from_json(r#"{"project": "news", "threshold": 0.6}"#).unwrap();
//! assert_eq!(config.mode, ResolverMode::Test);
//! assert_eq!(config.sentences_back, Some(2));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CorefError, Result};

/// Modo de operação de um resolvedor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverMode {
    /// **Treino**: não decide nada, emite um exemplo rotulado por par (menção, candidato).
    Train,
    /// **Teste**: resolução ao vivo, consultando o classificador.
    Test,
}

impl Default for ResolverMode {
    fn default() -> Self {
        ResolverMode::Test
    }
}

/// Parâmetros de construção de um [`Resolver`](crate::resolver::Resolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Identificador do projeto/modelo (ex: "news", "pmodel").
    pub project: String,
    pub mode: ResolverMode,
    /// Probabilidade mínima de "coreferent" para aceitar um LINK (`>=` aceita).
    pub threshold: f64,
    /// Quantas sentenças para trás a busca alcança. `None` = sem limite.
    pub sentences_back: Option<usize>,
    /// Quantas entidades, no máximo, são examinadas por menção.
    pub entities_back: usize,
    /// Para no primeiro candidato que atinge o limiar em vez de buscar o máximo.
    pub prefer_first_referent: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::pronoun("default")
    }
}

impl ResolverConfig {
    /// Preset para pronomes: antecedentes quase sempre estão perto.
    pub fn pronoun(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            mode: ResolverMode::Test,
            threshold: 0.5,
            sentences_back: Some(2),
            entities_back: 30,
            prefer_first_referent: false,
        }
    }

    /// Preset para nomes próprios: sem janela de sentenças, muitas entidades.
    pub fn proper_noun(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            mode: ResolverMode::Test,
            threshold: 0.5,
            sentences_back: None,
            entities_back: 500,
            prefer_first_referent: false,
        }
    }

    pub fn with_mode(mut self, mode: ResolverMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_sentences_back(mut self, sentences_back: Option<usize>) -> Self {
        self.sentences_back = sentences_back;
        self
    }

    /// Lê e valida uma configuração JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Verifica os invariantes da configuração.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(CorefError::config("identificador de projeto vazio"));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(CorefError::config(format!(
                "limiar fora de [0, 1]: {}",
                self.threshold
            )));
        }
        if self.entities_back == 0 {
            return Err(CorefError::config("entities_back deve ser >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let p = ResolverConfig::pronoun("news");
        assert_eq!(p.sentences_back, Some(2));
        assert_eq!(p.entities_back, 30);

        let n = ResolverConfig::proper_noun("news");
        assert_eq!(n.sentences_back, None);
        assert_eq!(n.entities_back, 500);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ResolverConfig::from_json(r#"{"project": "x", "mode": "train"}"#).unwrap();
        assert_eq!(config.mode, ResolverMode::Train);
        assert_eq!(config.threshold, 0.5);
        assert!(!config.prefer_first_referent);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = ResolverConfig::from_json(r#"{"project": "x", "threshold": 1.5}"#).unwrap_err();
        assert!(matches!(err, CorefError::Config(_)));

        let nan = ResolverConfig::pronoun("x").with_threshold(f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_empty_project_and_zero_entities_rejected() {
        assert!(ResolverConfig::pronoun("  ").validate().is_err());

        let mut config = ResolverConfig::pronoun("x");
        config.entities_back = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = ResolverConfig::from_json("{project:").unwrap_err();
        assert!(matches!(err, CorefError::Json(_)));
    }
}
