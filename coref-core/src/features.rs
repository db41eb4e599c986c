//! # Vetores de Features e Gerador de Contexto
//!
//! Dois contratos compartilhados vivem aqui:
//!
//! 1. [`FeatureVector`]: a sequência **ordenada** de features (strings ou pares
//!    `chave=valor`) que um resolvedor entrega ao classificador. A ordem é a de
//!    inserção, para que o mesmo par (menção, candidato) produza sempre o mesmo
//!    vetor e os exemplos de treino batam com o vocabulário do modelo.
//! 2. [`pos_context`]: o gerador de contexto do etiquetador POS, função pura da
//!    posição, dos tokens e das tags já atribuídas. Os resolvedores o reutilizam
//!    para descrever a última menção de um candidato.
//!
//! ## Features do gerador de contexto
//!
//! | Feature | Significado |
//! |---------|-------------|
//! | `w=` | a própria palavra |
//! | `suf=` / `pre=` | até 4 sufixos e 4 prefixos (ou sufixos do analisador morfológico, sem prefixos) |
//! | `h`, `c`, `d` | contém hífen, maiúscula, dígito |
//! | `p=`, `t=`, `pp=`, `tt=` | palavra/tag anterior e duas antes |
//! | `n=`, `nn=` | próxima palavra e duas depois |
//!
//! Fora da sentença usam-se os marcadores [`SENTENCE_BEGIN`] e [`SENTENCE_END`].

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Marcador de início de sentença.
pub const SENTENCE_BEGIN: &str = "*SB*";
/// Marcador de fim de sentença.
pub const SENTENCE_END: &str = "*SE*";

const AFFIX_LENGTH: usize = 4;

/// Sequência ordenada de features binárias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    features: Vec<String>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: impl Into<String>) {
        self.features.push(feature.into());
    }

    /// Insere apenas se a feature ainda não estiver presente.
    pub fn push_unique(&mut self, feature: impl Into<String>) {
        let feature = feature.into();
        if !self.contains(&feature) {
            self.features.push(feature);
        }
    }

    pub fn extend<I, S>(&mut self, features: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.features.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.features.join(" "))
    }
}

impl From<Vec<String>> for FeatureVector {
    fn from(features: Vec<String>) -> Self {
        Self { features }
    }
}

/// Analisador morfológico externo, fonte alternativa de sufixos.
pub trait MorphAnalyzer: Send + Sync {
    fn suffixes(&self, word: &str) -> Vec<String>;
}

/// Prefixos de 1 até 4 grafemas (sem repetir para palavras curtas).
fn prefixes(word: &str) -> Vec<String> {
    let graphemes: Vec<&str> = word.graphemes(true).collect();
    (1..=AFFIX_LENGTH.min(graphemes.len()))
        .map(|n| graphemes[..n].concat())
        .collect()
}

/// Sufixos de 1 até 4 grafemas (sem repetir para palavras curtas).
fn suffixes(word: &str) -> Vec<String> {
    let graphemes: Vec<&str> = word.graphemes(true).collect();
    (1..=AFFIX_LENGTH.min(graphemes.len()))
        .map(|n| graphemes[graphemes.len() - n..].concat())
        .collect()
}

/// Gera as features de contexto do token `pos`.
///
/// # Parâmetros
/// - `tokens`: a sentença inteira.
/// - `tags`: tags já atribuídas; só as posições anteriores a `pos` são lidas
///   (pode ser mais curto que `tokens`).
/// - `morph`: se presente, substitui os sufixos por n-gramas pelos sufixos do
///   analisador, e os prefixos são omitidos.
///
/// # Exemplo
/// Para "the old man" na posição 2 com tags `["DT", "JJ"]`:
/// `w=man`, `suf=n`, ..., `p=old`, `t=JJ`, `pp=the`, `tt=DT`, `n=*SE*`
///
/// # Panics
/// Se `pos >= tokens.len()`.
pub fn pos_context(
    pos: usize,
    tokens: &[String],
    tags: &[String],
    morph: Option<&dyn MorphAnalyzer>,
) -> Vec<String> {
    let lex = &tokens[pos];
    let mut e = Vec::with_capacity(20);

    e.push(format!("w={lex}"));

    match morph {
        Some(analyzer) => {
            for suffix in analyzer.suffixes(lex) {
                e.push(format!("suf={suffix}"));
            }
        }
        None => {
            for suffix in suffixes(lex) {
                e.push(format!("suf={suffix}"));
            }
            for prefix in prefixes(lex) {
                e.push(format!("pre={prefix}"));
            }
        }
    }

    if lex.contains('-') {
        e.push("h".to_string());
    }
    if lex.chars().any(char::is_uppercase) {
        e.push("c".to_string());
    }
    if lex.chars().any(|c| c.is_ascii_digit()) {
        e.push("d".to_string());
    }

    // Contexto à esquerda
    if pos >= 1 {
        e.push(format!("p={}", tokens[pos - 1]));
        if let Some(tag) = tags.get(pos - 1) {
            e.push(format!("t={tag}"));
        }
        if pos >= 2 {
            e.push(format!("pp={}", tokens[pos - 2]));
            if let Some(tag) = tags.get(pos - 2) {
                e.push(format!("tt={tag}"));
            }
        } else {
            e.push(format!("pp={SENTENCE_BEGIN}"));
        }
    } else {
        e.push(format!("p={SENTENCE_BEGIN}"));
    }

    // Contexto à direita
    match tokens.get(pos + 1) {
        Some(next) => {
            e.push(format!("n={next}"));
            match tokens.get(pos + 2) {
                Some(nextnext) => e.push(format!("nn={nextnext}")),
                None => e.push(format!("nn={SENTENCE_END}")),
            }
        }
        None => e.push(format!("n={SENTENCE_END}")),
    }

    e
}
