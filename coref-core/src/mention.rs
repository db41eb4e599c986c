//! # Menções Candidatas
//!
//! Uma [`MentionContext`] é a visão normalizada de um sintagma nominal extraído
//! pelo parser: núcleo (head), tag do núcleo, índice da sentença, dicas de gênero
//! e número, tipo de entidade nomeada e sentidos candidatos.
//!
//! ## Invariantes
//! - A menção é criada uma vez, antes da resolução, e nunca é alterada depois.
//!   Os campos são privados e só há builders que consomem `self`.
//! - A identidade é o [`MentionId`] atribuído pelo alimentador upstream, nunca a
//!   igualdade de texto: dois "he" no mesmo documento são menções diferentes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identificador único de uma menção dentro de um documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionId(pub usize);

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Dica de gênero (fornecida upstream ou calculada pelo [`GenderLexicon`](crate::gender::GenderLexicon)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Neutral,
    Unknown,
}

impl Gender {
    pub fn name(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
            Gender::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Gender::Unknown
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unknown
    }
}

/// Dica de número gramatical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    Singular,
    Plural,
    Unknown,
}

impl Number {
    pub fn name(&self) -> &'static str {
        match self {
            Number::Singular => "singular",
            Number::Plural => "plural",
            Number::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Number::Unknown
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Unknown
    }
}

/// Janela de tokens ao redor do núcleo, com as tags POS já atribuídas.
///
/// Alimenta o gerador de contexto ([`crate::features::pos_context`]) quando o
/// resolvedor extrai features léxicas/sintáticas da última menção de um candidato.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenWindow {
    pub tokens: Vec<String>,
    pub tags: Vec<String>,
    /// Posição do núcleo dentro de `tokens`.
    pub head: usize,
}

impl TokenWindow {
    pub fn new(tokens: Vec<String>, tags: Vec<String>, head: usize) -> Self {
        Self { tokens, tags, head }
    }

    /// Janela mínima: só o próprio núcleo.
    pub fn single(token: &str, tag: &str) -> Self {
        Self {
            tokens: vec![token.to_string()],
            tags: vec![tag.to_string()],
            head: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() || self.head >= self.tokens.len()
    }
}

/// Uma menção candidata a correferência.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionContext {
    id: MentionId,
    text: String,
    head_text: String,
    head_tag: String,
    /// Índice da sentença (0-based, crescente ao longo do documento).
    sentence: usize,
    /// Intervalo de tokens `[start, end)` dentro da sentença, se o alimentador o conhece.
    #[serde(default)]
    span: Option<(usize, usize)>,
    #[serde(default)]
    gender: Gender,
    #[serde(default)]
    number: Number,
    #[serde(default)]
    ne_type: Option<String>,
    #[serde(default)]
    senses: Option<Vec<String>>,
    /// Cadeia de referência (gold) usada no modo de treino.
    #[serde(default)]
    gold_id: Option<usize>,
    #[serde(default)]
    window: TokenWindow,
}

impl MentionContext {
    pub fn new(
        id: usize,
        text: impl Into<String>,
        head_text: impl Into<String>,
        head_tag: impl Into<String>,
        sentence: usize,
    ) -> Self {
        Self {
            id: MentionId(id),
            text: text.into(),
            head_text: head_text.into(),
            head_tag: head_tag.into(),
            sentence,
            span: None,
            gender: Gender::Unknown,
            number: Number::Unknown,
            ne_type: None,
            senses: None,
            gold_id: None,
            window: TokenWindow::default(),
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end.max(start)));
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_number(mut self, number: Number) -> Self {
        self.number = number;
        self
    }

    pub fn with_ne_type(mut self, ne_type: impl Into<String>) -> Self {
        self.ne_type = Some(ne_type.into());
        self
    }

    pub fn with_senses(mut self, senses: Vec<String>) -> Self {
        self.senses = Some(senses);
        self
    }

    pub fn with_gold_id(mut self, gold_id: usize) -> Self {
        self.gold_id = Some(gold_id);
        self
    }

    pub fn with_window(mut self, window: TokenWindow) -> Self {
        self.window = window;
        self
    }

    pub fn id(&self) -> MentionId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn head_text(&self) -> &str {
        &self.head_text
    }

    pub fn head_tag(&self) -> &str {
        &self.head_tag
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }

    pub fn span(&self) -> Option<(usize, usize)> {
        self.span
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn number(&self) -> Number {
        self.number
    }

    pub fn ne_type(&self) -> Option<&str> {
        self.ne_type.as_deref()
    }

    pub fn senses(&self) -> Option<&[String]> {
        self.senses.as_deref()
    }

    pub fn gold_id(&self) -> Option<usize> {
        self.gold_id
    }

    /// Janela de contexto; se o alimentador não forneceu uma, usa só o núcleo.
    pub fn window(&self) -> TokenWindow {
        if self.window.is_empty() {
            TokenWindow::single(&self.head_text, &self.head_tag)
        } else {
            self.window.clone()
        }
    }

    /// Núcleo marcado como pronome (`PRP`, `PRP$`).
    pub fn is_pronoun(&self) -> bool {
        self.head_tag.starts_with("PRP")
    }

    /// Núcleo marcado como nome próprio (`NNP`, `NNPS`).
    pub fn is_proper_noun(&self) -> bool {
        self.head_tag.starts_with("NNP")
    }

    /// Núcleo em minúsculas, a forma usada em todas as comparações léxicas.
    pub fn head_lower(&self) -> String {
        self.head_text.to_lowercase()
    }

    /// Verdadeiro se os intervalos de tokens se sobrepõem na mesma sentença.
    ///
    /// Sem intervalo explícito nas duas menções não há sobreposição.
    pub fn overlaps(&self, other: &MentionContext) -> bool {
        match (self.span, other.span) {
            (Some((start, end)), Some((other_start, other_end))) => {
                self.sentence == other.sentence && start < other_end && other_start < end
            }
            _ => false,
        }
    }
}

impl PartialEq for MentionContext {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MentionContext {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_by_id() {
        let a = MentionContext::new(1, "he", "he", "PRP", 0);
        let b = MentionContext::new(2, "he", "he", "PRP", 0);
        let a_again = MentionContext::new(1, "John", "John", "NNP", 3);

        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }

    #[test]
    fn test_builder_and_tag_helpers() {
        let m = MentionContext::new(0, "John Smith", "Smith", "NNP", 2)
            .with_gender(Gender::Male)
            .with_ne_type("person")
            .with_gold_id(7);

        assert!(m.is_proper_noun());
        assert!(!m.is_pronoun());
        assert_eq!(m.span(), None);
        assert_eq!(m.clone().with_span(3, 1).span(), Some((3, 3)));
        assert_eq!(m.ne_type(), Some("person"));
        assert_eq!(m.gold_id(), Some(7));
        assert_eq!(m.head_lower(), "smith");
    }

    #[test]
    fn test_window_falls_back_to_head() {
        let m = MentionContext::new(0, "it", "it", "PRP", 0);
        let w = m.window();
        assert_eq!(w.tokens, vec!["it".to_string()]);
        assert_eq!(w.head, 0);
    }

    #[test]
    fn test_overlap_requires_same_sentence() {
        let outer = MentionContext::new(0, "the man with a hat", "man", "NN", 1).with_span(0, 5);
        let inner = MentionContext::new(1, "a hat", "hat", "NN", 1).with_span(3, 5);
        let elsewhere = MentionContext::new(2, "a hat", "hat", "NN", 2).with_span(3, 5);

        assert!(outer.overlaps(&inner));
        assert!(!outer.overlaps(&elsewhere));
    }

    #[test]
    fn test_mentions_without_span_never_overlap() {
        let john = MentionContext::new(0, "John", "John", "NNP", 0);
        let he = MentionContext::new(1, "he", "he", "PRP", 0);
        assert!(!john.overlaps(&he));
        assert!(!john.overlaps(&he.clone().with_span(0, 1)));

        let parsed: MentionContext = serde_json::from_str(
            r#"{"id": 1, "text": "he", "head_text": "he", "head_tag": "PRP", "sentence": 0}"#,
        )
        .unwrap();
        assert_eq!(parsed.span(), he.span());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let m: MentionContext = serde_json::from_str(
            r#"{"id": 3, "text": "she", "head_text": "she", "head_tag": "PRP", "sentence": 4}"#,
        )
        .unwrap();
        assert_eq!(m.id(), MentionId(3));
        assert_eq!(m.gender(), Gender::Unknown);
        assert!(m.senses().is_none());
    }
}
