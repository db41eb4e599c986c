//! # Fonte de Conhecimento Léxico
//!
//! O resolvedor consulta um dicionário no estilo WordNet através do trait
//! [`LexicalKnowledgeSource`]: lemas, número de sentidos, chave de sentido e
//! cadeia de hiperônimos. Toda consulta **falha suave**: palavra ou sentido
//! desconhecido devolve vazio, `0` ou `None`, nunca um erro.
//!
//! [`WordNetLexicon`] é uma implementação em memória com a morfologia de
//! destacamento de sufixos do WordNet:
//!
//! | Classe | Regras (sufixo → substituto) |
//! |--------|------------------------------|
//! | Substantivo | s→, ses→s, xes→x, zes→z, ches→ch, shes→sh, men→man, ies→y |
//! | Verbo | s→, ies→y, es→e, es→, ed→e, ed→, ing→e, ing→ |
//! | Adjetivo | er→, est→, er→e, est→e |
//!
//! ```rust
//! use coref_core::lexicon::{LexicalKnowledgeSource, WordNetLexicon};
//!
//! let mut lex = WordNetLexicon::new();
//! lex.add_synset("city.n.01", &["municipality.n.01"]);
//! lex.add_synset("municipality.n.01", &[]);
//! lex.add_word("city", "NN", &["city.n.01"]);
//!
//! assert_eq!(lex.lemmas("cities", "NNS"), vec!["city".to_string()]);
//! assert_eq!(lex.hypernym_chain("city", "NN", 0), vec!["municipality.n.01".to_string()]);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CorefError, Result};

/// Contrato do dicionário consultado pelos resolvedores.
pub trait LexicalKnowledgeSource: Send + Sync {
    /// Formas base de `word`, em ordem (possivelmente vazio).
    fn lemmas(&self, word: &str, pos: &str) -> Vec<String>;
    /// Número de sentidos do lema (0 se desconhecido).
    fn sense_count(&self, lemma: &str, pos: &str) -> usize;
    /// Identificador opaco do sentido `sense` (0-based).
    fn sense_key(&self, lemma: &str, pos: &str, sense: usize) -> Option<String>;
    /// Ancestrais do sentido, do mais próximo ao mais distante.
    fn hypernym_chain(&self, lemma: &str, pos: &str, sense: usize) -> Vec<String>;
}

/// Classe gramatical usada para indexar o dicionário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
}

impl WordClass {
    /// Converte uma tag POS (Penn Treebank) em classe; o padrão é substantivo.
    pub fn from_tag(tag: &str) -> Self {
        if tag.starts_with("VB") {
            WordClass::Verb
        } else if tag.starts_with("JJ") {
            WordClass::Adjective
        } else {
            WordClass::Noun
        }
    }

    fn detach_rules(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            WordClass::Noun => &[
                ("s", ""),
                ("ses", "s"),
                ("xes", "x"),
                ("zes", "z"),
                ("ches", "ch"),
                ("shes", "sh"),
                ("men", "man"),
                ("ies", "y"),
            ],
            WordClass::Verb => &[
                ("s", ""),
                ("ies", "y"),
                ("es", "e"),
                ("es", ""),
                ("ed", "e"),
                ("ed", ""),
                ("ing", "e"),
                ("ing", ""),
            ],
            WordClass::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
        }
    }
}

/// Entrada serializada de uma palavra.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordEntry {
    pub lemma: String,
    #[serde(default = "default_class")]
    pub class: WordClass,
    /// Synsets em ordem de sentido.
    pub senses: Vec<String>,
}

fn default_class() -> WordClass {
    WordClass::Noun
}

/// Formato JSON de um dicionário completo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconData {
    pub words: Vec<WordEntry>,
    /// synset → hiperônimos diretos.
    pub synsets: BTreeMap<String, Vec<String>>,
    /// Formas irregulares → lema ("men" → "man").
    pub exceptions: BTreeMap<String, String>,
}

/// Dicionário em memória com morfologia por destacamento de sufixos.
#[derive(Debug, Clone, Default)]
pub struct WordNetLexicon {
    index: HashMap<(WordClass, String), Vec<String>>,
    hypernyms: HashMap<String, Vec<String>>,
    exceptions: HashMap<String, String>,
}

impl WordNetLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega e valida um dicionário JSON: todo synset referenciado deve existir.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: LexiconData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    pub fn from_data(data: LexiconData) -> Result<Self> {
        let mut lex = Self::new();
        for (synset, parents) in &data.synsets {
            for parent in parents {
                if !data.synsets.contains_key(parent) {
                    return Err(CorefError::config(format!(
                        "synset '{synset}' aponta para hiperônimo desconhecido '{parent}'"
                    )));
                }
            }
            lex.hypernyms.insert(synset.clone(), parents.clone());
        }
        for word in &data.words {
            if let Some(missing) = word.senses.iter().find(|s| !data.synsets.contains_key(*s)) {
                return Err(CorefError::config(format!(
                    "palavra '{}' aponta para synset desconhecido '{missing}'",
                    word.lemma
                )));
            }
            lex.index
                .insert((word.class, word.lemma.to_lowercase()), word.senses.clone());
        }
        for (form, lemma) in data.exceptions {
            lex.exceptions.insert(form.to_lowercase(), lemma.to_lowercase());
        }
        Ok(lex)
    }

    /// Registra um lema (classe inferida pela tag) e seus sentidos.
    pub fn add_word(&mut self, lemma: &str, tag: &str, senses: &[&str]) {
        self.index.insert(
            (WordClass::from_tag(tag), lemma.to_lowercase()),
            senses.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn add_synset(&mut self, synset: &str, hypernyms: &[&str]) {
        self.hypernyms.insert(
            synset.to_string(),
            hypernyms.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn add_exception(&mut self, form: &str, lemma: &str) {
        self.exceptions.insert(form.to_lowercase(), lemma.to_lowercase());
    }

    fn senses(&self, lemma: &str, pos: &str) -> Option<&Vec<String>> {
        self.index
            .get(&(WordClass::from_tag(pos), lemma.to_lowercase()))
    }

    fn is_indexed(&self, class: WordClass, lemma: &str) -> bool {
        self.index.contains_key(&(class, lemma.to_string()))
    }

    /// Busca em profundidade pelos ponteiros de hiperônimo.
    fn collect_parents(&self, synset: &str, out: &mut Vec<String>, seen: &mut HashSet<String>) {
        let Some(parents) = self.hypernyms.get(synset) else {
            return;
        };
        for parent in parents {
            if seen.insert(parent.clone()) {
                out.push(parent.clone());
                self.collect_parents(parent, out, seen);
            }
        }
    }
}

impl LexicalKnowledgeSource for WordNetLexicon {
    fn lemmas(&self, word: &str, pos: &str) -> Vec<String> {
        let class = WordClass::from_tag(pos);
        let lower = word.to_lowercase();
        let mut lemmas: Vec<String> = Vec::new();
        let mut push = |lemma: String| {
            if !lemmas.contains(&lemma) {
                lemmas.push(lemma);
            }
        };

        if let Some(lemma) = self.exceptions.get(&lower) {
            if self.is_indexed(class, lemma) {
                push(lemma.clone());
            }
        }
        if self.is_indexed(class, &lower) {
            push(lower.clone());
        }
        for (suffix, replacement) in class.detach_rules() {
            if let Some(stem) = lower.strip_suffix(suffix) {
                let candidate = format!("{stem}{replacement}");
                if !candidate.is_empty() && self.is_indexed(class, &candidate) {
                    push(candidate);
                }
            }
        }
        lemmas
    }

    fn sense_count(&self, lemma: &str, pos: &str) -> usize {
        self.senses(lemma, pos).map(Vec::len).unwrap_or(0)
    }

    fn sense_key(&self, lemma: &str, pos: &str, sense: usize) -> Option<String> {
        self.senses(lemma, pos)
            .and_then(|senses| senses.get(sense))
            .cloned()
    }

    fn hypernym_chain(&self, lemma: &str, pos: &str, sense: usize) -> Vec<String> {
        let Some(synset) = self.sense_key(lemma, pos, sense) else {
            return Vec::new();
        };
        let mut chain = Vec::new();
        let mut seen = HashSet::from([synset.clone()]);
        self.collect_parents(&synset, &mut chain, &mut seen);
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WordNetLexicon {
        let mut lex = WordNetLexicon::new();
        lex.add_synset("entity.n.01", &[]);
        lex.add_synset("organism.n.01", &["entity.n.01"]);
        lex.add_synset("person.n.01", &["organism.n.01"]);
        lex.add_synset("man.n.01", &["person.n.01"]);
        lex.add_synset("city.n.01", &["entity.n.01"]);
        lex.add_synset("box.n.01", &["entity.n.01"]);
        lex.add_word("man", "NN", &["man.n.01"]);
        lex.add_word("city", "NN", &["city.n.01"]);
        lex.add_word("box", "NN", &["box.n.01"]);
        lex.add_word("person", "NN", &["person.n.01"]);
        lex.add_exception("people", "person");
        lex
    }

    #[test]
    fn test_suffix_detachment() {
        let lex = sample();
        assert_eq!(lex.lemmas("cities", "NNS"), vec!["city"]);
        assert_eq!(lex.lemmas("boxes", "NNS"), vec!["box"]);
        assert_eq!(lex.lemmas("men", "NNS"), vec!["man"]);
        assert_eq!(lex.lemmas("City", "NN"), vec!["city"]);
    }

    #[test]
    fn test_exceptions() {
        let lex = sample();
        assert_eq!(lex.lemmas("People", "NNS"), vec!["person"]);
    }

    #[test]
    fn test_unknown_lookups_fail_soft() {
        let lex = sample();
        assert!(lex.lemmas("zyzzyva", "NN").is_empty());
        assert_eq!(lex.sense_count("zyzzyva", "NN"), 0);
        assert_eq!(lex.sense_key("man", "NN", 5), None);
        assert!(lex.hypernym_chain("zyzzyva", "NN", 0).is_empty());
        // "man" não está indexado como verbo
        assert_eq!(lex.sense_count("man", "VB"), 0);
    }

    #[test]
    fn test_hypernym_chain_nearest_first() {
        let lex = sample();
        assert_eq!(
            lex.hypernym_chain("man", "NN", 0),
            vec!["person.n.01", "organism.n.01", "entity.n.01"]
        );
        assert_eq!(lex.sense_key("man", "NN", 0).as_deref(), Some("man.n.01"));
    }

    #[test]
    fn test_from_json_validates_references() {
        let ok = r#"{
            "words": [{"lemma": "dog", "senses": ["dog.n.01"]}],
            "synsets": {"dog.n.01": ["animal.n.01"], "animal.n.01": []},
            "exceptions": {}
        }"#;
        let lex = WordNetLexicon::from_json(ok).unwrap();
        assert_eq!(lex.lemmas("dogs", "NNS"), vec!["dog"]);

        let dangling = r#"{"words": [{"lemma": "dog", "senses": ["dog.n.01"]}], "synsets": {}}"#;
        assert!(matches!(
            WordNetLexicon::from_json(dangling),
            Err(CorefError::Config(_))
        ));
    }
}
