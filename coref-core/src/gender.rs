//! # Léxico de Gênero e Pronomes
//!
//! Substitui os padrões estáticos de pronomes por dados explícitos: as listas
//! ([`GenderLists`]) são compiladas **uma vez** em expressões regulares dentro de
//! um [`GenderLexicon`], que é imutável e compartilhado entre resolvedores.
//!
//! O gênero de uma menção é decidido nesta ordem:
//! 1. Pronome (`PRP*`): forma superficial contra as listas masculina/feminina/neutra.
//! 2. Dica de gênero vinda do alimentador upstream.
//! 3. Primeiro token do texto na lista de primeiros nomes (gazetteer).
//!
//! Dentro de uma chamada a `resolve`, o [`GenderCache`] memoriza o resultado
//! por menção, para não reclassificar os mesmos membros a cada candidato.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mention::{Gender, MentionContext, MentionId, Number};

/// Listas de palavras que alimentam o [`GenderLexicon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderLists {
    pub male_pronouns: Vec<String>,
    pub female_pronouns: Vec<String>,
    pub neuter_pronouns: Vec<String>,
    pub plural_pronouns: Vec<String>,
    pub male_names: Vec<String>,
    pub female_names: Vec<String>,
}

impl Default for GenderLists {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }
        Self {
            male_pronouns: words(&["he", "him", "his", "himself"]),
            female_pronouns: words(&["she", "her", "hers", "herself"]),
            neuter_pronouns: words(&["it", "its", "itself"]),
            plural_pronouns: words(&["they", "them", "their", "theirs", "themselves"]),
            male_names: words(&[
                "john", "james", "robert", "michael", "william", "david", "richard",
                "thomas", "charles", "george", "peter", "paul", "mark", "bill",
            ]),
            female_names: words(&[
                "mary", "patricia", "jennifer", "linda", "elizabeth", "barbara", "susan",
                "margaret", "sarah", "karen", "nancy", "lisa", "anne", "hillary",
            ]),
        }
    }
}

/// Classificador de gênero/número compilado a partir de [`GenderLists`].
#[derive(Debug, Clone)]
pub struct GenderLexicon {
    singular_third_person: Regex,
    male: Regex,
    female: Regex,
    neuter: Regex,
    plural: Regex,
    male_names: HashSet<String>,
    female_names: HashSet<String>,
}

impl GenderLexicon {
    /// Léxico com as listas padrão do inglês.
    pub fn new() -> Result<Self> {
        Self::from_lists(&GenderLists::default())
    }

    pub fn from_lists(lists: &GenderLists) -> Result<Self> {
        let singular: Vec<String> = lists
            .male_pronouns
            .iter()
            .chain(&lists.female_pronouns)
            .chain(&lists.neuter_pronouns)
            .cloned()
            .collect();

        Ok(Self {
            singular_third_person: word_pattern(&singular)?,
            male: word_pattern(&lists.male_pronouns)?,
            female: word_pattern(&lists.female_pronouns)?,
            neuter: word_pattern(&lists.neuter_pronouns)?,
            plural: word_pattern(&lists.plural_pronouns)?,
            male_names: lists.male_names.iter().map(|n| n.to_lowercase()).collect(),
            female_names: lists.female_names.iter().map(|n| n.to_lowercase()).collect(),
        })
    }

    /// "he", "She", "ITSELF"... (sem distinção de caixa).
    pub fn is_singular_third_person(&self, word: &str) -> bool {
        self.singular_third_person.is_match(word)
    }

    /// Gênero de uma forma pronominal; `Unknown` fora das listas.
    pub fn pronoun_gender(&self, word: &str) -> Gender {
        if self.male.is_match(word) {
            Gender::Male
        } else if self.female.is_match(word) {
            Gender::Female
        } else if self.neuter.is_match(word) {
            Gender::Neutral
        } else {
            Gender::Unknown
        }
    }

    /// Gênero de um primeiro nome conhecido.
    pub fn name_gender(&self, name: &str) -> Gender {
        let lower = name.to_lowercase();
        if self.male_names.contains(&lower) {
            Gender::Male
        } else if self.female_names.contains(&lower) {
            Gender::Female
        } else {
            Gender::Unknown
        }
    }

    /// Gênero de uma menção: pronome → dica upstream → primeiro nome.
    pub fn mention_gender(&self, mention: &MentionContext) -> Gender {
        if mention.is_pronoun() {
            return self.pronoun_gender(mention.head_text());
        }
        if mention.gender().is_known() {
            return mention.gender();
        }
        mention
            .text()
            .split_whitespace()
            .next()
            .map(|first| self.name_gender(first))
            .unwrap_or(Gender::Unknown)
    }

    /// Número de uma menção: pronomes pelas listas, o resto pela dica upstream.
    pub fn mention_number(&self, mention: &MentionContext) -> Number {
        if mention.is_pronoun() {
            if self.is_singular_third_person(mention.head_text()) {
                return Number::Singular;
            }
            if self.plural.is_match(mention.head_text()) {
                return Number::Plural;
            }
        }
        mention.number()
    }
}

/// Compila `^(?:a|b|c)$` sem distinção de caixa.
fn word_pattern(words: &[String]) -> Result<Regex> {
    if words.is_empty() {
        // Nunca casa com nada
        return Ok(Regex::new(r"^\b$")?);
    }
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Ok(Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|")))?)
}

/// Memo de gênero por menção, válido durante uma única chamada a `resolve`.
pub struct GenderCache<'a> {
    lexicon: &'a GenderLexicon,
    memo: HashMap<MentionId, Gender>,
}

impl<'a> GenderCache<'a> {
    pub fn new(lexicon: &'a GenderLexicon) -> Self {
        Self {
            lexicon,
            memo: HashMap::new(),
        }
    }

    pub fn lexicon(&self) -> &'a GenderLexicon {
        self.lexicon
    }

    /// Gênero da menção, calculado na primeira consulta.
    pub fn gender_of(&mut self, mention: &MentionContext) -> Gender {
        let lexicon = self.lexicon;
        *self
            .memo
            .entry(mention.id())
            .or_insert_with(|| lexicon.mention_gender(mention))
    }

    /// Quantas menções já foram classificadas nesta chamada.
    pub fn computed(&self) -> usize {
        self.memo.len()
    }
}
