//! Regras e features compartilhadas por todos os resolvedores.
//!
//! ## Features de base
//!
//! | Feature | Valores |
//! |---------|---------|
//! | `default` | sempre presente |
//! | `hm=` | núcleo igual (`exact`), mesmo lema (`lemma`) ou `none` |
//! | `sm=` | texto igual (`exact`), tokens contidos (`partial`) ou `none` |
//! | `gen=` / `num=` | `compatible`, `incompatible` ou `unknown` |
//! | `sem=` | tipo NE (`ne_match`/`ne_mismatch`) ou sentidos WordNet (`compatible`/`incompatible`/`unknown`) |
//! | `sd=` | distância em sentenças: `0`, `1`, `2`, `3-5`, `6+` |
//! | `mc=` | tamanho da entidade: `1`..`4`, `5+` |

use std::collections::BTreeSet;

use crate::config::ResolverConfig;
use crate::entity::DiscourseEntity;
use crate::features::FeatureVector;
use crate::gender::GenderCache;
use crate::lexicon::LexicalKnowledgeSource;
use crate::mention::{Gender, MentionContext, Number};

use super::Knowledge;

const DETERMINERS: &[&str] = &["the", "a", "an", "this", "that", "these", "those"];

/// Sentenças entre a menção e a última menção da entidade.
pub fn sentence_distance(mention: &MentionContext, entity: &DiscourseEntity) -> usize {
    mention
        .sentence()
        .saturating_sub(entity.last_extent().sentence())
}

/// Verdadeiro se a entidade está além da janela de sentenças configurada.
pub fn beyond_window(
    mention: &MentionContext,
    entity: &DiscourseEntity,
    config: &ResolverConfig,
) -> bool {
    config
        .sentences_back
        .map_or(false, |window| sentence_distance(mention, entity) > window)
}

/// Exclusão comum: a menção já pertence à entidade ou se sobrepõe à última menção dela.
pub fn excluded(mention: &MentionContext, entity: &DiscourseEntity) -> bool {
    entity.contains(mention.id()) || entity.last_extent().overlaps(mention)
}

/// Algum membro da entidade está na mesma cadeia gold da menção.
pub fn same_gold_chain(mention: &MentionContext, entity: &DiscourseEntity) -> bool {
    match mention.gold_id() {
        Some(gold) => entity.mentions().iter().any(|m| m.gold_id() == Some(gold)),
        None => false,
    }
}

/// Gênero da entidade: o primeiro gênero conhecido, do membro mais recente ao mais antigo.
pub fn entity_gender(entity: &DiscourseEntity, genders: &mut GenderCache<'_>) -> Gender {
    for member in entity.mentions().iter().rev() {
        let gender = genders.gender_of(member);
        if gender.is_known() {
            return gender;
        }
    }
    Gender::Unknown
}

/// Tokens em minúsculas, sem determinantes nem possessivos.
pub fn content_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.trim_end_matches("'s").trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !DETERMINERS.contains(&t.as_str()))
        .collect()
}

fn distance_bucket(distance: usize) -> &'static str {
    match distance {
        0 => "0",
        1 => "1",
        2 => "2",
        3..=5 => "3-5",
        _ => "6+",
    }
}

fn agreement<T: PartialEq>(a: T, b: T, known: impl Fn(&T) -> bool) -> &'static str {
    if !known(&a) || !known(&b) {
        "unknown"
    } else if a == b {
        "compatible"
    } else {
        "incompatible"
    }
}

fn head_match(mention: &MentionContext, entity: &DiscourseEntity, lexicon: &dyn LexicalKnowledgeSource) -> &'static str {
    let head = mention.head_lower();
    if entity.mentions().iter().any(|m| m.head_lower() == head) {
        return "hm=exact";
    }
    let lemmas = lexicon.lemmas(&head, mention.head_tag());
    if lemmas.is_empty() {
        return "hm=none";
    }
    let shared = entity.mentions().iter().any(|m| {
        lexicon
            .lemmas(m.head_text(), m.head_tag())
            .iter()
            .any(|l| lemmas.contains(l))
    });
    if shared {
        "hm=lemma"
    } else {
        "hm=none"
    }
}

fn string_match(mention: &MentionContext, entity: &DiscourseEntity) -> &'static str {
    let text = mention.text().to_lowercase();
    if entity.mentions().iter().any(|m| m.text().to_lowercase() == text) {
        return "sm=exact";
    }
    let tokens = content_tokens(mention.text());
    if tokens.is_empty() {
        return "sm=none";
    }
    let partial = entity.mentions().iter().any(|m| {
        let other = content_tokens(m.text());
        !other.is_empty()
            && (tokens.iter().all(|t| other.contains(t)) || other.iter().all(|t| tokens.contains(t)))
    });
    if partial {
        "sm=partial"
    } else {
        "sm=none"
    }
}

/// Chaves de sentido da menção e seus hiperônimos.
///
/// Sentidos fornecidos upstream têm prioridade; senão usa o primeiro lema do
/// dicionário. Pronomes não têm sentidos próprios.
pub fn sense_profile(
    mention: &MentionContext,
    lexicon: &dyn LexicalKnowledgeSource,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut keys: BTreeSet<String> = BTreeSet::new();
    let mut ancestors: BTreeSet<String> = BTreeSet::new();
    if let Some(senses) = mention.senses() {
        keys.extend(senses.iter().cloned());
    }
    if mention.is_pronoun() {
        return (keys, ancestors);
    }

    let tag = mention.head_tag();
    if let Some(lemma) = lexicon.lemmas(mention.head_text(), tag).into_iter().next() {
        for sense in 0..lexicon.sense_count(&lemma, tag) {
            if mention.senses().is_none() {
                if let Some(key) = lexicon.sense_key(&lemma, tag, sense) {
                    keys.insert(key);
                }
            }
            ancestors.extend(lexicon.hypernym_chain(&lemma, tag, sense));
        }
    }
    (keys, ancestors)
}

fn semantic_match(
    mention: &MentionContext,
    entity: &DiscourseEntity,
    lexicon: &dyn LexicalKnowledgeSource,
) -> &'static str {
    if let Some(ne) = mention.ne_type() {
        if !entity.ne_types().is_empty() {
            return if entity.ne_types().contains(ne) {
                "sem=ne_match"
            } else {
                "sem=ne_mismatch"
            };
        }
    }

    let (keys, ancestors) = sense_profile(mention, lexicon);
    let mut entity_keys = entity.senses().clone();
    let mut entity_ancestors = BTreeSet::new();
    for member in entity.mentions() {
        let (k, a) = sense_profile(member, lexicon);
        entity_keys.extend(k);
        entity_ancestors.extend(a);
    }

    if keys.is_empty() || entity_keys.is_empty() {
        "sem=unknown"
    } else if !keys.is_disjoint(&entity_keys)
        || !keys.is_disjoint(&entity_ancestors)
        || !entity_keys.is_disjoint(&ancestors)
    {
        "sem=compatible"
    } else {
        "sem=incompatible"
    }
}

/// Features de base, sempre na mesma ordem.
pub fn baseline_features(
    mention: &MentionContext,
    entity: &DiscourseEntity,
    knowledge: &Knowledge,
    genders: &mut GenderCache<'_>,
) -> FeatureVector {
    let lexicon = knowledge.lexicon.as_ref();
    let mut fv = FeatureVector::new();
    fv.push("default");
    fv.push(head_match(mention, entity, lexicon));
    fv.push(string_match(mention, entity));

    let mention_gender = genders.gender_of(mention);
    let candidate_gender = entity_gender(entity, genders);
    fv.push(format!(
        "gen={}",
        agreement(mention_gender, candidate_gender, Gender::is_known)
    ));

    let mention_number = knowledge.genders.mention_number(mention);
    let candidate_number = knowledge.genders.mention_number(entity.last_extent());
    fv.push(format!(
        "num={}",
        agreement(mention_number, candidate_number, Number::is_known)
    ));

    fv.push(semantic_match(mention, entity, lexicon));
    fv.push(format!(
        "sd={}",
        distance_bucket(sentence_distance(mention, entity))
    ));
    fv.push(match entity.len() {
        n @ 1..=4 => format!("mc={n}"),
        _ => "mc=5+".to_string(),
    });
    fv
}
