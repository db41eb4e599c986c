//! # Nomes Próprios
//!
//! Resolve menções cujo núcleo é `NNP*` ou `CD` ("Smith", "IBM", "1984").
//! Só entidades que já têm algum nome próprio entre seus membros são candidatas.
//!
//! Features próprias, comparando com o nome próprio mais recente da entidade:
//! - `po=all|some|none`: quantos tokens da menção aparecem no nome;
//! - `knownAcronym`: um lado é a sigla do outro ("IBM" ↔ "International Business Machines").

use crate::config::ResolverConfig;
use crate::entity::DiscourseEntity;
use crate::features::FeatureVector;
use crate::gender::GenderCache;
use crate::mention::MentionContext;

use super::{common, Knowledge};

/// Regras do resolvedor de nomes próprios.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProperNounRules;

impl ProperNounRules {
    pub fn can_resolve(&self, mention: &MentionContext) -> bool {
        mention.is_proper_noun() || mention.head_tag() == "CD"
    }

    /// Só há janela se a configuração definir uma (o preset não define).
    pub fn out_of_range(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        config: &ResolverConfig,
    ) -> bool {
        common::beyond_window(mention, entity, config)
    }

    pub fn excluded(&self, mention: &MentionContext, entity: &DiscourseEntity) -> bool {
        common::excluded(mention, entity) || entity.last_proper_noun().is_none()
    }

    pub fn features(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        knowledge: &Knowledge,
        genders: &mut GenderCache<'_>,
    ) -> FeatureVector {
        let mut fv = common::baseline_features(mention, entity, knowledge, genders);
        if let Some(name) = entity.last_proper_noun() {
            fv.push(token_overlap(mention.text(), name.text()));
            if is_acronym_of(mention.text(), name.text()) || is_acronym_of(name.text(), mention.text()) {
                fv.push("knownAcronym");
            }
        }
        fv.push(format!("pn.tag={}", mention.head_tag()));
        fv
    }
}

fn token_overlap(mention: &str, name: &str) -> &'static str {
    let tokens = common::content_tokens(mention);
    let name_tokens = common::content_tokens(name);
    let shared = tokens.iter().filter(|t| name_tokens.contains(t)).count();
    match shared {
        0 => "po=none",
        n if n == tokens.len() => "po=all",
        _ => "po=some",
    }
}

/// `short` é a sigla formada pelas iniciais maiúsculas de `long`.
fn is_acronym_of(short: &str, long: &str) -> bool {
    let letters: String = short.chars().filter(|c| *c != '.').collect();
    if letters.chars().count() < 2 || !letters.chars().all(|c| c.is_ascii_uppercase()) {
        return false;
    }
    let words: Vec<&str> = long.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    let initials: String = words
        .iter()
        .filter_map(|w| w.chars().next())
        .filter(|c| c.is_uppercase())
        .collect();
    initials == letters
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::EntityLog;
    use crate::gender::GenderLexicon;
    use crate::lexicon::WordNetLexicon;

    fn features(mention: &MentionContext, log: &EntityLog) -> FeatureVector {
        let knowledge = Knowledge::new(
            Arc::new(WordNetLexicon::new()),
            Arc::new(GenderLexicon::new().unwrap()),
        );
        let mut genders = GenderCache::new(&knowledge.genders);
        let entity = log.recent_first().next().unwrap();
        ProperNounRules.features(mention, entity, &knowledge, &mut genders)
    }

    #[test]
    fn test_applicability() {
        let rules = ProperNounRules;
        assert!(rules.can_resolve(&MentionContext::new(0, "Smith", "Smith", "NNP", 0)));
        assert!(rules.can_resolve(&MentionContext::new(1, "1984", "1984", "CD", 0)));
        assert!(!rules.can_resolve(&MentionContext::new(2, "he", "he", "PRP", 0)));
    }

    #[test]
    fn test_entities_without_names_are_excluded() {
        let mut log = EntityLog::new();
        let id = log.start_entity(MentionContext::new(0, "the city", "city", "NN", 0));
        let paris = MentionContext::new(1, "Paris", "Paris", "NNP", 1);
        assert!(ProperNounRules.excluded(&paris, log.get(id).unwrap()));

        let named = log.start_entity(MentionContext::new(2, "Paris", "Paris", "NNP", 0).with_span(4, 5));
        assert!(!ProperNounRules.excluded(&paris, log.get(named).unwrap()));
    }

    #[test]
    fn test_partial_name_overlap() {
        let mut log = EntityLog::new();
        log.start_entity(MentionContext::new(0, "John Smith", "Smith", "NNP", 0));
        let smith = MentionContext::new(1, "Smith", "Smith", "NNP", 2);

        let fv = features(&smith, &log);
        assert!(fv.contains("po=all"));
        assert!(fv.contains("hm=exact"));
        assert!(!fv.contains("knownAcronym"));

        let jane = MentionContext::new(2, "Jane Smith", "Smith", "NNP", 2);
        assert!(features(&jane, &log).contains("po=some"));
    }

    #[test]
    fn test_acronyms() {
        assert!(is_acronym_of("IBM", "International Business Machines"));
        assert!(is_acronym_of("U.N.", "United Nations"));
        assert!(!is_acronym_of("IBM", "Intel"));
        assert!(!is_acronym_of("Ibm", "International Business Machines"));

        let mut log = EntityLog::new();
        log.start_entity(MentionContext::new(0, "IBM", "IBM", "NNP", 0));
        let long = MentionContext::new(1, "International Business Machines", "Machines", "NNP", 1);
        let fv = features(&long, &log);
        assert!(fv.contains("knownAcronym"));
        assert!(fv.contains("po=none"));
    }
}
