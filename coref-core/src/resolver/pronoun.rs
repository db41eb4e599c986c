//! # Pronomes Singulares de Terceira Pessoa
//!
//! Resolve "he", "she", "it" e formas derivadas. Antecedentes de pronomes
//! quase sempre estão perto, então a busca olha no máximo `sentences_back`
//! sentenças para trás (2 no preset).
//!
//! ## Exclusão
//! Um candidato é barrado quando:
//! - a menção já pertence a ele ou se sobrepõe à última menção dele;
//! - algum membro pronominal tem gênero diferente do pronome (comparação estrita,
//!   `Unknown` conta como diferente);
//! - algum membro não pronominal tem gênero conhecido e diferente de um gênero
//!   conhecido do pronome;
//! - a última menção é plural.
//!
//! O gênero de cada menção é calculado uma vez por chamada ([`GenderCache`]).

use crate::config::ResolverConfig;
use crate::entity::DiscourseEntity;
use crate::features::{pos_context, FeatureVector};
use crate::gender::{GenderCache, GenderLexicon};
use crate::mention::{MentionContext, Number};

use super::{common, Knowledge};

/// Regras do resolvedor de pronomes singulares.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingularPronounRules;

impl SingularPronounRules {
    pub fn can_resolve(&self, mention: &MentionContext, genders: &GenderLexicon) -> bool {
        mention.is_pronoun() && genders.is_singular_third_person(mention.head_text())
    }

    pub fn out_of_range(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        config: &ResolverConfig,
    ) -> bool {
        common::beyond_window(mention, entity, config)
    }

    pub fn excluded(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        genders: &mut GenderCache<'_>,
    ) -> bool {
        if common::excluded(mention, entity) {
            return true;
        }
        if genders.lexicon().mention_number(entity.last_extent()) == Number::Plural {
            return true;
        }

        let pronoun_gender = genders.gender_of(mention);
        entity.mentions().iter().any(|member| {
            let member_gender = genders.gender_of(member);
            if member.is_pronoun() {
                member_gender != pronoun_gender
            } else {
                member_gender.is_known()
                    && pronoun_gender.is_known()
                    && member_gender != pronoun_gender
            }
        })
    }

    /// Features de base + concordância pronominal + contexto da última menção.
    pub fn features(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        knowledge: &Knowledge,
        genders: &mut GenderCache<'_>,
    ) -> FeatureVector {
        let mut fv = common::baseline_features(mention, entity, knowledge, genders);
        let pronoun = mention.head_lower();
        let pronoun_gender = genders.gender_of(mention);

        for member in entity.mentions().iter().filter(|m| m.is_pronoun()) {
            let agreement = if member.head_lower() == pronoun {
                "pm=exact"
            } else if genders.gender_of(member) == pronoun_gender {
                "pm=compatible"
            } else {
                "pm=incompatible"
            };
            fv.push_unique(agreement);
        }

        let last = entity.last_extent();
        let window = last.window();
        fv.extend(
            pos_context(window.head, &window.tokens, &window.tags, None)
                .into_iter()
                .map(|f| format!("ctx.{f}")),
        );
        fv.push(format!("ctx.tag={}", last.head_tag()));

        fv.push(format!("pn={pronoun}"));
        for ne in entity.ne_types() {
            fv.push(format!("pn.ne={pronoun},{ne}"));
        }
        fv
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::EntityLog;
    use crate::lexicon::WordNetLexicon;
    use crate::mention::{Gender, TokenWindow};

    fn knowledge() -> Knowledge {
        Knowledge::new(
            Arc::new(WordNetLexicon::new()),
            Arc::new(GenderLexicon::new().unwrap()),
        )
    }

    fn check_excluded(mention: &MentionContext, log: &EntityLog) -> bool {
        let knowledge = knowledge();
        let mut genders = GenderCache::new(&knowledge.genders);
        let entity = log.recent_first().next().unwrap();
        SingularPronounRules.excluded(mention, entity, &mut genders)
    }

    #[test]
    fn test_applicability() {
        let lex = GenderLexicon::new().unwrap();
        let rules = SingularPronounRules;
        assert!(rules.can_resolve(&MentionContext::new(0, "She", "She", "PRP", 0), &lex));
        assert!(rules.can_resolve(&MentionContext::new(1, "its", "its", "PRP$", 0), &lex));
        assert!(!rules.can_resolve(&MentionContext::new(2, "they", "they", "PRP", 0), &lex));
        assert!(!rules.can_resolve(&MentionContext::new(3, "it", "it", "NN", 0), &lex));
    }

    #[test]
    fn test_pronoun_members_compare_strictly() {
        let mut log = EntityLog::new();
        let id = log.start_entity(MentionContext::new(0, "the ship", "ship", "NN", 0));
        log.append(id, MentionContext::new(1, "she", "she", "PRP", 1)).unwrap();

        let it = MentionContext::new(2, "it", "it", "PRP", 2);
        assert!(check_excluded(&it, &log));
        let she = MentionContext::new(3, "she", "she", "PRP", 2);
        assert!(!check_excluded(&she, &log));
    }

    #[test]
    fn test_unknown_gender_noun_is_not_excluded() {
        let mut log = EntityLog::new();
        log.start_entity(MentionContext::new(0, "the company", "company", "NN", 0));
        let it = MentionContext::new(1, "it", "it", "PRP", 1);
        assert!(!check_excluded(&it, &log));

        // Gênero conhecido e diferente barra
        let mut named = EntityLog::new();
        named.start_entity(MentionContext::new(0, "Paul", "Paul", "NNP", 0));
        assert!(check_excluded(&it, &named));
    }

    #[test]
    fn test_plural_last_extent_is_excluded() {
        let mut log = EntityLog::new();
        log.start_entity(
            MentionContext::new(0, "the firms", "firms", "NNS", 0).with_number(Number::Plural),
        );
        let it = MentionContext::new(1, "it", "it", "PRP", 1);
        assert!(check_excluded(&it, &log));
    }

    #[test]
    fn test_features_include_agreement_and_context() {
        let mut log = EntityLog::new();
        let id = log.start_entity(
            MentionContext::new(0, "John", "John", "NNP", 0)
                .with_gender(Gender::Male)
                .with_ne_type("person"),
        );
        log.append(
            id,
            MentionContext::new(1, "he", "he", "PRP", 1).with_window(TokenWindow::new(
                vec!["Then".into(), "he".into(), "left".into()],
                vec!["RB".into(), "PRP".into(), "VBD".into()],
                1,
            )),
        )
        .unwrap();
        let him = MentionContext::new(2, "him", "him", "PRP", 2);

        let knowledge = knowledge();
        let mut genders = GenderCache::new(&knowledge.genders);
        let entity = log.get(id).unwrap();
        let fv = SingularPronounRules.features(&him, entity, &knowledge, &mut genders);

        for expected in [
            "default",
            "gen=compatible",
            "pm=compatible",
            "ctx.w=he",
            "ctx.p=Then",
            "ctx.t=RB",
            "ctx.n=left",
            "ctx.tag=PRP",
            "pn=him",
            "pn.ne=him,person",
        ] {
            assert!(fv.contains(expected), "{expected} em {fv}");
        }
        assert_eq!(fv.iter().filter(|f| f.starts_with("pm=")).count(), 1);
    }
}
