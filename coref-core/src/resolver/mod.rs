//! # Resolvedores de Correferência
//!
//! Um [`Resolver`] decide, para uma única menção, se ela se liga a alguma
//! entidade já existente no [`EntityLog`] ou se inicia uma entidade nova.
//!
//! O algoritmo é o mesmo para todos os tipos de menção; o que muda é o
//! conjunto de regras ([`ResolverKind`]): quem é aplicável, quando um candidato
//! está longe demais, quando é incompatível e quais features descrevem o par.
//!
//! ## Busca por antecedentes
//!
//! ```text
//! para cada entidade (mais recente → mais antiga, até entities_back):
//!     fora do alcance?  → PARA a busca inteira
//!     excluída?         → pula (registrada como Excluded)
//!     features(menção, entidade)
//!     Train: rotula pelo gold_id e emite TrainingEvent
//!     Test:  P(coreferent) pelo classificador, guarda o máximo
//! ```
//!
//! No modo `Test` o melhor candidato só vira LINK se `P >= threshold`. Em caso
//! de empate vence o mais recente (o primeiro visitado).
//!
//! O resolvedor nunca altera o log: ele devolve uma [`Resolution`] e o
//! orquestrador ([`Linker`](crate::linker::Linker)) aplica a decisão.

pub mod common;
pub mod pronoun;
pub mod proper_noun;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ResolverConfig, ResolverMode};
use crate::entity::{DiscourseEntity, EntityId, EntityLog};
use crate::error::{CorefError, Result};
use crate::features::FeatureVector;
use crate::gender::{GenderCache, GenderLexicon};
use crate::lexicon::LexicalKnowledgeSource;
use crate::maxent::{ClassifierScorer, COREFERENT, NOT_COREFERENT};
use crate::mention::MentionContext;

pub use pronoun::SingularPronounRules;
pub use proper_noun::ProperNounRules;

/// Resultado de uma tentativa de resolução.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entity", rename_all = "snake_case")]
pub enum Decision {
    /// A menção pertence à entidade indicada.
    Link(EntityId),
    /// Nenhum candidato aceito: a menção inicia uma entidade nova.
    NewEntity,
    /// O resolvedor não trata este tipo de menção.
    NotApplicable,
}

/// O que aconteceu com um candidato durante a busca.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Pontuado pelo classificador: P(coreferent).
    Scored(f64),
    /// Rotulado no modo de treino.
    Labeled(String),
    /// Barrado pelo teste de exclusão.
    Excluded,
    /// O classificador falhou; equivale a probabilidade 0 e nunca é elegível.
    ScoreFailed,
}

/// Registro de um candidato examinado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub entity: EntityId,
    /// Sentenças entre a menção e a última menção do candidato.
    pub sentence_distance: usize,
    pub status: CandidateStatus,
    /// Ausente para candidatos excluídos.
    pub features: Option<FeatureVector>,
}

/// Exemplo rotulado emitido no modo `Train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEvent {
    pub outcome: String,
    pub features: FeatureVector,
}

impl fmt::Display for TrainingEvent {
    /// Formato de linha do treinador: `desfecho f1 f2 ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.features.is_empty() {
            write!(f, "{}", self.outcome)
        } else {
            write!(f, "{} {}", self.outcome, self.features)
        }
    }
}

/// Decisão mais o rastro da busca.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub decision: Decision,
    /// Candidatos na ordem em que foram visitados.
    pub candidates: Vec<CandidateScore>,
    /// Vazio fora do modo `Train`.
    pub events: Vec<TrainingEvent>,
}

impl Resolution {
    fn not_applicable() -> Self {
        Self {
            decision: Decision::NotApplicable,
            candidates: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// Conhecimento externo compartilhado (somente leitura) entre resolvedores.
#[derive(Clone)]
pub struct Knowledge {
    pub lexicon: Arc<dyn LexicalKnowledgeSource>,
    pub genders: Arc<GenderLexicon>,
}

impl Knowledge {
    pub fn new(lexicon: Arc<dyn LexicalKnowledgeSource>, genders: Arc<GenderLexicon>) -> Self {
        Self { lexicon, genders }
    }
}

/// Conjuntos de regras disponíveis.
#[derive(Debug, Clone, Copy)]
pub enum ResolverKind {
    SingularPronoun(SingularPronounRules),
    ProperNoun(ProperNounRules),
}

impl ResolverKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResolverKind::SingularPronoun(_) => "singular_pronoun",
            ResolverKind::ProperNoun(_) => "proper_noun",
        }
    }

    pub fn can_resolve(&self, mention: &MentionContext, knowledge: &Knowledge) -> bool {
        match self {
            ResolverKind::SingularPronoun(rules) => rules.can_resolve(mention, &knowledge.genders),
            ResolverKind::ProperNoun(rules) => rules.can_resolve(mention),
        }
    }

    pub fn out_of_range(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        config: &ResolverConfig,
    ) -> bool {
        match self {
            ResolverKind::SingularPronoun(rules) => rules.out_of_range(mention, entity, config),
            ResolverKind::ProperNoun(rules) => rules.out_of_range(mention, entity, config),
        }
    }

    pub fn excluded(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        genders: &mut GenderCache<'_>,
    ) -> bool {
        match self {
            ResolverKind::SingularPronoun(rules) => rules.excluded(mention, entity, genders),
            ResolverKind::ProperNoun(rules) => rules.excluded(mention, entity),
        }
    }

    pub fn features(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        knowledge: &Knowledge,
        genders: &mut GenderCache<'_>,
    ) -> FeatureVector {
        match self {
            ResolverKind::SingularPronoun(rules) => {
                rules.features(mention, entity, knowledge, genders)
            }
            ResolverKind::ProperNoun(rules) => rules.features(mention, entity, knowledge, genders),
        }
    }
}

/// Resolvedor: regras + configuração + classificador + conhecimento.
///
/// Imutável depois de construído; `resolve` só lê o log, então o mesmo
/// resolvedor pode atender vários documentos em paralelo.
#[derive(Clone)]
pub struct Resolver {
    kind: ResolverKind,
    config: ResolverConfig,
    scorer: Arc<dyn ClassifierScorer>,
    knowledge: Knowledge,
}

impl Resolver {
    /// Valida a configuração e o vocabulário do classificador.
    pub fn new(
        kind: ResolverKind,
        config: ResolverConfig,
        scorer: Arc<dyn ClassifierScorer>,
        knowledge: Knowledge,
    ) -> Result<Self> {
        config.validate()?;
        if !scorer.outcomes().contains(&COREFERENT) {
            return Err(CorefError::config(format!(
                "classificador do projeto '{}' não conhece o desfecho '{COREFERENT}'",
                config.project
            )));
        }
        Ok(Self {
            kind,
            config,
            scorer,
            knowledge,
        })
    }

    /// Resolvedor de pronomes singulares de terceira pessoa.
    pub fn singular_pronoun(
        config: ResolverConfig,
        scorer: Arc<dyn ClassifierScorer>,
        knowledge: Knowledge,
    ) -> Result<Self> {
        Self::new(
            ResolverKind::SingularPronoun(SingularPronounRules),
            config,
            scorer,
            knowledge,
        )
    }

    /// Resolvedor de nomes próprios.
    pub fn proper_noun(
        config: ResolverConfig,
        scorer: Arc<dyn ClassifierScorer>,
        knowledge: Knowledge,
    ) -> Result<Self> {
        Self::new(
            ResolverKind::ProperNoun(ProperNounRules),
            config,
            scorer,
            knowledge,
        )
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn kind(&self) -> &ResolverKind {
        &self.kind
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn mode(&self) -> ResolverMode {
        self.config.mode
    }

    pub fn can_resolve(&self, mention: &MentionContext) -> bool {
        self.kind.can_resolve(mention, &self.knowledge)
    }

    /// Decide o destino de `mention` diante das entidades atuais.
    ///
    /// Determinística: mesmo log, mesma menção e mesmo classificador produzem
    /// sempre a mesma [`Resolution`].
    pub fn resolve(&self, mention: &MentionContext, entities: &EntityLog) -> Resolution {
        if !self.can_resolve(mention) {
            return Resolution::not_applicable();
        }

        let mut genders = GenderCache::new(&self.knowledge.genders);
        let mut candidates = Vec::new();
        let mut events = Vec::new();
        let mut best: Option<(EntityId, f64)> = None;
        let mut referent: Option<EntityId> = None;

        for entity in entities.recent_first().take(self.config.entities_back) {
            let distance = common::sentence_distance(mention, entity);
            if self.kind.out_of_range(mention, entity, &self.config) {
                debug!(
                    resolver = self.name(),
                    entity = %entity.id(),
                    distance,
                    "fora do alcance, fim da busca"
                );
                break;
            }

            if self.kind.excluded(mention, entity, &mut genders) {
                debug!(resolver = self.name(), entity = %entity.id(), "candidato excluído");
                candidates.push(CandidateScore {
                    entity: entity.id(),
                    sentence_distance: distance,
                    status: CandidateStatus::Excluded,
                    features: None,
                });
                continue;
            }

            let features = self
                .kind
                .features(mention, entity, &self.knowledge, &mut genders);

            match self.config.mode {
                ResolverMode::Train => {
                    let outcome = if common::same_gold_chain(mention, entity) {
                        if referent.is_none() {
                            referent = Some(entity.id());
                        }
                        COREFERENT
                    } else {
                        NOT_COREFERENT
                    };
                    events.push(TrainingEvent {
                        outcome: outcome.to_string(),
                        features: features.clone(),
                    });
                    candidates.push(CandidateScore {
                        entity: entity.id(),
                        sentence_distance: distance,
                        status: CandidateStatus::Labeled(outcome.to_string()),
                        features: Some(features),
                    });
                    if self.config.prefer_first_referent && referent.is_some() {
                        break;
                    }
                }
                ResolverMode::Test => {
                    let status = match self.coreferent_probability(mention, entity, &features) {
                        Some(p) => {
                            // `>` estrito: empates ficam com o mais recente
                            if best.map_or(true, |(_, top)| p > top) {
                                best = Some((entity.id(), p));
                            }
                            CandidateStatus::Scored(p)
                        }
                        None => CandidateStatus::ScoreFailed,
                    };
                    debug!(
                        resolver = self.name(),
                        entity = %entity.id(),
                        status = ?status,
                        "candidato pontuado"
                    );
                    let accepted = matches!(
                        status,
                        CandidateStatus::Scored(p) if p >= self.config.threshold
                    );
                    candidates.push(CandidateScore {
                        entity: entity.id(),
                        sentence_distance: distance,
                        status,
                        features: Some(features),
                    });
                    if self.config.prefer_first_referent && accepted {
                        break;
                    }
                }
            }
        }

        let decision = match self.config.mode {
            ResolverMode::Train => referent.map_or(Decision::NewEntity, Decision::Link),
            ResolverMode::Test => match best {
                Some((id, p)) if p >= self.config.threshold => Decision::Link(id),
                _ => Decision::NewEntity,
            },
        };
        debug!(
            resolver = self.name(),
            mention = mention.text(),
            candidates = candidates.len(),
            genders = genders.computed(),
            decision = ?decision,
            "busca concluída"
        );

        Resolution {
            decision,
            candidates,
            events,
        }
    }

    /// P(coreferent), ou `None` se o classificador falhou.
    fn coreferent_probability(
        &self,
        mention: &MentionContext,
        entity: &DiscourseEntity,
        features: &FeatureVector,
    ) -> Option<f64> {
        match self.scorer.score(features) {
            Ok(dist) if dist.is_well_formed() => Some(dist.probability(COREFERENT)),
            Ok(_) => {
                warn!(
                    resolver = self.name(),
                    mention = mention.text(),
                    entity = %entity.id(),
                    "distribuição malformada, candidato ignorado"
                );
                None
            }
            Err(err) => {
                warn!(
                    resolver = self.name(),
                    mention = mention.text(),
                    entity = %entity.id(),
                    error = %err,
                    "falha ao pontuar, candidato ignorado"
                );
                None
            }
        }
    }
}
