//! # Linker: Orquestrador de Documentos com Eventos Observáveis
//!
//! O linker percorre as menções de um documento em ordem de discurso e, para
//! cada uma, pergunta aos resolvedores (na ordem configurada) quem a trata. O
//! primeiro resolvedor aplicável decide; menções que ninguém trata iniciam
//! entidades novas.
//!
//! O [`EntityLog`] pertence só ao linker: os resolvedores leem o log e devolvem
//! uma decisão, e é aqui que ela é aplicada.
//!
//! # Modos de Uso
//! - **Sync**: [`Linker::link`] devolve o documento ligado.
//! - **Streaming**: [`Linker::link_streaming`] empurra [`LinkerEvent`]s por um
//!   canal `mpsc`, para o servidor WebSocket.
//! - **Lote**: [`Linker::link_documents`] liga vários documentos em paralelo (rayon).

use std::collections::HashSet;
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entity::{DiscourseEntity, EntityId, EntityLog};
use crate::error::{CorefError, Result};
use crate::mention::{MentionContext, MentionId};
use crate::resolver::{CandidateScore, Decision, Resolver, TrainingEvent};

/// Eventos emitidos durante a ligação de um documento.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum LinkerEvent {
    /// **Passo 1**: uma menção entrou no linker.
    MentionReceived {
        mention: MentionId,
        text: String,
        sentence: usize,
    },
    /// **Passo 2**: um candidato foi examinado pelo resolvedor responsável.
    CandidateScored {
        mention: MentionId,
        resolver: String,
        candidate: CandidateScore,
    },
    /// **Passo 3**: a decisão foi aplicada ao log.
    DecisionMade(MentionDecision),
    /// **Conclusão**: entidades finais e estatísticas de tempo.
    Done {
        entities: Vec<DiscourseEntity>,
        decisions: Vec<MentionDecision>,
        training_events: Vec<TrainingEvent>,
        processing_ms: u64,
    },
}

/// Destino de uma menção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionDecision {
    pub mention: MentionId,
    pub text: String,
    /// Resolvedor que decidiu; `None` se nenhum era aplicável.
    pub resolver: Option<String>,
    pub decision: Decision,
    /// Entidade onde a menção foi parar.
    pub entity: EntityId,
}

/// Resultado da ligação de um documento.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedDocument {
    pub entities: Vec<DiscourseEntity>,
    pub decisions: Vec<MentionDecision>,
    /// Exemplos de treino (só resolvedores em modo `Train` produzem).
    pub training_events: Vec<TrainingEvent>,
}

/// Orquestrador de resolvedores.
#[derive(Clone)]
pub struct Linker {
    resolvers: Vec<Resolver>,
}

impl Linker {
    pub fn new(resolvers: Vec<Resolver>) -> Self {
        Self { resolvers }
    }

    pub fn resolvers(&self) -> &[Resolver] {
        &self.resolvers
    }

    /// Liga um documento de forma síncrona.
    pub fn link(&self, mentions: &[MentionContext]) -> LinkedDocument {
        self.run(mentions, |_| {})
    }

    /// Liga um documento enviando eventos de progresso em tempo real.
    ///
    /// # Fluxo de Eventos
    /// 1. `MentionReceived`
    /// 2. `CandidateScored` (um por candidato examinado)
    /// 3. `DecisionMade`
    /// 4. `Done`, uma única vez no final.
    ///
    /// Um receptor fechado não interrompe a ligação.
    pub fn link_streaming(&self, mentions: &[MentionContext], tx: mpsc::Sender<LinkerEvent>) {
        let start = Instant::now();
        let document = self.run(mentions, |event| {
            let _ = tx.send(event);
        });
        let _ = tx.send(LinkerEvent::Done {
            entities: document.entities,
            decisions: document.decisions,
            training_events: document.training_events,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    /// Liga vários documentos em paralelo; cada documento tem seu próprio log.
    pub fn link_documents(&self, documents: &[Vec<MentionContext>]) -> Vec<LinkedDocument> {
        documents.par_iter().map(|doc| self.link(doc)).collect()
    }

    fn run<F>(&self, mentions: &[MentionContext], mut emit: F) -> LinkedDocument
    where
        F: FnMut(LinkerEvent),
    {
        let start = Instant::now();
        let mut log = EntityLog::new();
        let mut decisions = Vec::with_capacity(mentions.len());
        let mut training_events = Vec::new();
        let mut last_sentence = 0;

        for mention in mentions {
            if mention.sentence() < last_sentence {
                warn!(
                    mention = mention.text(),
                    sentence = mention.sentence(),
                    previous = last_sentence,
                    "menções fora da ordem de discurso"
                );
            }
            last_sentence = last_sentence.max(mention.sentence());

            emit(LinkerEvent::MentionReceived {
                mention: mention.id(),
                text: mention.text().to_string(),
                sentence: mention.sentence(),
            });

            let mut decision = Decision::NotApplicable;
            let mut handled_by = None;
            for resolver in &self.resolvers {
                let resolution = resolver.resolve(mention, &log);
                if resolution.decision == Decision::NotApplicable {
                    continue;
                }
                for candidate in resolution.candidates {
                    emit(LinkerEvent::CandidateScored {
                        mention: mention.id(),
                        resolver: resolver.name().to_string(),
                        candidate,
                    });
                }
                training_events.extend(resolution.events);
                decision = resolution.decision;
                handled_by = Some(resolver.name().to_string());
                break;
            }

            let entity = apply(&mut log, mention, decision);
            debug!(mention = mention.text(), entity = %entity, decision = ?decision, "menção ligada");

            let made = MentionDecision {
                mention: mention.id(),
                text: mention.text().to_string(),
                resolver: handled_by,
                decision,
                entity,
            };
            emit(LinkerEvent::DecisionMade(made.clone()));
            decisions.push(made);
        }

        info!(
            mentions = mentions.len(),
            entities = log.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "documento ligado"
        );

        LinkedDocument {
            entities: log.into_entities(),
            decisions,
            training_events,
        }
    }
}

/// Confere que cada menção do documento tem um identificador próprio.
///
/// A exclusão por pertinência compara ids, então ids repetidos fariam uma
/// menção ser tratada como já ligada.
pub fn check_unique_ids(mentions: &[MentionContext]) -> Result<()> {
    let mut seen = HashSet::with_capacity(mentions.len());
    for mention in mentions {
        if !seen.insert(mention.id()) {
            return Err(CorefError::DuplicateMention(mention.id()));
        }
    }
    Ok(())
}

/// Aplica a decisão ao log e devolve a entidade que recebeu a menção.
fn apply(log: &mut EntityLog, mention: &MentionContext, decision: Decision) -> EntityId {
    match decision {
        Decision::Link(id) => match log.append(id, mention.clone()) {
            Ok(()) => id,
            Err(err) => {
                warn!(mention = mention.text(), error = %err, "LINK inválido, iniciando entidade nova");
                log.start_entity(mention.clone())
            }
        },
        Decision::NewEntity | Decision::NotApplicable => log.start_entity(mention.clone()),
    }
}
