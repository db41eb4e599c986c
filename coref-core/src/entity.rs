//! # Entidades de Discurso
//!
//! Uma [`DiscourseEntity`] agrupa menções consideradas correferentes. O
//! [`EntityLog`] é o conjunto de entidades de um documento, só cresce e pertence
//! exclusivamente ao orquestrador ([`Linker`](crate::linker::Linker)): os
//! resolvedores apenas leem o log e devolvem decisões.
//!
//! ## Ordem de recência
//!
//! O log mantém, além da ordem de criação, a ordem de **recência**: quando uma
//! menção é anexada, a entidade passa para a frente. A busca por antecedentes
//! anda do mais recente para o mais antigo, então a distância em sentenças até a
//! última menção de cada candidato nunca diminui durante a busca.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CorefError, Result};
use crate::mention::{MentionContext, MentionId};

/// Identificador de uma entidade dentro do log de um documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Um grupo de menções correferentes.
///
/// Nunca é vazia: nasce com a primeira menção.
#[derive(Debug, Clone, Serialize)]
pub struct DiscourseEntity {
    id: EntityId,
    /// Membros em ordem de discurso; o último é a "last extent".
    mentions: Vec<MentionContext>,
    /// Assinatura semântica: união dos tipos de entidade nomeada dos membros.
    ne_types: BTreeSet<String>,
    /// Assinatura semântica: união dos sentidos candidatos dos membros.
    senses: BTreeSet<String>,
}

impl DiscourseEntity {
    fn new(id: EntityId, first: MentionContext) -> Self {
        let mut entity = Self {
            id,
            mentions: Vec::with_capacity(4),
            ne_types: BTreeSet::new(),
            senses: BTreeSet::new(),
        };
        entity.push(first);
        entity
    }

    fn push(&mut self, mention: MentionContext) {
        if let Some(ne) = mention.ne_type() {
            self.ne_types.insert(ne.to_string());
        }
        if let Some(senses) = mention.senses() {
            self.senses.extend(senses.iter().cloned());
        }
        self.mentions.push(mention);
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn mentions(&self) -> &[MentionContext] {
        &self.mentions
    }

    /// A menção adicionada mais recentemente.
    pub fn last_extent(&self) -> &MentionContext {
        &self.mentions[self.mentions.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn contains(&self, id: MentionId) -> bool {
        self.mentions.iter().any(|m| m.id() == id)
    }

    pub fn ne_types(&self) -> &BTreeSet<String> {
        &self.ne_types
    }

    pub fn senses(&self) -> &BTreeSet<String> {
        &self.senses
    }

    /// Menção de nome próprio mais recente, se houver.
    pub fn last_proper_noun(&self) -> Option<&MentionContext> {
        self.mentions.iter().rev().find(|m| m.is_proper_noun())
    }

    /// Texto das menções, para exibição ("John Smith | he | Smith").
    pub fn describe(&self) -> String {
        self.mentions
            .iter()
            .map(|m| m.text())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Log de entidades de um documento, em ordem de criação e de recência.
#[derive(Debug, Clone, Default)]
pub struct EntityLog {
    entities: Vec<DiscourseEntity>,
    /// Ids em ordem de recência (último = mencionado mais recentemente).
    recency: Vec<EntityId>,
}

impl EntityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&DiscourseEntity> {
        self.entities.get(id.0)
    }

    /// Entidades em ordem de criação.
    pub fn iter(&self) -> std::slice::Iter<'_, DiscourseEntity> {
        self.entities.iter()
    }

    /// Entidades da mais recentemente mencionada para a mais antiga.
    pub fn recent_first(&self) -> impl Iterator<Item = &DiscourseEntity> + '_ {
        self.recency.iter().rev().map(move |id| &self.entities[id.0])
    }

    /// Entidade que contém a menção, se já foi registrada.
    pub fn entity_of(&self, mention: MentionId) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.contains(mention))
            .map(|e| e.id())
    }

    /// Cria uma entidade nova cujo primeiro membro é `mention`.
    pub fn start_entity(&mut self, mention: MentionContext) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(DiscourseEntity::new(id, mention));
        self.recency.push(id);
        id
    }

    /// Anexa `mention` à entidade `id` e a move para a frente da recência.
    pub fn append(&mut self, id: EntityId, mention: MentionContext) -> Result<()> {
        let entity = self
            .entities
            .get_mut(id.0)
            .ok_or(CorefError::UnknownEntity(id))?;
        entity.push(mention);
        self.recency.retain(|e| *e != id);
        self.recency.push(id);
        Ok(())
    }

    pub fn into_entities(self) -> Vec<DiscourseEntity> {
        self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(id: usize, text: &str, tag: &str, sentence: usize) -> MentionContext {
        MentionContext::new(id, text, text, tag, sentence)
    }

    #[test]
    fn test_start_and_append_update_last_extent() {
        let mut log = EntityLog::new();
        let john = log.start_entity(mention(0, "John", "NNP", 0).with_ne_type("person"));
        log.append(john, mention(1, "he", "PRP", 1)).unwrap();

        let entity = log.get(john).unwrap();
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.last_extent().text(), "he");
        assert!(entity.ne_types().contains("person"));
        assert_eq!(entity.describe(), "John | he");
    }

    #[test]
    fn test_recency_moves_entity_to_front() {
        let mut log = EntityLog::new();
        let a = log.start_entity(mention(0, "John", "NNP", 0));
        let b = log.start_entity(mention(1, "Paris", "NNP", 0));

        let order: Vec<EntityId> = log.recent_first().map(|e| e.id()).collect();
        assert_eq!(order, vec![b, a]);

        log.append(a, mention(2, "he", "PRP", 1)).unwrap();
        let order: Vec<EntityId> = log.recent_first().map(|e| e.id()).collect();
        assert_eq!(order, vec![a, b]);

        // A ordem de criação não muda
        let created: Vec<EntityId> = log.iter().map(|e| e.id()).collect();
        assert_eq!(created, vec![a, b]);
    }

    #[test]
    fn test_append_unknown_entity_fails() {
        let mut log = EntityLog::new();
        let err = log.append(EntityId(4), mention(0, "it", "PRP", 0)).unwrap_err();
        assert!(matches!(err, CorefError::UnknownEntity(EntityId(4))));
        assert!(log.is_empty());
    }

    #[test]
    fn test_sense_signature_and_entity_of() {
        let mut log = EntityLog::new();
        let id = log.start_entity(
            mention(0, "the city", "NN", 0).with_senses(vec!["city.n.01".into()]),
        );
        log.append(id, mention(1, "town", "NN", 1).with_senses(vec!["town.n.01".into()]))
            .unwrap();

        let entity = log.get(id).unwrap();
        assert_eq!(entity.senses().len(), 2);
        assert_eq!(log.entity_of(MentionId(1)), Some(id));
        assert_eq!(log.entity_of(MentionId(9)), None);
    }
}
