//! # coref-core: Resolução de Correferência por Entidades de Discurso
//!
//! Este crate decide, menção a menção, quais sintagmas nominais de um documento
//! se referem à mesma entidade ("John Smith" ... "he" ... "Smith").
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: menções já extraídas pelo parser ([`MentionContext`]), em ordem de discurso.
//! 2.  **Resolvedores** ([`resolver`]): cada um trata um tipo de menção.
//!     *   **Pronomes singulares** ([`resolver::pronoun`]): "he", "she", "it", janela de 2 sentenças.
//!     *   **Nomes próprios** ([`resolver::proper_noun`]): "Smith", "IBM", siglas.
//! 3.  **Features** ([`features`]): vetor ordenado de features por par (menção, candidato),
//!     incluindo o contexto POS da última menção do candidato.
//! 4.  **Classificador** ([`maxent`]): P(coreferent) via [`ClassifierScorer`].
//! 5.  **Conhecimento** ([`lexicon`], [`gender`]): dicionário WordNet e listas de gênero.
//! 6.  **Saída**: [`DiscourseEntity`]s ou, no modo de treino, [`TrainingEvent`]s.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use coref_core::{CorefModel, MentionContext, ResolverMode};
//!
//! let model = CorefModel::build().unwrap();
//! let linker = model.linker(ResolverMode::Test).unwrap();
//!
//! let mentions = vec![
//!     MentionContext::new(0, "John Smith", "Smith", "NNP", 0),
//!     MentionContext::new(1, "he", "he", "PRP", 1),
//! ];
//! let doc = linker.link(&mentions);
//! assert_eq!(doc.entities.len(), 1);
//! println!("{}", doc.entities[0].describe());
//! ```
//!
//! ## Módulos Principais
//!
//! - [`linker`]: orquestrador que aplica as decisões ao log de entidades.
//! - [`resolver`]: busca por antecedentes, exclusão e pontuação.
//! - [`corpus`]: documentos de demonstração com cadeias gold.

pub mod config;
pub mod corpus;
pub mod entity;
pub mod error;
pub mod features;
pub mod gender;
pub mod lexicon;
pub mod linker;
pub mod maxent;
pub mod mention;
pub mod model;
pub mod resolver;

pub use config::{ResolverConfig, ResolverMode};
pub use entity::{DiscourseEntity, EntityId, EntityLog};
pub use error::{CorefError, Result};
pub use features::FeatureVector;
pub use linker::{check_unique_ids, LinkedDocument, Linker, LinkerEvent, MentionDecision};
pub use maxent::{ClassifierScorer, MaxEntModel, OutcomeDistribution};
pub use mention::{Gender, MentionContext, MentionId, Number};
pub use model::CorefModel;
pub use resolver::{Decision, Resolution, Resolver, TrainingEvent};
