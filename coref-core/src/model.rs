//! # Modelo de Correferência Pré-configurado
//!
//! O modelo encapsula:
//! - **Pesos MaxEnt** dos resolvedores de pronomes e de nomes próprios
//! - **Dicionário** WordNet de bolso (pessoas, lugares, organizações)
//! - **Léxico de gênero** com as listas padrão do inglês
//!
//! ## Como os pesos foram derivados
//!
//! Os pesos foram fixados à mão a partir das regularidades mais fortes da
//! tarefa: concordância de gênero, proximidade, repetição do nome e siglas.
//! Só o desfecho `coreferent` recebe pesos, então a probabilidade é a sigmoide
//! da soma das features ativas. Em produção os pesos viriam do treinamento
//! sobre os exemplos que os resolvedores emitem em modo `Train`.

use std::sync::Arc;

use crate::config::{ResolverConfig, ResolverMode};
use crate::error::Result;
use crate::gender::{GenderLexicon, GenderLists};
use crate::lexicon::WordNetLexicon;
use crate::linker::Linker;
use crate::maxent::{MaxEntModel, COREFERENT};
use crate::resolver::{Knowledge, Resolver};

/// Projeto dos modelos embutidos.
pub const DEFAULT_PROJECT: &str = "builtin";

/// O modelo completo: classificadores e conhecimento compartilhado.
pub struct CorefModel {
    /// Classificador do resolvedor de pronomes singulares.
    pub pronoun: Arc<MaxEntModel>,
    /// Classificador do resolvedor de nomes próprios.
    pub proper_noun: Arc<MaxEntModel>,
    pub knowledge: Knowledge,
}

impl CorefModel {
    /// Constrói o modelo padrão com pesos heurísticos.
    pub fn build() -> Result<Self> {
        let lists = GenderLists::default();
        Ok(Self {
            pronoun: Arc::new(build_pronoun_model(&lists)),
            proper_noun: Arc::new(build_proper_noun_model()),
            knowledge: Knowledge::new(
                Arc::new(build_lexicon()?),
                Arc::new(GenderLexicon::from_lists(&lists)?),
            ),
        })
    }

    /// Linker com os dois resolvedores (pronomes primeiro) no modo pedido.
    pub fn linker(&self, mode: ResolverMode) -> Result<Linker> {
        let pronoun = Resolver::singular_pronoun(
            ResolverConfig::pronoun(DEFAULT_PROJECT).with_mode(mode),
            self.pronoun.clone(),
            self.knowledge.clone(),
        )?;
        let proper_noun = Resolver::proper_noun(
            ResolverConfig::proper_noun(DEFAULT_PROJECT).with_mode(mode),
            self.proper_noun.clone(),
            self.knowledge.clone(),
        )?;
        Ok(Linker::new(vec![pronoun, proper_noun]))
    }
}

fn build_pronoun_model(lists: &GenderLists) -> MaxEntModel {
    let mut m = MaxEntModel::new();
    let weights = [
        ("default", -1.0),
        ("gen=compatible", 2.0),
        ("gen=unknown", 0.3),
        ("gen=incompatible", -3.0),
        ("num=compatible", 0.3),
        ("num=incompatible", -2.0),
        ("sd=0", 0.8),
        ("sd=1", 0.5),
        ("sd=3-5", -1.0),
        ("pm=exact", 1.5),
        ("pm=compatible", 1.0),
        ("pm=incompatible", -2.0),
        ("sem=ne_mismatch", -0.5),
        ("ctx.tag=NNP", 0.4),
        ("ctx.tag=PRP", 0.3),
        ("ctx.tag=NN", 0.3),
        ("ctx.c", 0.2),
    ];
    for (feature, weight) in weights {
        m.set_weight(feature, COREFERENT, weight);
    }

    // Pronome x tipo de entidade nomeada
    let affinities: [(&[String], [f64; 3]); 3] = [
        (&lists.male_pronouns, [1.0, -1.5, -1.5]),
        (&lists.female_pronouns, [1.0, -1.5, -1.5]),
        (&lists.neuter_pronouns, [-2.0, 1.0, 0.8]),
    ];
    for (pronouns, [person, organization, location]) in affinities {
        for pronoun in pronouns {
            m.set_weight(&format!("pn.ne={pronoun},person"), COREFERENT, person);
            m.set_weight(&format!("pn.ne={pronoun},organization"), COREFERENT, organization);
            m.set_weight(&format!("pn.ne={pronoun},location"), COREFERENT, location);
        }
    }
    m
}

fn build_proper_noun_model() -> MaxEntModel {
    let mut m = MaxEntModel::new();
    let weights = [
        ("default", -2.0),
        ("po=all", 3.0),
        ("po=some", 1.0),
        ("po=none", -1.0),
        ("knownAcronym", 4.0),
        ("hm=exact", 1.0),
        ("sm=exact", 2.0),
        ("sm=partial", 0.5),
        ("sem=ne_match", 0.5),
        ("sem=ne_mismatch", -2.0),
        ("gen=incompatible", -2.0),
        ("sd=0", 0.2),
    ];
    for (feature, weight) in weights {
        m.set_weight(feature, COREFERENT, weight);
    }
    m
}

fn build_lexicon() -> Result<WordNetLexicon> {
    WordNetLexicon::from_json(
        r#"{
        "synsets": {
            "entity.n.01": [],
            "person.n.01": ["entity.n.01"],
            "man.n.01": ["person.n.01"],
            "woman.n.01": ["person.n.01"],
            "location.n.01": ["entity.n.01"],
            "city.n.01": ["location.n.01"],
            "country.n.01": ["location.n.01"],
            "organization.n.01": ["entity.n.01"],
            "company.n.01": ["organization.n.01"],
            "artifact.n.01": ["entity.n.01"],
            "box.n.01": ["artifact.n.01"]
        },
        "words": [
            {"lemma": "person", "senses": ["person.n.01"]},
            {"lemma": "man", "senses": ["man.n.01"]},
            {"lemma": "woman", "senses": ["woman.n.01"]},
            {"lemma": "city", "senses": ["city.n.01"]},
            {"lemma": "country", "senses": ["country.n.01"]},
            {"lemma": "company", "senses": ["company.n.01", "organization.n.01"]},
            {"lemma": "firm", "senses": ["company.n.01"]},
            {"lemma": "box", "senses": ["box.n.01"]}
        ],
        "exceptions": {"men": "man", "women": "woman", "people": "person"}
    }"#,
    )
}
