//! # Classificador de Máxima Entropia (Pontuador)
//!
//! O resolvedor enxerga o classificador apenas pelo trait [`ClassifierScorer`]:
//! dado um vetor de features, devolve uma distribuição de probabilidade sobre um
//! vocabulário fixo de desfechos (`coreferent`, `not-coreferent`).
//!
//! [`MaxEntModel`] é o modelo log-linear que implementa esse contrato:
//!
//! $$ P(y|x) = \frac{\exp(\sum_i w_{i,y} \cdot f_i(x))}{Z(x)} $$
//!
//! Os pesos são treinados externamente, a partir dos exemplos que o resolvedor
//! emite no modo `Train`, e chegam aqui via JSON ou pelo builder [`MaxEntModel::set_weight`].
//!
//! Qualquer closure `Fn(&FeatureVector) -> Result<OutcomeDistribution>` também
//! é um pontuador, o que facilita testes e modelos de brinquedo.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CorefError, Result};
use crate::features::FeatureVector;

/// Desfecho "mesma entidade".
pub const COREFERENT: &str = "coreferent";
/// Desfecho "entidades diferentes".
pub const NOT_COREFERENT: &str = "not-coreferent";

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Distribuição de probabilidade sobre os desfechos do modelo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    probabilities: Vec<(String, f64)>,
}

impl OutcomeDistribution {
    pub fn new(probabilities: Vec<(String, f64)>) -> Self {
        Self { probabilities }
    }

    /// Distribuição binária `coreferent = p`, `not-coreferent = 1 - p`.
    pub fn binary(coreferent: f64) -> Self {
        Self::new(vec![
            (COREFERENT.to_string(), coreferent),
            (NOT_COREFERENT.to_string(), 1.0 - coreferent),
        ])
    }

    /// Probabilidade do desfecho (0 se ausente).
    pub fn probability(&self, outcome: &str) -> f64 {
        self.probabilities
            .iter()
            .find(|(o, _)| o == outcome)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    /// Probabilidades finitas em `[0, 1]` que somam 1 (com tolerância).
    pub fn is_well_formed(&self) -> bool {
        if self.probabilities.is_empty() {
            return false;
        }
        let in_range = self
            .probabilities
            .iter()
            .all(|(_, p)| p.is_finite() && (0.0..=1.0).contains(p));
        let sum: f64 = self.probabilities.iter().map(|(_, p)| p).sum();
        in_range && (sum - 1.0).abs() <= PROBABILITY_TOLERANCE
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.probabilities.iter().map(|(o, p)| (o.as_str(), *p))
    }
}

/// Contrato do classificador consultado pelos resolvedores.
pub trait ClassifierScorer: Send + Sync {
    /// Vocabulário de desfechos, fixado no carregamento do modelo.
    fn outcomes(&self) -> Vec<&str>;

    fn score(&self, features: &FeatureVector) -> Result<OutcomeDistribution>;
}

impl<F> ClassifierScorer for F
where
    F: Fn(&FeatureVector) -> Result<OutcomeDistribution> + Send + Sync,
{
    fn outcomes(&self) -> Vec<&str> {
        vec![COREFERENT, NOT_COREFERENT]
    }

    fn score(&self, features: &FeatureVector) -> Result<OutcomeDistribution> {
        self(features)
    }
}

/// Formato JSON dos pesos: `{"outcomes": [...], "weights": {"feature": {"outcome": w}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ModelData {
    outcomes: Vec<String>,
    #[serde(default)]
    weights: HashMap<String, HashMap<String, f64>>,
}

/// Modelo de Máxima Entropia (regressão logística multinomial).
#[derive(Debug, Clone)]
pub struct MaxEntModel {
    /// Mapa de pesos $w_{feature, desfecho}$.
    weights: HashMap<(String, String), f64>,
    /// Desfechos possíveis, em ordem fixa.
    outcomes: Vec<String>,
}

impl MaxEntModel {
    /// Modelo binário vazio (`coreferent`/`not-coreferent`, todos os pesos 0).
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
            outcomes: vec![COREFERENT.to_string(), NOT_COREFERENT.to_string()],
        }
    }

    /// Carrega pesos de JSON e valida o vocabulário.
    ///
    /// O vocabulário precisa conter `coreferent`, e todo peso precisa apontar
    /// para um desfecho conhecido.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: ModelData = serde_json::from_str(json)?;
        if !data.outcomes.iter().any(|o| o == COREFERENT) {
            return Err(CorefError::config(format!(
                "vocabulário do modelo sem o desfecho '{COREFERENT}'"
            )));
        }
        let mut model = Self {
            weights: HashMap::new(),
            outcomes: data.outcomes,
        };
        for (feature, per_outcome) in data.weights {
            for (outcome, weight) in per_outcome {
                if !model.outcomes.contains(&outcome) {
                    return Err(CorefError::config(format!(
                        "peso para desfecho desconhecido '{outcome}'"
                    )));
                }
                if !weight.is_finite() {
                    return Err(CorefError::config(format!(
                        "peso não finito para '{feature}'"
                    )));
                }
                model.weights.insert((feature.clone(), outcome), weight);
            }
        }
        Ok(model)
    }

    /// Define o peso de uma feature para um desfecho.
    pub fn set_weight(&mut self, feature: &str, outcome: &str, weight: f64) {
        self.weights
            .insert((feature.to_string(), outcome.to_string()), weight);
    }

    pub fn weight(&self, feature: &str, outcome: &str) -> f64 {
        *self
            .weights
            .get(&(feature.to_string(), outcome.to_string()))
            .unwrap_or(&0.0)
    }

    pub fn num_weights(&self) -> usize {
        self.weights.len()
    }

    fn compute_scores(&self, fv: &FeatureVector) -> Vec<f64> {
        self.outcomes
            .iter()
            .map(|outcome| {
                fv.iter()
                    .filter_map(|f| self.weights.get(&(f.clone(), outcome.clone())))
                    .sum()
            })
            .collect()
    }

    fn softmax(scores: &[f64]) -> Vec<f64> {
        let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max_score).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.iter().map(|e| e / sum).collect()
    }
}

impl Default for MaxEntModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierScorer for MaxEntModel {
    fn outcomes(&self) -> Vec<&str> {
        self.outcomes.iter().map(String::as_str).collect()
    }

    fn score(&self, features: &FeatureVector) -> Result<OutcomeDistribution> {
        if features.is_empty() {
            return Err(CorefError::scoring("vetor de features vazio"));
        }
        let probs = Self::softmax(&self.compute_scores(features));
        Ok(OutcomeDistribution::new(
            self.outcomes.iter().cloned().zip(probs).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(features: &[&str]) -> FeatureVector {
        FeatureVector::from(features.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let mut model = MaxEntModel::new();
        model.set_weight("sd=0", COREFERENT, 1.2);
        model.set_weight("gen=incompatible", NOT_COREFERENT, 3.0);

        let dist = model.score(&fv(&["default", "sd=0", "gen=incompatible"])).unwrap();
        assert!(dist.is_well_formed());
        assert!(dist.probability(NOT_COREFERENT) > dist.probability(COREFERENT));
    }

    #[test]
    fn test_binary_weights_are_a_sigmoid() {
        let mut model = MaxEntModel::new();
        model.set_weight("a", COREFERENT, 2.0);

        let p = model.score(&fv(&["a"])).unwrap().probability(COREFERENT);
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((p - expected).abs() < 1e-12);

        // Features sem peso não contribuem
        let neutral = model.score(&fv(&["unseen"])).unwrap().probability(COREFERENT);
        assert!((neutral - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_vector_is_scoring_error() {
        let model = MaxEntModel::new();
        assert!(matches!(
            model.score(&FeatureVector::new()),
            Err(CorefError::Scoring(_))
        ));
    }

    #[test]
    fn test_from_json_validation() {
        let model = MaxEntModel::from_json(
            r#"{"outcomes": ["coreferent", "not-coreferent"],
                "weights": {"hm=exact": {"coreferent": 2.5}}}"#,
        )
        .unwrap();
        assert_eq!(model.weight("hm=exact", COREFERENT), 2.5);
        assert_eq!(model.num_weights(), 1);

        let no_coref = MaxEntModel::from_json(r#"{"outcomes": ["same", "diff"]}"#);
        assert!(matches!(no_coref, Err(CorefError::Config(_))));

        let bad_outcome = MaxEntModel::from_json(
            r#"{"outcomes": ["coreferent"], "weights": {"x": {"other": 1.0}}}"#,
        );
        assert!(matches!(bad_outcome, Err(CorefError::Config(_))));
    }

    #[test]
    fn test_distribution_helpers() {
        let dist = OutcomeDistribution::binary(0.9);
        assert!(dist.is_well_formed());
        assert_eq!(dist.probability("missing"), 0.0);

        let broken = OutcomeDistribution::new(vec![(COREFERENT.into(), 0.9), (NOT_COREFERENT.into(), 0.9)]);
        assert!(!broken.is_well_formed());
        assert!(!OutcomeDistribution::new(vec![]).is_well_formed());
    }

    #[test]
    fn test_closure_is_a_scorer() {
        let scorer =
            |_: &FeatureVector| -> Result<OutcomeDistribution> { Ok(OutcomeDistribution::binary(0.25)) };
        assert_eq!(scorer.outcomes(), vec![COREFERENT, NOT_COREFERENT]);
        let p = ClassifierScorer::score(&scorer, &fv(&["x"])).unwrap().probability(COREFERENT);
        assert_eq!(p, 0.25);
    }
}
