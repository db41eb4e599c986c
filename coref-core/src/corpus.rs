//! # Documentos de Demonstração com Cadeias de Referência
//!
//! Pequenos textos em inglês, já tokenizados e etiquetados (Penn Treebank),
//! com as menções anotadas e a cadeia gold de cada uma. Servem para a
//! demonstração web, para os testes e para gerar exemplos de treino.

use serde::Serialize;

use crate::mention::{MentionContext, TokenWindow};

/// Sentença etiquetada: pares (token, tag POS).
struct TaggedSentence {
    text: &'static str,
    tokens: &'static [(&'static str, &'static str)],
}

/// Anotação de uma menção: tokens `[start, end)` da sentença, núcleo, tipo NE e cadeia gold.
struct MentionSpan {
    sentence: usize,
    start: usize,
    end: usize,
    head: usize,
    ne: Option<&'static str>,
    gold: usize,
}

/// Um documento pronto para o [`Linker`](crate::linker::Linker).
#[derive(Debug, Clone, Serialize)]
pub struct DemoDocument {
    pub title: String,
    pub text: String,
    /// Menções em ordem de discurso.
    pub mentions: Vec<MentionContext>,
}

fn build(title: &str, sentences: &[TaggedSentence], spans: &[MentionSpan]) -> DemoDocument {
    let mentions = spans
        .iter()
        .enumerate()
        .map(|(id, span)| {
            let sentence = &sentences[span.sentence];
            let tokens: Vec<String> = sentence.tokens.iter().map(|(t, _)| t.to_string()).collect();
            let tags: Vec<String> = sentence.tokens.iter().map(|(_, p)| p.to_string()).collect();
            let (head_text, head_tag) = sentence.tokens[span.head];

            let mut mention = MentionContext::new(
                id,
                tokens[span.start..span.end].join(" "),
                head_text,
                head_tag,
                span.sentence,
            )
            .with_span(span.start, span.end)
            .with_gold_id(span.gold)
            .with_window(TokenWindow::new(tokens, tags, span.head));
            if let Some(ne) = span.ne {
                mention = mention.with_ne_type(ne);
            }
            mention
        })
        .collect();

    DemoDocument {
        title: title.to_string(),
        text: sentences.iter().map(|s| s.text).collect::<Vec<_>>().join(" "),
        mentions,
    }
}

fn span(sentence: usize, start: usize, end: usize, head: usize, ne: Option<&'static str>, gold: usize) -> MentionSpan {
    MentionSpan {
        sentence,
        start,
        end,
        head,
        ne,
        gold,
    }
}

/// Documentos de demonstração.
pub fn demo_documents() -> Vec<DemoDocument> {
    vec![
        build(
            "Viagem",
            &[
                TaggedSentence {
                    text: "John Smith flew to Paris.",
                    tokens: &[("John", "NNP"), ("Smith", "NNP"), ("flew", "VBD"), ("to", "TO"), ("Paris", "NNP"), (".", ".")],
                },
                TaggedSentence {
                    text: "He liked the city.",
                    tokens: &[("He", "PRP"), ("liked", "VBD"), ("the", "DT"), ("city", "NN"), (".", ".")],
                },
                TaggedSentence {
                    text: "Smith said it was beautiful.",
                    tokens: &[("Smith", "NNP"), ("said", "VBD"), ("it", "PRP"), ("was", "VBD"), ("beautiful", "JJ"), (".", ".")],
                },
            ],
            &[
                span(0, 0, 2, 1, Some("person"), 1),
                span(0, 4, 5, 4, Some("location"), 2),
                span(1, 0, 1, 0, None, 1),
                span(1, 2, 4, 3, None, 2),
                span(2, 0, 1, 0, Some("person"), 1),
                span(2, 2, 3, 2, None, 2),
            ],
        ),
        build(
            "Negócios",
            &[
                TaggedSentence {
                    text: "Mary Jones joined IBM in 1998.",
                    tokens: &[("Mary", "NNP"), ("Jones", "NNP"), ("joined", "VBD"), ("IBM", "NNP"), ("in", "IN"), ("1998", "CD"), (".", ".")],
                },
                TaggedSentence {
                    text: "She said International Business Machines treated her well.",
                    tokens: &[
                        ("She", "PRP"), ("said", "VBD"), ("International", "NNP"), ("Business", "NNP"),
                        ("Machines", "NNP"), ("treated", "VBD"), ("her", "PRP"), ("well", "RB"), (".", "."),
                    ],
                },
                TaggedSentence {
                    text: "It grew quickly.",
                    tokens: &[("It", "PRP"), ("grew", "VBD"), ("quickly", "RB"), (".", ".")],
                },
            ],
            &[
                span(0, 0, 2, 1, Some("person"), 1),
                span(0, 3, 4, 3, Some("organization"), 2),
                span(0, 5, 6, 5, Some("date"), 3),
                span(1, 0, 1, 0, None, 1),
                span(1, 2, 5, 4, Some("organization"), 2),
                span(1, 6, 7, 6, None, 1),
                span(2, 0, 1, 0, None, 2),
            ],
        ),
        build(
            "Contratação",
            &[
                TaggedSentence {
                    text: "The company hired Peter.",
                    tokens: &[("The", "DT"), ("company", "NN"), ("hired", "VBD"), ("Peter", "NNP"), (".", ".")],
                },
                TaggedSentence {
                    text: "He praised the firm.",
                    tokens: &[("He", "PRP"), ("praised", "VBD"), ("the", "DT"), ("firm", "NN"), (".", ".")],
                },
                TaggedSentence {
                    text: "It expanded.",
                    tokens: &[("It", "PRP"), ("expanded", "VBD"), (".", ".")],
                },
            ],
            &[
                span(0, 0, 2, 1, None, 1),
                span(0, 3, 4, 3, Some("person"), 2),
                span(1, 0, 1, 0, None, 2),
                span(1, 2, 4, 3, None, 1),
                span(2, 0, 1, 0, None, 1),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::MentionId;

    #[test]
    fn test_demo_documents_are_well_formed() {
        for doc in demo_documents() {
            assert!(!doc.mentions.is_empty(), "{}", doc.title);
            let mut last_sentence = 0;
            for (i, mention) in doc.mentions.iter().enumerate() {
                assert_eq!(mention.id(), MentionId(i));
                assert!(mention.sentence() >= last_sentence);
                assert!(mention.gold_id().is_some());
                last_sentence = mention.sentence();
            }
        }
    }

    #[test]
    fn test_mention_fields_come_from_annotations() {
        let docs = demo_documents();
        let john = &docs[0].mentions[0];
        assert_eq!(john.text(), "John Smith");
        assert_eq!(john.head_text(), "Smith");
        assert_eq!(john.head_tag(), "NNP");
        assert_eq!(john.span(), Some((0, 2)));
        assert_eq!(john.ne_type(), Some("person"));
        assert_eq!(john.window().tokens.len(), 6);
        assert_eq!(docs[0].text, "John Smith flew to Paris. He liked the city. Smith said it was beautiful.");
    }
}
