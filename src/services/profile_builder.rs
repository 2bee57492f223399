use std::collections::{BTreeSet, HashMap};

use crate::models::{Answers, Profile, TagName};

/// One `(tag, raw value)` contribution of a survey option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagContribution {
    pub tag: TagName,
    pub value: i64,
}

/// Turns survey answers into a weighted tag profile
///
/// Holds two immutable tables: question → option → tag contributions, and
/// question → weight (1 when a question has no explicit weight). Both are
/// plain values, so tests can build alternate question sets with
/// [`ProfileBuilder::with_option`] and [`ProfileBuilder::with_weight`].
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    options: HashMap<String, HashMap<String, Vec<TagContribution>>>,
    weights: HashMap<String, i64>,
}

const DEFAULT_WEIGHT: i64 = 1;

/// Question → option → tag table of the production survey
const REFERENCE_OPTIONS: &[(&str, &[(&str, &str)])] = &[
    ("q1", &[("A", "sightseeing"), ("B", "relaxation")]),
    ("q2", &[("A", "beach"), ("B", "mountain")]),
    (
        "q3",
        &[("A", "solo"), ("B", "friends"), ("C", "family"), ("D", "couple")],
    ),
    (
        "q4",
        &[("A", "warm"), ("B", "comfortable"), ("C", "cool"), ("D", "cold")],
    ),
    (
        "q5",
        &[("A", "traditional"), ("B", "fusion"), ("C", "street"), ("D", "vegan")],
    ),
    (
        "q6",
        &[("A", "car"), ("B", "public"), ("C", "walk"), ("D", "bus")],
    ),
    (
        "q7",
        &[("A", "leisure"), ("B", "normal"), ("C", "tight"), ("D", "spontaneous")],
    ),
];

const REFERENCE_WEIGHTS: &[(&str, i64)] = &[("q1", 3), ("q2", 2)];

impl ProfileBuilder {
    /// Creates a builder with no questions configured
    pub fn new() -> Self {
        Self::default()
    }

    /// The production survey: seven questions, every option worth 1 on one
    /// tag, q1 weighted 3, q2 weighted 2 and the rest 1.
    pub fn reference() -> Self {
        let mut builder = Self::new();
        for (question, options) in REFERENCE_OPTIONS {
            for (choice, tag) in options.iter() {
                if let Ok(tag) = TagName::new(*tag) {
                    builder.insert_option(question, choice, tag, 1);
                }
            }
        }
        for (question, weight) in REFERENCE_WEIGHTS {
            builder.weights.insert(question.to_string(), *weight);
        }
        builder
    }

    /// Adds a contribution of `value` to `tag` for `(question, choice)`
    pub fn insert_option(&mut self, question: &str, choice: &str, tag: TagName, value: i64) {
        self.options
            .entry(question.to_string())
            .or_default()
            .entry(choice.to_string())
            .or_default()
            .push(TagContribution { tag, value });
    }

    /// Chaining form of [`ProfileBuilder::insert_option`]
    pub fn with_option(mut self, question: &str, choice: &str, tag: TagName, value: i64) -> Self {
        self.insert_option(question, choice, tag, value);
        self
    }

    pub fn with_weight(mut self, question: &str, weight: i64) -> Self {
        self.weights.insert(question.to_string(), weight);
        self
    }

    pub fn weight(&self, question: &str) -> i64 {
        self.weights.get(question).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Every tag any option can contribute to
    pub fn tag_names(&self) -> BTreeSet<&TagName> {
        self.options
            .values()
            .flat_map(|choices| choices.values())
            .flatten()
            .map(|contribution| &contribution.tag)
            .collect()
    }

    /// Builds the weighted tag profile for a set of answers
    ///
    /// Unknown questions and unknown choices contribute nothing; they are
    /// never an error. Contributions to the same tag from different
    /// questions add up.
    pub fn build_profile(&self, answers: &Answers) -> Profile {
        let mut profile = Profile::new();

        for (question, choice) in answers {
            let Some(contributions) = self
                .options
                .get(question)
                .and_then(|choices| choices.get(choice))
            else {
                tracing::debug!(question = %question, choice = %choice, "Ignoring unmapped answer");
                continue;
            };

            let weight = self.weight(question);
            for contribution in contributions {
                profile.add(contribution.tag.clone(), contribution.value * weight);
            }
        }

        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(q, c)| (q.to_string(), c.to_string()))
            .collect()
    }

    fn profile(pairs: &[(&str, i64)]) -> Profile {
        pairs.iter().map(|(name, w)| (tag(name), *w)).collect()
    }

    #[test]
    fn test_weighted_accumulation() {
        let builder = ProfileBuilder::reference();
        let result = builder.build_profile(&answers(&[("q1", "A"), ("q2", "A")]));
        assert_eq!(result, profile(&[("sightseeing", 3), ("beach", 2)]));
    }

    #[test]
    fn test_unknown_question_and_choice_ignored() {
        let builder = ProfileBuilder::reference();
        assert_eq!(builder.build_profile(&answers(&[("q9", "Z")])), Profile::new());
        assert_eq!(builder.build_profile(&answers(&[("q1", "D")])), Profile::new());
    }

    #[test]
    fn test_full_reference_survey() {
        let builder = ProfileBuilder::reference();
        let result = builder.build_profile(&answers(&[
            ("q1", "B"),
            ("q2", "B"),
            ("q3", "C"),
            ("q4", "D"),
            ("q5", "C"),
            ("q6", "C"),
            ("q7", "D"),
        ]));

        assert_eq!(
            result,
            profile(&[
                ("relaxation", 3),
                ("mountain", 2),
                ("family", 1),
                ("cold", 1),
                ("street", 1),
                ("walk", 1),
                ("spontaneous", 1),
            ])
        );
    }

    #[test]
    fn test_deterministic() {
        let builder = ProfileBuilder::reference();
        let input = answers(&[("q1", "A"), ("q3", "B"), ("q6", "D")]);
        assert_eq!(builder.build_profile(&input), builder.build_profile(&input));
    }

    #[test]
    fn test_reference_weights() {
        let builder = ProfileBuilder::reference();
        assert_eq!(builder.weight("q1"), 3);
        assert_eq!(builder.weight("q2"), 2);
        for q in ["q3", "q4", "q5", "q6", "q7"] {
            assert_eq!(builder.weight(q), 1);
        }
    }

    #[test]
    fn test_reference_vocabulary_size() {
        let builder = ProfileBuilder::reference();
        assert_eq!(builder.tag_names().len(), 24);
        assert!(builder.tag_names().contains(&tag("spontaneous")));
    }

    #[test]
    fn test_contributions_across_questions_add_up() {
        let builder = ProfileBuilder::new()
            .with_option("warmth", "A", tag("beach"), 2)
            .with_option("activity", "A", tag("beach"), 1)
            .with_option("activity", "A", tag("surf"), 1)
            .with_weight("warmth", 4);

        let result = builder.build_profile(&answers(&[("warmth", "A"), ("activity", "A")]));
        assert_eq!(result, profile(&[("beach", 9), ("surf", 1)]));
    }

    #[test]
    fn test_unweighted_question_defaults_to_one() {
        let builder = ProfileBuilder::new().with_option("pace", "C", tag("tight"), 5);
        let result = builder.build_profile(&answers(&[("pace", "C")]));
        assert_eq!(result, profile(&[("tight", 5)]));
    }
}
