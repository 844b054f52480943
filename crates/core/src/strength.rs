//! Proficiency ratings.
//!
//! Users rate topic identifiers as weak, moderate or strong. Subjects get a
//! derived rating by majority vote over the identifiers mapped to them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlannerError;

/// A proficiency level, for a single topic identifier or a whole subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    #[default]
    Moderate,
    Strong,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }

    /// Classify a group of ratings by strict majority.
    ///
    /// `Weak` if more than half are weak, `Strong` if more than half are
    /// strong, `Moderate` otherwise (including an empty group and exact ties).
    pub fn majority<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Strength>,
    {
        let (mut total, mut weak, mut strong) = (0usize, 0usize, 0usize);
        for rating in ratings {
            total += 1;
            match rating {
                Self::Weak => weak += 1,
                Self::Strong => strong += 1,
                Self::Moderate => {}
            }
        }

        if weak * 2 > total {
            Self::Weak
        } else if strong * 2 > total {
            Self::Strong
        } else {
            Self::Moderate
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strength {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" => Ok(Self::Weak),
            "moderate" => Ok(Self::Moderate),
            "strong" => Ok(Self::Strong),
            _ => Err(PlannerError::UnknownStrength(s.to_string())),
        }
    }
}

/// A user's ratings, keyed by topic identifier.
///
/// Identifiers that were never rated read as [`Strength::Moderate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicStrengths(IndexMap<String, Strength>);

impl TopicStrengths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, topic_id: impl Into<String>, strength: Strength) -> Self {
        self.insert(topic_id, strength);
        self
    }

    pub fn insert(&mut self, topic_id: impl Into<String>, strength: Strength) {
        self.0.insert(topic_id.into(), strength);
    }

    /// The rating for `topic_id`, or `Moderate` when it was not rated.
    pub fn get(&self, topic_id: &str) -> Strength {
        self.0.get(topic_id).copied().unwrap_or_default()
    }

    pub fn is_rated(&self, topic_id: &str) -> bool {
        self.0.contains_key(topic_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Strength)> {
        self.0.iter().map(|(id, s)| (id.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Count ratings per level: `(weak, moderate, strong)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        self.0
            .values()
            .fold((0, 0, 0), |(w, m, s), rating| match rating {
                Strength::Weak => (w + 1, m, s),
                Strength::Moderate => (w, m + 1, s),
                Strength::Strong => (w, m, s + 1),
            })
    }
}

impl<K: Into<String>> FromIterator<(K, Strength)> for TopicStrengths {
    fn from_iter<T: IntoIterator<Item = (K, Strength)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
