//! Index sets address positions in the generated uniform sequence.  Users
//! write them as range expressions, such as "1-5, 8, 10-12", with 1-based
//! positions.  Internally the positions are 0-based, deduplicated, and
//! ordered.

use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::random_variable::UniformDraws;
use crate::utils::errors::SimulationError;

/// An upper bound on the positions one parse may select.  Range expressions
/// are expanded eagerly, before the length of the uniform sequence is known.
pub const MAX_SELECTED_INDICES: usize = 1_000_000;

/// An ordered set of zero-based indices into a uniform sequence.  The set
/// serializes as its compact range text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexSet {
    indices: BTreeSet<usize>,
}

impl IndexSet {
    /// Parse a range expression.  Tokens are separated by commas, and each
    /// token is either a positive integer `i` or an inclusive range `a-b`
    /// (swapped when `a > b`).  Positions below 1, or too large to address,
    /// are dropped.  Empty tokens are skipped, and any other malformed token
    /// aborts the whole parse.  Selecting more than `MAX_SELECTED_INDICES`
    /// positions is an `InvalidParameter` error.
    pub fn parse(text: &str) -> Result<Self, SimulationError> {
        let mut indices = BTreeSet::new();
        for token in text.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            parse_token(token, &mut indices)?;
        }
        Ok(Self { indices })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// The zero-based indices, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Materialize the uniform values at these indices.  Indices past the
    /// end of the sequence are dropped, so the result may be shorter than
    /// the set.
    pub fn select(&self, uniforms: &[f64]) -> Vec<f64> {
        let selected: Vec<f64> = self
            .iter()
            .take_while(|index| *index < uniforms.len())
            .map(|index| uniforms[index])
            .collect();
        if selected.len() < self.len() {
            warn!(
                requested = self.len(),
                available = uniforms.len(),
                selected = selected.len(),
                "index selection truncated to the uniform sequence"
            );
        }
        selected
    }
}

fn parse_position(token: &str, part: &str) -> Result<i128, SimulationError> {
    part.trim()
        .parse::<i128>()
        .map_err(|_| SimulationError::InvalidRangeSyntax(token.to_string()))
}

fn parse_token(token: &str, indices: &mut BTreeSet<usize>) -> Result<(), SimulationError> {
    let (start, end) = match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_position(token, start)?;
            let end = parse_position(token, end)?;
            (start.min(end), start.max(end))
        }
        None => {
            let position = parse_position(token, token)?;
            (position, position)
        }
    };
    let start = start.max(1);
    if end < start {
        return Ok(());
    }
    let span = end - start + 1;
    if indices.len() as i128 + span > MAX_SELECTED_INDICES as i128 {
        return Err(SimulationError::invalid_parameter(
            "indices",
            format!(
                "token `{}` selects {} positions, more than the limit of {}",
                token, span, MAX_SELECTED_INDICES
            ),
        ));
    }
    for position in start..=end {
        match usize::try_from(position - 1) {
            Ok(index) => {
                indices.insert(index);
            }
            Err(_) => {
                // Every later position of the range is larger
                warn!(token, position = %position, "position beyond the addressable range dropped");
                break;
            }
        }
    }
    Ok(())
}

impl FromStr for IndexSet {
    type Err = SimulationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        IndexSet::parse(text)
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

/// Compact 1-based notation: consecutive runs collapse into `a-b`, and
/// tokens are joined with ", ".
impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut runs: Vec<(usize, usize)> = Vec::new();
        for position in self.iter().map(|index| index + 1) {
            match runs.last_mut() {
                Some((_, end)) if *end + 1 == position => *end = position,
                _ => runs.push((position, position)),
            }
        }
        let tokens: Vec<String> = runs
            .into_iter()
            .map(|(start, end)| {
                if start == end {
                    start.to_string()
                } else {
                    format!("{}-{}", start, end)
                }
            })
            .collect();
        write!(f, "{}", tokens.join(", "))
    }
}

impl TryFrom<String> for IndexSet {
    type Error = SimulationError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        IndexSet::parse(&text)
    }
}

impl From<IndexSet> for String {
    fn from(index_set: IndexSet) -> Self {
        index_set.to_string()
    }
}

/// The uniform positions feeding one random variable.  Every distribution
/// reads a single selection, except the normal distribution, which pairs
/// two selections position by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexSelection {
    Single(IndexSet),
    Paired(IndexSet, IndexSet),
}

impl IndexSelection {
    pub fn single(text: &str) -> Result<Self, SimulationError> {
        Ok(IndexSelection::Single(IndexSet::parse(text)?))
    }

    pub fn paired(first: &str, second: &str) -> Result<Self, SimulationError> {
        Ok(IndexSelection::Paired(
            IndexSet::parse(first)?,
            IndexSet::parse(second)?,
        ))
    }

    /// Paired index sets must have the same cardinality, before any
    /// truncation against the uniform sequence.
    pub fn check_pairing(&self) -> Result<(), SimulationError> {
        match self {
            IndexSelection::Paired(first, second) if first.len() != second.len() => {
                Err(SimulationError::MismatchedPairing {
                    first: first.len(),
                    second: second.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Materialize the selected uniforms.
    pub fn select(&self, uniforms: &[f64]) -> UniformDraws {
        match self {
            IndexSelection::Single(indices) => UniformDraws::Single(indices.select(uniforms)),
            IndexSelection::Paired(first, second) => {
                UniformDraws::Paired(first.select(uniforms), second.select(uniforms))
            }
        }
    }

    /// The compact index text, labeled by role, e.g. "U=1-5" or
    /// "U1=1-5; U2=6-10".
    pub fn describe(&self) -> String {
        match self {
            IndexSelection::Single(indices) => format!("U={}", indices),
            IndexSelection::Paired(first, second) => format!("U1={}; U2={}", first, second),
        }
    }
}
