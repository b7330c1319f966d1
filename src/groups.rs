#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashSet;

use itertools::Itertools;
use rand::Rng;

use crate::{
    constants::GROUP_NAME_SEPARATOR,
    error::InternalError,
    util::{partition, shuffle},
};

/// Parses a group size given on the command line.
pub fn parse_group_size(raw: &str) -> Result<usize, InternalError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|size| *size >= 1)
        .ok_or_else(|| {
            InternalError::InvalidArgument(format!(
                "Group size must be a positive integer, got \"{raw}\"."
            ))
        })
}

/// Splits comma separated exclusion arguments into individual names.
pub fn parse_exclusions<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drops excluded names, shuffles the rest, and splits them into groups.
///
/// Excluded names that are not on the roster are ignored.
///
/// * `names`: everyone on the roster
/// * `exclude`: names to leave out
/// * `size`: people per group; the last group may be smaller
/// * `rng`: source of randomness for the shuffle
pub fn make_groups<R: Rng + ?Sized>(
    names: Vec<String>,
    exclude: &[String],
    size: usize,
    rng: &mut R,
) -> Result<Vec<Vec<String>>, InternalError> {
    let exclude: HashSet<&str> = exclude.iter().map(String::as_str).collect();
    let mut names: Vec<String> = names
        .into_iter()
        .filter(|name| !exclude.contains(name.as_str()))
        .collect();

    shuffle(&mut names, rng);
    partition(size, &names)
}

/// Renders groups one per line, names separated by ` - `.
pub fn render_groups(groups: &[Vec<String>]) -> String {
    groups
        .iter()
        .map(|group| group.join(GROUP_NAME_SEPARATOR))
        .join("\n")
}
