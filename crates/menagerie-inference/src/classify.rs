//! Parsing of vision model answers into animal lists.

use menagerie_core::defaults::NO_ANIMALS_DETECTED;
use menagerie_core::Classification;

/// Instruction sent with every classification request.
pub const VISION_PROMPT: &str = "Identify all animals in this image. List only the animal names, separated by commas. If there are no animals, respond with 'NONE'.";

/// Turn a comma-separated model answer into a `Classification`.
///
/// `NONE`, `NO ANIMAL`, or an answer without names yields an empty list and
/// the "no animals" error.
pub fn parse_animals(content: &str) -> Classification {
    let upper = content.to_uppercase();
    if upper.contains("NONE") || upper.contains("NO ANIMAL") {
        return Classification::failed(NO_ANIMALS_DETECTED);
    }

    let animals: Vec<String> = content
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    if animals.is_empty() {
        Classification::failed(NO_ANIMALS_DETECTED)
    } else {
        Classification::found(animals)
    }
}
