//! Element and rarity lookup tables

use crate::config::effects::{StatusEffectDef, StatusEffectId};
use crate::types::{Element, Rarity};
use serde::{Deserialize, Serialize};

/// How an attack element fares against a defender element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementalRelation {
    Advantage,
    Weakness,
    Neutral,
}

/// Elements `element` is strong against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAdvantage {
    pub element: Element,
    #[serde(default)]
    pub advantages: Vec<Element>,
}

/// Power multiplier for one rarity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityMultiplier {
    pub rarity: Rarity,
    pub multiplier: f64,
}

/// Read-only lookups the rules core consumes
pub trait DataTables {
    /// Relation of `attack` against `defend`
    fn elemental_relation(&self, attack: Element, defend: Element) -> ElementalRelation;

    fn rarity_multiplier(&self, rarity: Rarity) -> f64;

    fn status_effect(&self, id: StatusEffectId) -> Option<&StatusEffectDef>;
}

/// Resolve a relation from an advantage table
///
/// Neutral never takes part in either direction.
pub fn relation_in(table: &[ElementAdvantage], attack: Element, defend: Element) -> ElementalRelation {
    if attack.is_neutral() || defend.is_neutral() {
        return ElementalRelation::Neutral;
    }

    let beats = |a: Element, d: Element| {
        table
            .iter()
            .find(|row| row.element == a)
            .map_or(false, |row| row.advantages.contains(&d))
    };

    if beats(attack, defend) {
        ElementalRelation::Advantage
    } else if beats(defend, attack) {
        ElementalRelation::Weakness
    } else {
        ElementalRelation::Neutral
    }
}

pub fn default_element_table() -> Vec<ElementAdvantage> {
    use Element::*;

    let row = |element: Element, advantages: &[Element]| ElementAdvantage {
        element,
        advantages: advantages.to_vec(),
    };

    vec![
        row(Fire, &[Ice, Earth]),
        row(Water, &[Fire, Earth]),
        row(Earth, &[Lightning, Air]),
        row(Air, &[Water, Earth]),
        row(Lightning, &[Water, Air]),
        row(Ice, &[Water, Earth]),
        row(Light, &[Dark, Chaos]),
        row(Dark, &[Light, Cosmic]),
        row(Chaos, &[Cosmic, Light]),
        row(Cosmic, &[Chaos, Dark]),
        row(Neutral, &[]),
    ]
}

pub fn default_rarity_multipliers() -> Vec<RarityMultiplier> {
    [
        (Rarity::Common, 1.0),
        (Rarity::Uncommon, 1.2),
        (Rarity::Rare, 1.5),
        (Rarity::Epic, 2.0),
        (Rarity::Legendary, 3.0),
        (Rarity::Mythic, 5.0),
    ]
    .into_iter()
    .map(|(rarity, multiplier)| RarityMultiplier { rarity, multiplier })
    .collect()
}
