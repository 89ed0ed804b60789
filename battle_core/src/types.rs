//! Shared enums for the rules core

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element of an attack, a spell or a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Lightning,
    Ice,
    Light,
    Dark,
    Chaos,
    Cosmic,
    Neutral,
}

impl Default for Element {
    fn default() -> Self {
        Element::Neutral
    }
}

impl Element {
    /// Get all elements
    pub fn all() -> &'static [Element] {
        &[
            Element::Fire,
            Element::Water,
            Element::Earth,
            Element::Air,
            Element::Lightning,
            Element::Ice,
            Element::Light,
            Element::Dark,
            Element::Chaos,
            Element::Cosmic,
            Element::Neutral,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Lightning => "lightning",
            Element::Ice => "ice",
            Element::Light => "light",
            Element::Dark => "dark",
            Element::Chaos => "chaos",
            Element::Cosmic => "cosmic",
            Element::Neutral => "neutral",
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Element::Neutral
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == s.to_lowercase())
            .ok_or_else(|| RulesError::validation(format!("unknown element '{}'", s)))
    }
}

/// How an attack interacts with defense and resistance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Physical,
    Magical,
    /// Ignores defense
    True,
    /// Ignores defense and resistances
    Pure,
}

impl DamageType {
    /// True and pure damage skip the defense step
    pub fn ignores_defense(&self) -> bool {
        matches!(self, DamageType::True | DamageType::Pure)
    }

    pub fn ignores_resistance(&self) -> bool {
        *self == DamageType::Pure
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageType::Physical => "physical",
            DamageType::Magical => "magical",
            DamageType::True => "true",
            DamageType::Pure => "pure",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageType {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "physical" => Ok(DamageType::Physical),
            "magical" | "magic" => Ok(DamageType::Magical),
            "true" => Ok(DamageType::True),
            "pure" => Ok(DamageType::Pure),
            _ => Err(RulesError::validation(format!("unknown damage type '{}'", s))),
        }
    }
}

/// The kind of evasion that made an attack miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvasionType {
    Dodge,
    Parry,
    Deflect,
    Phase,
}

impl EvasionType {
    /// Order in which evasion types are rolled
    pub fn all() -> &'static [EvasionType] {
        &[
            EvasionType::Dodge,
            EvasionType::Parry,
            EvasionType::Deflect,
            EvasionType::Phase,
        ]
    }
}

/// Named tags that alter the damage pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackModifier {
    Pierce,
    Execute,
    Shatter,
    Cleave,
    Overwhelm,
    Amplify,
    Shred,
    Penetration,
    Lifesteal,
    Siphon,
    Drain,
    Counter,
    Reave,
    Absorb,
    Riposte,
}

impl AttackModifier {
    pub fn all() -> &'static [AttackModifier] {
        &[
            AttackModifier::Pierce,
            AttackModifier::Execute,
            AttackModifier::Shatter,
            AttackModifier::Cleave,
            AttackModifier::Overwhelm,
            AttackModifier::Amplify,
            AttackModifier::Shred,
            AttackModifier::Penetration,
            AttackModifier::Lifesteal,
            AttackModifier::Siphon,
            AttackModifier::Drain,
            AttackModifier::Counter,
            AttackModifier::Reave,
            AttackModifier::Absorb,
            AttackModifier::Riposte,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttackModifier::Pierce => "pierce",
            AttackModifier::Execute => "execute",
            AttackModifier::Shatter => "shatter",
            AttackModifier::Cleave => "cleave",
            AttackModifier::Overwhelm => "overwhelm",
            AttackModifier::Amplify => "amplify",
            AttackModifier::Shred => "shred",
            AttackModifier::Penetration => "penetration",
            AttackModifier::Lifesteal => "lifesteal",
            AttackModifier::Siphon => "siphon",
            AttackModifier::Drain => "drain",
            AttackModifier::Counter => "counter",
            AttackModifier::Reave => "reave",
            AttackModifier::Absorb => "absorb",
            AttackModifier::Riposte => "riposte",
        }
    }
}

impl fmt::Display for AttackModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackModifier {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        AttackModifier::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| RulesError::validation(format!("unknown attack modifier '{}'", s)))
    }
}

/// Player currencies held by the economy ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Gold,
    Souls,
    Gems,
    Shards,
    Wildcards,
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[
            Currency::Gold,
            Currency::Souls,
            Currency::Gems,
            Currency::Shards,
            Currency::Wildcards,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Gold => "gold",
            Currency::Souls => "souls",
            Currency::Gems => "gems",
            Currency::Shards => "shards",
            Currency::Wildcards => "wildcards",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Currency::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| RulesError::validation(format!("unknown currency '{}'", s)))
    }
}

/// One of the hero's two spell builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildType {
    Primary,
    Secondary,
}

impl BuildType {
    pub fn all() -> &'static [BuildType] {
        &[BuildType::Primary, BuildType::Secondary]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Primary => "primary",
            BuildType::Secondary => "secondary",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            BuildType::Primary => 0,
            BuildType::Secondary => 1,
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(BuildType::Primary),
            "secondary" => Ok(BuildType::Secondary),
            _ => Err(RulesError::validation(format!("unknown build type '{}'", s))),
        }
    }
}

/// Alive/dead state of a hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroStatus {
    Alive,
    Dead,
}

impl fmt::Display for HeroStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeroStatus::Alive => f.write_str("alive"),
            HeroStatus::Dead => f.write_str("dead"),
        }
    }
}

/// Spell category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellCategory {
    Damage,
    Heal,
    Buff,
    Debuff,
    Control,
    Summon,
    Utility,
    Ultimate,
}

/// Spell rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Default for Rarity {
    fn default() -> Self {
        Rarity::Common
    }
}
