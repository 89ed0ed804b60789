//! Rules configuration loading from TOML files
//!
//! Every table has built-in defaults, so a rules file only needs to list the
//! values it changes.

mod constants;
mod effects;
mod modifiers;
mod tables;

pub use constants::{
    BattleConstants, BuildConstants, EconomyConstants, ReactionConstants, RevivalSchedule,
    SoulPackage, StartingBalances, TurnConstants,
};
pub use effects::{default_status_effects, EffectKind, StackRule, StatusEffectDef, StatusEffectId};
pub use modifiers::{
    default_player_modifiers, AttackModifierParams, Condition, ModifierStat, PlayerModifierDef,
    PlayerModifierEffect,
};
pub use tables::{
    default_element_table, default_rarity_multipliers, relation_in, DataTables, ElementAdvantage,
    ElementalRelation, RarityMultiplier,
};

use crate::types::{Element, Rarity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Rules file shipped with the crate
const BUNDLED_RULES: &str = include_str!("../../config/rules.toml");

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load and validate a rules file
pub fn load_rules(path: &Path) -> Result<RulesConfig, ConfigError> {
    let rules: RulesConfig = load_toml(path)?;
    rules.validate()?;
    Ok(rules)
}

/// Parse and validate rules from a TOML string
pub fn parse_rules(content: &str) -> Result<RulesConfig, ConfigError> {
    let rules: RulesConfig = parse_toml(content)?;
    rules.validate()?;
    Ok(rules)
}

/// All tuning data the rules core reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub battle: BattleConstants,
    pub reactions: ReactionConstants,
    pub attack_modifiers: AttackModifierParams,
    pub turn: TurnConstants,
    pub economy: EconomyConstants,
    pub builds: BuildConstants,
    pub revival: RevivalSchedule,
    pub player_modifiers: Vec<PlayerModifierDef>,
    pub status_effects: Vec<StatusEffectDef>,
    pub elements: Vec<ElementAdvantage>,
    pub rarities: Vec<RarityMultiplier>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            battle: BattleConstants::default(),
            reactions: ReactionConstants::default(),
            attack_modifiers: AttackModifierParams::default(),
            turn: TurnConstants::default(),
            economy: EconomyConstants::default(),
            builds: BuildConstants::default(),
            revival: RevivalSchedule::default(),
            player_modifiers: default_player_modifiers(),
            status_effects: default_status_effects(),
            elements: default_element_table(),
            rarities: default_rarity_multipliers(),
        }
    }
}

impl RulesConfig {
    /// Rules bundled with the crate, falling back to built-in defaults
    pub fn bundled() -> Self {
        parse_rules(BUNDLED_RULES).unwrap_or_else(|err| {
            warn!("Bundled rules rejected, using defaults: {}", err);
            RulesConfig::default()
        })
    }

    /// Look up a player modifier definition
    pub fn player_modifier(&self, id: &str) -> Option<&PlayerModifierDef> {
        self.player_modifiers.iter().find(|m| m.id == id)
    }

    /// Reject tables the rules cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if self.revival.costs.is_empty() {
            return invalid("revival schedule is empty".to_string());
        }
        if self.economy.gold_per_soul == 0 {
            return invalid("gold_per_soul must be positive".to_string());
        }
        if self.economy.journal_limit == 0 {
            return invalid("journal_limit must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.battle.resistance_cap) {
            return invalid(format!(
                "resistance_cap {} outside [0, 1]",
                self.battle.resistance_cap
            ));
        }
        if self.battle.elemental_advantage_multiplier <= 1.0 {
            return invalid("elemental advantage multiplier must exceed 1".to_string());
        }
        if !(0.0..1.0).contains(&self.battle.elemental_weakness_multiplier) {
            return invalid("elemental weakness multiplier must be in [0, 1)".to_string());
        }
        if self.battle.defense_divisor <= 0.0 {
            return invalid("defense_divisor must be positive".to_string());
        }

        let mut seen = HashSet::new();
        for def in &self.status_effects {
            if !seen.insert(def.id) {
                return invalid(format!("status effect '{}' defined twice", def.id));
            }
            if def.duration <= 0 {
                return invalid(format!("status effect '{}' has no duration", def.id));
            }
            if def.max_stacks == 0 {
                return invalid(format!("status effect '{}' has zero max stacks", def.id));
            }
        }

        let mut seen = HashSet::new();
        for def in &self.player_modifiers {
            if !seen.insert(def.id.as_str()) {
                return invalid(format!("player modifier '{}' defined twice", def.id));
            }
        }

        for package in &self.economy.soul_packages {
            if package.souls == 0 || package.gold == 0 {
                return invalid(format!("soul package '{}' is empty", package.id));
            }
        }

        Ok(())
    }
}

impl DataTables for RulesConfig {
    fn elemental_relation(&self, attack: Element, defend: Element) -> ElementalRelation {
        relation_in(&self.elements, attack, defend)
    }

    fn rarity_multiplier(&self, rarity: Rarity) -> f64 {
        self.rarities
            .iter()
            .find(|r| r.rarity == rarity)
            .map_or(1.0, |r| r.multiplier)
    }

    fn status_effect(&self, id: StatusEffectId) -> Option<&StatusEffectDef> {
        self.status_effects.iter().find(|d| d.id == id)
    }
}
