//! Status effect catalog

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a status effect in the fixed catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffectId {
    Burn,
    Poison,
    Bleed,
    Corruption,
    Regen,
    Clarity,
    Fear,
    Stun,
    Freeze,
    Sleep,
    Confuse,
    Silence,
    Slow,
    Marked,
    Brittle,
    Vulnerability,
    Fortified,
    Berserk,
    Thorns,
    Haste,
}

impl StatusEffectId {
    pub fn all() -> &'static [StatusEffectId] {
        use StatusEffectId::*;
        &[
            Burn,
            Poison,
            Bleed,
            Corruption,
            Regen,
            Clarity,
            Fear,
            Stun,
            Freeze,
            Sleep,
            Confuse,
            Silence,
            Slow,
            Marked,
            Brittle,
            Vulnerability,
            Fortified,
            Berserk,
            Thorns,
            Haste,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        use StatusEffectId::*;
        match self {
            Burn => "burn",
            Poison => "poison",
            Bleed => "bleed",
            Corruption => "corruption",
            Regen => "regen",
            Clarity => "clarity",
            Fear => "fear",
            Stun => "stun",
            Freeze => "freeze",
            Sleep => "sleep",
            Confuse => "confuse",
            Silence => "silence",
            Slow => "slow",
            Marked => "marked",
            Brittle => "brittle",
            Vulnerability => "vulnerability",
            Fortified => "fortified",
            Berserk => "berserk",
            Thorns => "thorns",
            Haste => "haste",
        }
    }

    /// Stun, freeze and sleep block every action
    pub fn blocks_action(&self) -> bool {
        matches!(
            self,
            StatusEffectId::Stun | StatusEffectId::Freeze | StatusEffectId::Sleep
        )
    }
}

impl fmt::Display for StatusEffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusEffectId {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        StatusEffectId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| RulesError::validation(format!("unknown status effect '{}'", s)))
    }
}

/// Broad category of a status effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Dot,
    Hot,
    Buff,
    Debuff,
    Control,
}

/// What a repeated application does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackRule {
    /// Reset the remaining duration
    Refresh,
    /// Add a stack up to `max_stacks`, refreshing once at the cap
    Stack,
}

/// Catalog definition of a status effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectDef {
    pub id: StatusEffectId,
    pub kind: EffectKind,
    #[serde(default = "default_duration")]
    pub duration: i32,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
    #[serde(default = "default_stacking")]
    pub stacking: StackRule,
    /// Damage per stack per turn for DOTs
    #[serde(default)]
    pub damage_per_turn: f64,
    #[serde(default)]
    pub heal_per_turn: f64,
}

fn default_duration() -> i32 {
    3
}

fn default_max_stacks() -> u32 {
    1
}

fn default_stacking() -> StackRule {
    StackRule::Refresh
}

impl StatusEffectDef {
    /// A refreshing effect with the default duration
    pub fn new(id: StatusEffectId, kind: EffectKind) -> Self {
        StatusEffectDef {
            id,
            kind,
            duration: default_duration(),
            max_stacks: default_max_stacks(),
            stacking: default_stacking(),
            damage_per_turn: 0.0,
            heal_per_turn: 0.0,
        }
    }

    pub fn stacking(mut self, max_stacks: u32) -> Self {
        self.stacking = StackRule::Stack;
        self.max_stacks = max_stacks;
        self
    }

    pub fn damage(mut self, damage_per_turn: f64) -> Self {
        self.damage_per_turn = damage_per_turn;
        self
    }

    pub fn healing(mut self, heal_per_turn: f64) -> Self {
        self.heal_per_turn = heal_per_turn;
        self
    }
}

/// Built-in status effect catalog
pub fn default_status_effects() -> Vec<StatusEffectDef> {
    use EffectKind::*;
    use StatusEffectId as Id;

    vec![
        StatusEffectDef::new(Id::Burn, Dot).damage(10.0),
        StatusEffectDef::new(Id::Poison, Dot).damage(5.0).stacking(5),
        StatusEffectDef::new(Id::Bleed, Dot).damage(8.0).stacking(3),
        StatusEffectDef::new(Id::Corruption, Dot).damage(6.0).stacking(3),
        StatusEffectDef::new(Id::Regen, Hot).healing(10.0),
        StatusEffectDef::new(Id::Clarity, Buff),
        StatusEffectDef::new(Id::Fear, Debuff),
        StatusEffectDef::new(Id::Stun, Control),
        StatusEffectDef::new(Id::Freeze, Control),
        StatusEffectDef::new(Id::Sleep, Control),
        StatusEffectDef::new(Id::Confuse, Control),
        StatusEffectDef::new(Id::Silence, Control),
        StatusEffectDef::new(Id::Slow, Debuff),
        StatusEffectDef::new(Id::Marked, Debuff),
        StatusEffectDef::new(Id::Brittle, Debuff),
        StatusEffectDef::new(Id::Vulnerability, Debuff),
        StatusEffectDef::new(Id::Fortified, Buff),
        StatusEffectDef::new(Id::Berserk, Buff),
        StatusEffectDef::new(Id::Thorns, Buff),
        StatusEffectDef::new(Id::Haste, Buff),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_id() {
        let defs = default_status_effects();
        for id in StatusEffectId::all() {
            assert!(defs.iter().any(|d| d.id == *id), "missing {}", id);
        }
    }

    #[test]
    fn test_parse_partial_def() {
        let toml = r#"
id = "poison"
kind = "dot"
stacking = "stack"
max_stacks = 5
damage_per_turn = 4.0
"#;
        let def: StatusEffectDef = toml::from_str(toml).unwrap();
        assert_eq!(def.id, StatusEffectId::Poison);
        assert_eq!(def.duration, 3);
        assert_eq!(def.stacking, StackRule::Stack);
    }

    #[test]
    fn test_blocking_effects() {
        assert!(StatusEffectId::Stun.blocks_action());
        assert!(!StatusEffectId::Silence.blocks_action());
        assert!(!StatusEffectId::Confuse.blocks_action());
    }
}
