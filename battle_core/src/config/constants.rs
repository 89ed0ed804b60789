//! Tunable numeric constants

use serde::{Deserialize, Serialize};

/// Damage pipeline constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConstants {
    /// Multiplier when the attack element has the advantage (> 1)
    pub elemental_advantage_multiplier: f64,
    /// Multiplier when the defender's element has the advantage (< 1)
    pub elemental_weakness_multiplier: f64,
    pub base_crit_chance: f64,
    pub base_crit_multiplier: f64,
    /// Total resistance can never exceed this reduction
    pub resistance_cap: f64,
    /// Physical/magical hits always deal at least this much after defense
    pub min_hit_damage: f64,
    /// damage -= defense / divisor
    pub defense_divisor: f64,
    pub vulnerability_multiplier: f64,
    pub fortified_multiplier: f64,
    pub marked_multiplier: f64,
    pub berserk_multiplier: f64,
    pub fear_damage_multiplier: f64,
    /// Attacker mana fraction at or above which `high_mana` holds
    pub high_mana_ratio: f64,
    /// Attacker health fraction at or below which `low_health` holds
    pub low_health_ratio: f64,
    /// Default defender health fraction for `target_below_threshold`
    pub target_threshold: f64,
}

impl Default for BattleConstants {
    fn default() -> Self {
        BattleConstants {
            elemental_advantage_multiplier: 1.5,
            elemental_weakness_multiplier: 0.75,
            base_crit_chance: 0.05,
            base_crit_multiplier: 1.5,
            resistance_cap: 0.75,
            min_hit_damage: 1.0,
            defense_divisor: 2.0,
            vulnerability_multiplier: 1.5,
            fortified_multiplier: 0.75,
            marked_multiplier: 1.25,
            berserk_multiplier: 1.3,
            fear_damage_multiplier: 0.9,
            high_mana_ratio: 0.80,
            low_health_ratio: 0.30,
            target_threshold: 0.25,
        }
    }
}

/// Ratios used by post-hit reactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConstants {
    pub lifesteal_ratio: f64,
    pub absorb_ratio: f64,
    pub siphon_ratio: f64,
    pub drain_ratio: f64,
    pub thorns_ratio: f64,
    pub counter_chance: f64,
    pub counter_ratio: f64,
    pub reave_ratio: f64,
    pub riposte_chance: f64,
    pub riposte_ratio: f64,
}

impl Default for ReactionConstants {
    fn default() -> Self {
        ReactionConstants {
            lifesteal_ratio: 0.20,
            absorb_ratio: 0.30,
            siphon_ratio: 0.15,
            drain_ratio: 0.25,
            thorns_ratio: 0.30,
            counter_chance: 0.25,
            counter_ratio: 0.50,
            reave_ratio: 0.10,
            riposte_chance: 0.75,
            riposte_ratio: 0.80,
        }
    }
}

/// Turn processing constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnConstants {
    #[serde(default = "default_mana_regen")]
    pub mana_regen_per_turn: f64,
    /// Clarity adds and fear removes this fraction of mana regen
    #[serde(default = "default_mana_regen_shift")]
    pub mana_regen_shift: f64,
    /// Chance that a confused entity still gets to act
    #[serde(default = "default_confuse_act_chance")]
    pub confuse_act_chance: f64,
}

impl Default for TurnConstants {
    fn default() -> Self {
        TurnConstants {
            mana_regen_per_turn: default_mana_regen(),
            mana_regen_shift: default_mana_regen_shift(),
            confuse_act_chance: default_confuse_act_chance(),
        }
    }
}

fn default_mana_regen() -> f64 {
    10.0
}
fn default_mana_regen_shift() -> f64 {
    0.30
}
fn default_confuse_act_chance() -> f64 {
    0.50
}

/// A discounted gold-for-souls bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoulPackage {
    pub id: String,
    pub souls: u64,
    pub gold: u64,
    /// Discount percentage, informational
    #[serde(default)]
    pub discount: u32,
}

/// Opening balances of a fresh save
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingBalances {
    pub gold: u64,
    pub souls: u64,
    pub gems: u64,
    pub shards: u64,
    pub wildcards: u64,
}

impl Default for StartingBalances {
    fn default() -> Self {
        StartingBalances {
            gold: 100,
            souls: 10,
            gems: 50,
            shards: 0,
            wildcards: 0,
        }
    }
}

/// Currency exchange and shop constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConstants {
    /// Gold needed for one soul
    pub gold_per_soul: u64,
    /// Inventory key of the spell unlocker item
    pub spell_unlocker_item: String,
    /// Gem price of one spell unlocker (also the direct gem unlock price)
    pub spell_unlocker_gem_cost: u64,
    pub starting: StartingBalances,
    pub soul_packages: Vec<SoulPackage>,
    /// Number of journal records kept
    pub journal_limit: usize,
}

impl Default for EconomyConstants {
    fn default() -> Self {
        EconomyConstants {
            gold_per_soul: 100,
            spell_unlocker_item: "spell_unlocker".to_string(),
            spell_unlocker_gem_cost: 100,
            starting: StartingBalances::default(),
            soul_packages: vec![
                soul_package("soul_pack_1", 1, 100, 0),
                soul_package("soul_pack_10", 10, 900, 10),
                soul_package("soul_pack_50", 50, 4000, 20),
                soul_package("soul_pack_100", 100, 7000, 30),
            ],
            journal_limit: 100,
        }
    }
}

fn soul_package(id: &str, souls: u64, gold: u64, discount: u32) -> SoulPackage {
    SoulPackage {
        id: id.to_string(),
        souls,
        gold,
        discount,
    }
}

/// Build gating constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConstants {
    /// Player level at which the secondary build opens
    #[serde(default = "default_secondary_level")]
    pub secondary_unlock_level: u32,
}

impl Default for BuildConstants {
    fn default() -> Self {
        BuildConstants {
            secondary_unlock_level: default_secondary_level(),
        }
    }
}

fn default_secondary_level() -> u32 {
    15
}

/// Soul cost of a revival by death count
///
/// `costs[n]` is the price after `n` prior revivals; the last entry repeats
/// for every higher count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevivalSchedule {
    pub costs: Vec<u64>,
}

impl Default for RevivalSchedule {
    fn default() -> Self {
        RevivalSchedule {
            costs: vec![10, 25, 50],
        }
    }
}

impl RevivalSchedule {
    /// Revival cost for a hero with `death_count` prior revivals
    pub fn cost_for(&self, death_count: u32) -> u64 {
        let index = (death_count as usize).min(self.costs.len().saturating_sub(1));
        self.costs.get(index).copied().unwrap_or(0)
    }
}
