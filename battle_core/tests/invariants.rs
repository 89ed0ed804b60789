//! Property tests for invariants that must hold after any operation sequence

use battle_core::build::SlotState;
use battle_core::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

const SPELLS: usize = 8;

#[derive(Debug, Clone)]
enum SlotOp {
    Equip { build: BuildType, slot: usize, spell: usize },
    Unlock { build: BuildType, slot: usize },
    AwardGems(u64),
    GrantUnlocker,
}

fn build_type() -> impl Strategy<Value = BuildType> {
    prop_oneof![Just(BuildType::Primary), Just(BuildType::Secondary)]
}

fn slot_op() -> impl Strategy<Value = SlotOp> {
    prop_oneof![
        4 => (build_type(), 0..7usize, 0..SPELLS)
            .prop_map(|(build, slot, spell)| SlotOp::Equip { build, slot, spell }),
        3 => (build_type(), 0..7usize).prop_map(|(build, slot)| SlotOp::Unlock { build, slot }),
        1 => (1..300u64).prop_map(SlotOp::AwardGems),
        1 => Just(SlotOp::GrantUnlocker),
    ]
}

#[derive(Debug, Clone)]
enum LedgerOp {
    Award(Currency, u64),
    Spend(Currency, u64),
    Convert(u64),
    Package(usize),
    BuyUnlocker,
}

fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Gold),
        Just(Currency::Souls),
        Just(Currency::Gems),
        Just(Currency::Shards),
        Just(Currency::Wildcards),
    ]
}

fn ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (currency(), 0..2_000u64).prop_map(|(c, n)| LedgerOp::Award(c, n)),
        (currency(), 0..2_000u64).prop_map(|(c, n)| LedgerOp::Spend(c, n)),
        (0..3_000u64).prop_map(LedgerOp::Convert),
        (0..5usize).prop_map(LedgerOp::Package),
        Just(LedgerOp::BuyUnlocker),
    ]
}

/// Every spell id lives in exactly one place
fn assert_exclusive_ownership(hero: &Hero, collection: &SpellCollection) {
    let mut seen = HashSet::new();
    for build in BuildType::all() {
        for slot in hero.build(*build).slots() {
            if let Some(spell) = slot.spell() {
                assert!(seen.insert(spell.id.clone()), "{} equipped twice", spell.id);
                assert!(!collection.contains(&spell.id), "{} in two places", spell.id);
            }
        }
    }
    for spell in collection.iter() {
        assert!(seen.insert(spell.id.clone()));
    }
    assert_eq!(seen.len(), SPELLS);
}

proptest! {
    #[test]
    fn revival_cost_is_a_function_of_death_count(deaths in 0u32..500) {
        let rules = RulesConfig::default();
        let lifecycle = HeroLifecycleManager::new(&rules);
        let expected = match deaths {
            0 => 10,
            1 => 25,
            _ => 50,
        };
        prop_assert_eq!(lifecycle.revival_cost(deaths), expected);
    }

    #[test]
    fn revival_cycles_follow_schedule(cycles in 1usize..8) {
        let rules = RulesConfig::default();
        let lifecycle = HeroLifecycleManager::new(&rules);
        let mut hero = Hero::new("hero", "Aria", &rules.revival);
        let mut ledger = EconomyLedger::empty(&rules.economy);
        ledger.award(Currency::Souls, 1_000, "test").unwrap();
        let mut events: Vec<GameEvent> = Vec::new();

        for _ in 0..cycles {
            lifecycle.die(&mut hero, &mut events).unwrap();
            prop_assert_eq!(hero.revival_cost(), rules.revival.cost_for(hero.death_count()));
            lifecycle.revive(&mut hero, &mut ledger, &mut events).unwrap();
            prop_assert_eq!(hero.revival_cost(), rules.revival.cost_for(hero.death_count()));
        }
        prop_assert_eq!(hero.death_count() as usize, cycles);
    }

    #[test]
    fn slots_stay_legal_and_spells_exclusive(ops in prop::collection::vec(slot_op(), 1..60)) {
        let rules = RulesConfig::default();
        let coordinator = SpellLockCoordinator::new(&rules);
        let mut hero = Hero::new("hero", "Aria", &rules.revival);
        let mut ledger = EconomyLedger::empty(&rules.economy);
        let mut collection: SpellCollection = (0..SPELLS)
            .map(|i| Spell::new(format!("spell{}", i), "Spell", Element::Air, SpellCategory::Utility))
            .collect();
        let mut events: Vec<GameEvent> = Vec::new();

        for op in ops {
            let gems_before = ledger.balance(Currency::Gems);
            match op {
                SlotOp::Equip { build, slot, spell } => {
                    let id = format!("spell{}", spell);
                    let _ = coordinator.equip(&mut hero, build, slot, &id, &mut collection, &mut events);
                }
                SlotOp::Unlock { build, slot } => {
                    if coordinator
                        .unlock(&mut hero, build, slot, &mut ledger, &mut collection, &mut events)
                        .is_err()
                    {
                        prop_assert_eq!(ledger.balance(Currency::Gems), gems_before);
                    }
                }
                SlotOp::AwardGems(amount) => {
                    ledger.award(Currency::Gems, amount, "test").unwrap();
                }
                SlotOp::GrantUnlocker => {
                    ledger.grant_item("spell_unlocker", 1, "test").unwrap();
                }
            }

            for build in BuildType::all() {
                for slot in hero.build(*build).slots() {
                    prop_assert_ne!(slot.state(), SlotState::Inconsistent);
                }
            }
            assert_exclusive_ownership(&hero, &collection);
            prop_assert!(hero.check_invariants(&rules.revival, Some(&collection)).is_ok());
        }
    }

    #[test]
    fn balances_never_go_negative(ops in prop::collection::vec(ledger_op(), 1..80)) {
        let rules = RulesConfig::default();
        let mut ledger = EconomyLedger::new(&rules.economy);
        let package_ids: Vec<String> = rules
            .economy
            .soul_packages
            .iter()
            .map(|p| p.id.clone())
            .collect();

        for op in ops {
            let before = ledger.summary();
            let outcome = match op {
                LedgerOp::Award(c, n) => ledger.award(c, n, "test").map(|_| ()),
                LedgerOp::Spend(c, n) => ledger.spend(c, n, "test").map(|_| ()),
                LedgerOp::Convert(n) => ledger.convert(n).map(|_| ()),
                LedgerOp::Package(i) => {
                    let id = package_ids.get(i).map(String::as_str).unwrap_or("missing_pack");
                    ledger.purchase_soul_package(id).map(|_| ())
                }
                LedgerOp::BuyUnlocker => ledger.purchase_spell_unlocker().map(|_| ()),
            };

            // Failed operations leave every balance untouched
            if outcome.is_err() {
                let after = ledger.summary();
                prop_assert_eq!(after.balances, before.balances);
                prop_assert_eq!(after.inventory, before.inventory);
            }
        }

        // u64 balances cannot be negative; check the journal agrees with them
        for currency in Currency::all() {
            let latest = ledger
                .journal()
                .iter()
                .filter(|r| r.resource == Resource::Currency(*currency))
                .last()
                .map(|r| r.balance_after);
            if let Some(balance) = latest {
                prop_assert_eq!(balance, ledger.balance(*currency));
            }
        }
    }
}
