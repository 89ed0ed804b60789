//! battle_sim - Headless scripted duel driving battle_core end to end
//!
//! This binary shows:
//! - Building and locking a six-spell build
//! - A seeded duel through the damage pipeline and status effects
//! - Death, soul conversion and revival
//! - Paying to unlock a slot and re-equipping it
//!
//! Usage: `battle_sim [rules.toml] [seed]`

use battle_core::prelude::*;
use battle_core::config::load_rules;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MAX_TURNS: u32 = 30;

fn load_config(path: Option<&str>) -> RulesConfig {
    match path {
        Some(p) => match load_rules(Path::new(p)) {
            Ok(rules) => {
                info!("Loaded rules from {}", p);
                rules
            }
            Err(e) => {
                eprintln!("Error loading rules from '{}': {}", p, e);
                std::process::exit(1);
            }
        },
        None => RulesConfig::bundled(),
    }
}

fn starting_spells() -> Vec<Spell> {
    vec![
        Spell::new("fireball", "Fireball", Element::Fire, SpellCategory::Damage).with_rarity(Rarity::Rare),
        Spell::new("frost_nova", "Frost Nova", Element::Ice, SpellCategory::Control),
        Spell::new("stone_skin", "Stone Skin", Element::Earth, SpellCategory::Buff),
        Spell::new("mend", "Mend", Element::Light, SpellCategory::Heal),
        Spell::new("hex", "Hex", Element::Dark, SpellCategory::Debuff),
        Spell::new("chain_lightning", "Chain Lightning", Element::Lightning, SpellCategory::Damage),
    ]
}

/// Run one duel; true when the hero wins
fn duel(session: &GameSession, rng: &mut ChaCha8Rng, hero_attack: f64) -> bool {
    let resolver = session.resolver();
    let tracker = session.status_effects();
    let rules = session.rules();

    let mut hero = CombatEntity::new("hero", 120.0, 100.0)
        .with_name(session.hero().name())
        .with_element(Element::Fire)
        .with_attack(hero_attack)
        .with_defense(8.0, 4.0)
        .with_crit(0.15, 1.75)
        .with_attack_modifier(AttackModifier::Lifesteal);
    if let Some(def) = rules.player_modifier("momentum") {
        hero = hero.with_player_modifier(PlayerModifier::from_def(def).with_stacks(2));
    }

    let mut ogre = CombatEntity::new("ogre", 220.0, 40.0)
        .with_name("Cave Ogre")
        .with_element(Element::Earth)
        .with_attack(34.0)
        .with_defense(14.0, 2.0)
        .with_dodge(0.10)
        .with_attack_modifier(AttackModifier::Counter);

    let burn = EffectPayload::default();
    let fire = AttackDescriptor::new(hero.attack)
        .with_element(Element::Fire)
        .with_modifier(AttackModifier::Execute);
    let club = AttackDescriptor::new(ogre.attack).with_modifier(AttackModifier::Shred);

    for turn in 1..=MAX_TURNS {
        // Step 1: status effects tick for both sides
        for entity in [&mut hero, &mut ogre] {
            let result = tracker.process_turn(entity);
            entity.apply_turn(&result);
            let regen = tracker.calculate_mana_regen(entity) as f64;
            entity.restore_mana(regen);
        }
        if !ogre.is_alive() || !hero.is_alive() {
            break;
        }

        // Step 2: hero acts
        if tracker.can_act(&hero, rng).can_act {
            let result = resolver.strike(&mut hero, &mut ogre, &fire, rng);
            info!("Turn {}: {} -> {}: {}", turn, hero.name, ogre.name, result.summary());
            if turn % 3 == 1 {
                if let Ok(outcome) = tracker.apply_effect(&mut ogre, StatusEffectId::Burn, &burn, rng) {
                    info!("  {} burn: {:?}", ogre.name, outcome);
                }
            }
        }
        if !ogre.is_alive() {
            break;
        }

        // Step 3: ogre answers
        if tracker.can_act(&ogre, rng).can_act {
            let result = resolver.strike(&mut ogre, &mut hero, &club, rng);
            info!("Turn {}: {} -> {}: {}", turn, ogre.name, hero.name, result.summary());
        }
        if !hero.is_alive() {
            break;
        }
    }

    info!(
        "Duel over: {} {:.0}/{:.0} HP, {} {:.0}/{:.0} HP",
        hero.name, hero.health, hero.max_health, ogre.name, ogre.health, ogre.max_health
    );
    hero.is_alive() && !ogre.is_alive()
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let rules = load_config(args.get(1).map(String::as_str));
    let seed = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut session = GameSession::new(rules, "hero-1", "Aria");
    session.events().subscribe_all(|event| {
        info!("event: {}", event.name());
        Ok(())
    });
    if let Err(e) = session.set_player_level(15) {
        warn!("Could not set level: {}", e);
    }

    // Build: one copy of each spell for each build
    for spell in starting_spells() {
        let spare = spell.copy_as(format!("{}#2", spell.id));
        for s in [spell, spare] {
            if let Err(e) = session.add_spell(s) {
                warn!("Could not add spell: {}", e);
            }
        }
    }
    let ids: Vec<String> = starting_spells().into_iter().map(|s| s.id).collect();
    for (index, id) in ids.iter().enumerate() {
        if let Err(e) = session.equip(BuildType::Primary, index, id) {
            warn!("Could not equip {}: {}", id, e);
        }
    }
    if let Err(e) = session.copy_build(BuildType::Primary, BuildType::Secondary) {
        warn!("Could not copy build: {}", e);
    }

    // First duel is underpowered, the second one after revival is not
    for (round, attack) in [(1, 18.0), (2, 60.0)] {
        if let Err(e) = session.enter_battle() {
            warn!("Round {} blocked: {}", round, e);
            break;
        }

        if duel(&session, &mut rng, attack) {
            info!("Round {} won", round);
            session.end_battle();
            if let Err(e) = session.award(Currency::Gold, 250, "ogre bounty") {
                warn!("{}", e);
            }
            if let Err(e) = session.award(Currency::Souls, 1, "ogre kill") {
                warn!("{}", e);
            }
            continue;
        }

        info!("Round {} lost", round);
        if let Err(e) = session.handle_defeat() {
            warn!("{}", e);
        }
        let info = session.revival_info();
        if info.shortfall > 0 {
            let gold = info.shortfall * session.rules().economy.gold_per_soul;
            info!("Short {} souls, converting {} gold", info.shortfall, gold);
            if let Err(e) = session.convert(gold) {
                warn!("Conversion failed: {}", e);
            }
        }
        match session.revive() {
            Ok(report) => info!(
                "Revived for {} souls, next revival costs {}",
                report.souls_spent, report.next_revival_cost
            ),
            Err(e) => warn!("Revival failed: {}", e),
        }
    }

    // Swap a spell: buy an unlocker if needed, unlock, re-equip the spare
    if session.ledger().item_count("spell_unlocker") == 0 {
        if let Err(e) = session.award(Currency::Gems, 50, "daily login") {
            warn!("{}", e);
        }
        if let Err(e) = session.purchase_spell_unlocker() {
            warn!("Could not buy unlocker: {}", e);
        }
    }
    match session.unlock(BuildType::Primary, 4) {
        Ok(report) => {
            info!("Unlocked slot 4 ({:?})", report.payment);
            if let Err(e) = session.equip(BuildType::Primary, 4, &report.spell_id) {
                warn!("{}", e);
            }
        }
        Err(e) => warn!("Unlock failed: {}", e),
    }

    let status = session.build_status();
    info!(
        "Builds: primary {}/6 locked, secondary {}/6 locked, active {}",
        status.primary.locked, status.secondary.locked, status.active
    );
    for currency in Currency::all() {
        info!("{}: {}", currency, session.ledger().balance(*currency));
    }

    let mut store = MemoryStore::new();
    match session.save(&mut store) {
        Ok(()) => info!(
            "Saved player state ({} bytes)",
            store.snapshot().map_or(0, str::len)
        ),
        Err(e) => warn!("Save failed: {}", e),
    }
}
