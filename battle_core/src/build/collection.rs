//! The player's unequipped spells

use crate::error::{RulesError, RulesResult};
use crate::spell::Spell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spells not currently equipped, keyed by instance id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellCollection {
    spells: BTreeMap<String, Spell>,
}

impl SpellCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spell; an id already present is rejected
    pub fn add(&mut self, spell: Spell) -> RulesResult<()> {
        if self.spells.contains_key(&spell.id) {
            return Err(RulesError::invalid_state(format!(
                "spell '{}' already in collection",
                spell.id
            )));
        }
        self.spells.insert(spell.id.clone(), spell);
        Ok(())
    }

    /// Move a spell out of the collection
    pub fn take(&mut self, id: &str) -> RulesResult<Spell> {
        self.spells
            .remove(id)
            .ok_or_else(|| RulesError::not_found(format!("spell '{}' not in collection", id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.spells.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.spells.get(id)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.values()
    }

    /// Ids of every instance of a base spell
    pub fn instances_of(&self, base_id: &str) -> Vec<&str> {
        self.spells
            .values()
            .filter(|s| s.base_id == base_id)
            .map(|s| s.id.as_str())
            .collect()
    }
}

impl FromIterator<Spell> for SpellCollection {
    /// Later spells with a repeated id replace earlier ones
    fn from_iter<I: IntoIterator<Item = Spell>>(iter: I) -> Self {
        SpellCollection {
            spells: iter.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{Element, SpellCategory};

    #[test]
    fn test_add_take() {
        let mut collection = SpellCollection::new();
        let bolt = Spell::new("bolt", "Bolt", Element::Lightning, SpellCategory::Damage);
        collection.add(bolt.clone()).unwrap();
        assert_eq!(
            collection.add(bolt).unwrap_err().kind(),
            ErrorKind::InvalidState
        );

        let taken = collection.take("bolt").unwrap();
        assert_eq!(taken.name, "Bolt");
        assert!(collection.is_empty());
        assert_eq!(collection.take("bolt").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_instances_of() {
        let bolt = Spell::new("bolt", "Bolt", Element::Lightning, SpellCategory::Damage);
        let collection: SpellCollection = vec![
            bolt.copy_as("bolt#2"),
            bolt.clone(),
            Spell::new("heal", "Heal", Element::Light, SpellCategory::Heal),
        ]
        .into_iter()
        .collect();

        assert_eq!(collection.instances_of("bolt"), vec!["bolt", "bolt#2"]);
        assert!(collection.instances_of("nova").is_empty());
    }
}
