//! Spell builds: slots, the spell collection, equipping and unlocking

mod collection;
mod lock;
mod manager;
mod slot;

pub use collection::SpellCollection;
pub use lock::{ClearReport, SpellLockCoordinator, UnlockCheck, UnlockPayment, UnlockReport};
pub use manager::{
    BattleCheck, BuildChange, BuildInfo, BuildSlotManager, BuildStatus, BuildUnlock, EquipReport,
    LockedSpell, SlotInfo,
};
pub use slot::{Build, SlotState, SpellSlot, BUILD_SIZE};
