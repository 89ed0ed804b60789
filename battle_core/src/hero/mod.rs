//! Heroes and their life cycle

mod lifecycle;
mod model;

pub use lifecycle::{DeathReport, DeathStats, HeroLifecycleManager, RevivalInfo, RevivalReport};
pub use model::Hero;
