mod cooldown;

pub use cooldown::{CooldownRepository, CooldownRepositoryTrait};

#[cfg(test)]
pub use cooldown::MockCooldownRepositoryTrait;
