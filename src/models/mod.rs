mod cooldown;

pub use cooldown::CooldownStatus;
