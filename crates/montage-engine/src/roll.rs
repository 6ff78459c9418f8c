//! Roll providers for auto-rolled actions.
//!
//! A host with its own dice system plugs in through [`NativeRollSystem`];
//! everything else uses [`GenericRoll`], a plain 2d10 plus characteristic
//! plus modifier. The choice is made once, when the engine is built.

use montage_core::{ActorId, Characteristic, PowerRoll, roll_power};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EngineConfig;

/// What is being rolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    /// The rolling hero.
    pub actor_id: ActorId,
    /// Characteristic chosen for the action.
    pub characteristic: Option<Characteristic>,
    /// The hero's score in that characteristic.
    pub characteristic_value: i32,
    /// Skill chosen for the action.
    pub skill: Option<String>,
    /// Extra flat modifier.
    pub modifier: i32,
}

/// Produces power rolls.
pub trait RollProvider: Send {
    /// Roll for a request.
    fn power_roll(&mut self, request: &RollRequest) -> PowerRoll;
    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// A host's own roll implementation.
pub trait NativeRollSystem: Send {
    /// Roll for a request.
    fn roll(&mut self, request: &RollRequest) -> PowerRoll;
}

/// 2d10 plus characteristic plus modifier.
#[derive(Debug, Clone)]
pub struct GenericRoll {
    rng: StdRng,
}

impl GenericRoll {
    /// A roller with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A roller seeded from the OS.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RollProvider for GenericRoll {
    fn power_roll(&mut self, request: &RollRequest) -> PowerRoll {
        roll_power(
            &mut self.rng,
            request.characteristic_value.saturating_add(request.modifier),
        )
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}

/// Delegates to a [`NativeRollSystem`].
pub struct NativeRoll {
    system: Box<dyn NativeRollSystem>,
}

impl NativeRoll {
    /// Wrap a host roll system.
    pub fn new(system: Box<dyn NativeRollSystem>) -> Self {
        Self { system }
    }
}

impl RollProvider for NativeRoll {
    fn power_roll(&mut self, request: &RollRequest) -> PowerRoll {
        self.system.roll(request)
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

/// Pick the native system when there is one, the generic roller otherwise.
pub fn select_roll_provider(
    native: Option<Box<dyn NativeRollSystem>>,
    config: &EngineConfig,
) -> Box<dyn RollProvider> {
    match (native, config.seed) {
        (Some(system), _) => Box::new(NativeRoll::new(system)),
        (None, Some(seed)) => Box::new(GenericRoll::seeded(seed)),
        (None, None) => Box::new(GenericRoll::from_os()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loaded(u32);

    impl NativeRollSystem for Loaded {
        fn roll(&mut self, request: &RollRequest) -> PowerRoll {
            PowerRoll::from_dice(vec![self.0, self.0], request.modifier)
        }
    }

    fn request(value: i32, modifier: i32) -> RollRequest {
        RollRequest {
            actor_id: "hero-1".into(),
            characteristic: Some(Characteristic::Might),
            characteristic_value: value,
            skill: None,
            modifier,
        }
    }

    #[test]
    fn generic_adds_characteristic_and_modifier() {
        let mut roller = GenericRoll::seeded(3);
        let roll = roller.power_roll(&request(2, 1));
        assert_eq!(roll.dice.len(), 2);
        assert_eq!(roll.total, i32::try_from(roll.natural).unwrap() + 3);
    }

    #[test]
    fn seeded_rollers_agree() {
        let mut a = GenericRoll::seeded(11);
        let mut b = GenericRoll::seeded(11);
        for _ in 0..10 {
            assert_eq!(a.power_roll(&request(0, 0)), b.power_roll(&request(0, 0)));
        }
    }

    #[test]
    fn native_system_wins_when_present() {
        let config = EngineConfig::default().with_seed(1);
        let mut provider = select_roll_provider(Some(Box::new(Loaded(9))), &config);
        assert_eq!(provider.name(), "native");
        assert_eq!(provider.power_roll(&request(5, 1)).total, 19);

        let generic = select_roll_provider(None, &config);
        assert_eq!(generic.name(), "generic");
    }
}
