use super::rng::RngPort;

/// The damage percents a roll can produce, in table order.
pub const DAMAGE_PERCENTS: [f64; 7] = [0.10, 0.20, 0.30, 0.40, 0.60, 0.80, 1.00];

/// Multiplier applied to an attack that lands on a defending combatant.
pub const DEFEND_MULTIPLIER: f64 = 0.25;

const LOW: [f64; 7] = [0.07, 0.13, 0.35, 0.25, 0.10, 0.07, 0.03];
const HIGH: [f64; 7] = [0.01, 0.04, 0.10, 0.15, 0.25, 0.25, 0.20];
const SUPER: [f64; 7] = [0.00, 0.01, 0.04, 0.10, 0.15, 0.30, 0.40];

const LOW_CEILING: u32 = 30;
const HIGH_POINT: u32 = 70;
const SUPER_FLOOR: u32 = 120;

// Absorbs float noise such as 0.6 * 55 landing a hair under 33.
const FLOOR_EPSILON: f64 = 1e-9;

/// Probability of each entry of [`DAMAGE_PERCENTS`] for one attacker stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageTable {
    probabilities: [f64; 7],
}

impl DamageTable {
    pub fn for_attack(attack: u32) -> Self {
        let probabilities = if attack <= LOW_CEILING {
            LOW
        } else if attack < HIGH_POINT {
            let fraction = f64::from(attack - LOW_CEILING) / f64::from(HIGH_POINT - LOW_CEILING);
            interpolate(&LOW, &HIGH, fraction)
        } else if attack == HIGH_POINT {
            HIGH
        } else if attack < SUPER_FLOOR {
            let fraction = f64::from(attack - HIGH_POINT) / f64::from(SUPER_FLOOR - HIGH_POINT);
            interpolate(&HIGH, &SUPER, fraction)
        } else {
            SUPER
        };

        Self { probabilities }
    }

    pub fn probabilities(&self) -> &[f64; 7] {
        &self.probabilities
    }

    /// First percent whose cumulative probability exceeds `u`; the last bucket when the
    /// running sum never gets there.
    pub fn sample(&self, u: f64) -> f64 {
        let mut cumulative = 0.0;
        for (percent, probability) in DAMAGE_PERCENTS.iter().zip(self.probabilities.iter()) {
            cumulative += probability;
            if u < cumulative {
                return *percent;
            }
        }
        DAMAGE_PERCENTS[DAMAGE_PERCENTS.len() - 1]
    }
}

fn interpolate(from: &[f64; 7], to: &[f64; 7], fraction: f64) -> [f64; 7] {
    let mut out = [0.0; 7];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = from[i] * (1.0 - fraction) + to[i] * fraction;
    }
    out
}

/// Draws one damage percent for an attacker with the given attack stat.
pub fn roll_percent(attack: u32, rng: &mut dyn RngPort) -> f64 {
    DamageTable::for_attack(attack).sample(rng.float64())
}

/// Damage before the defense stat is taken into account.
pub fn compute_damage(power: u32, percent: f64, type_multiplier: f64, defending: bool) -> u32 {
    let damage = floor_damage(f64::from(power) * percent * type_multiplier);
    if defending {
        floor_damage(f64::from(damage) * DEFEND_MULTIPLIER)
    } else {
        damage
    }
}

pub(crate) fn floor_damage(value: f64) -> u32 {
    if value <= 0.0 {
        return 0;
    }
    (value + FLOOR_EPSILON).floor() as u32
}
