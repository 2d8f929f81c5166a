use crate::game::{stats_at_level, MAX_LEVEL};

use super::models::{CardProgress, LevelUpRecord};

/// XP needed to leave `level`.
pub fn xp_to_next(level: u32) -> u32 {
    100 * level
}

/// Adds `gained` XP and levels up while the threshold is met. At the level cap the
/// remaining XP is dropped.
pub fn apply_xp(level: u32, xp: u32, gained: u32) -> (u32, u32) {
    let mut level = level.clamp(1, MAX_LEVEL);
    let mut xp = xp.saturating_add(gained);
    while level < MAX_LEVEL && xp >= xp_to_next(level) {
        xp -= xp_to_next(level);
        level += 1;
    }
    if level == MAX_LEVEL {
        xp = 0;
    }
    (level, xp)
}

/// Applies XP to persisted progress. Returns the record when the level changed.
pub fn level_up(progress: &mut CardProgress, gained: u32) -> Option<LevelUpRecord> {
    let old_level = progress.level;
    let (level, xp) = apply_xp(progress.level, progress.xp, gained);
    progress.level = level;
    progress.xp = xp;

    (level != old_level).then(|| LevelUpRecord {
        card_id: progress.card_id,
        old_level,
        new_level: level,
        old_stats: stats_at_level(&progress.base, old_level),
        new_stats: stats_at_level(&progress.base, level),
        xp,
    })
}
