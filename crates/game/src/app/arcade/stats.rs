#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionStats {
    pub(crate) enemies_spawned: u64,
    pub(crate) enemies_destroyed: u64,
    pub(crate) projectiles_fired: u64,
    pub(crate) projectiles_dropped: u64,
    pub(crate) projectiles_culled: u64,
    pub(crate) peak_live_enemies: usize,
    /// Enemies created per spawn rule, indexed like the rule list.
    pub(crate) spawns_by_rule: Vec<u64>,
}

impl SessionStats {
    pub(crate) fn with_rule_count(rule_count: usize) -> Self {
        Self {
            spawns_by_rule: vec![0; rule_count],
            ..Self::default()
        }
    }

    /// Returns true when `live_enemies` lands on a multiple of `warn_step`.
    pub(crate) fn record_spawn(
        &mut self,
        rule_index: usize,
        live_enemies: usize,
        warn_step: usize,
    ) -> bool {
        self.enemies_spawned = self.enemies_spawned.saturating_add(1);
        if let Some(count) = self.spawns_by_rule.get_mut(rule_index) {
            *count = count.saturating_add(1);
        }
        self.peak_live_enemies = self.peak_live_enemies.max(live_enemies);
        warn_step > 0 && live_enemies > 0 && live_enemies % warn_step == 0
    }

    pub(crate) fn record_enemy_destroyed(&mut self) {
        self.enemies_destroyed = self.enemies_destroyed.saturating_add(1);
    }

    pub(crate) fn record_fired(&mut self) {
        self.projectiles_fired = self.projectiles_fired.saturating_add(1);
    }

    pub(crate) fn record_dropped(&mut self) {
        self.projectiles_dropped = self.projectiles_dropped.saturating_add(1);
    }

    pub(crate) fn record_culled(&mut self) {
        self.projectiles_culled = self.projectiles_culled.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_tracks_rule_counts_and_peak() {
        let mut stats = SessionStats::with_rule_count(2);
        stats.record_spawn(1, 1, 25);
        stats.record_spawn(1, 2, 25);
        stats.record_spawn(0, 1, 25);

        assert_eq!(stats.enemies_spawned, 3);
        assert_eq!(stats.spawns_by_rule, vec![1, 2]);
        assert_eq!(stats.peak_live_enemies, 2);
    }

    #[test]
    fn growth_warning_fires_on_each_step_multiple() {
        let mut stats = SessionStats::with_rule_count(1);
        let warned: Vec<usize> = (1..=7)
            .filter(|live| stats.record_spawn(0, *live, 3))
            .collect();
        assert_eq!(warned, vec![3, 6]);
    }

    #[test]
    fn unknown_rule_index_still_counts_total() {
        let mut stats = SessionStats::with_rule_count(1);
        stats.record_spawn(9, 1, 25);
        assert_eq!(stats.enemies_spawned, 1);
        assert_eq!(stats.spawns_by_rule, vec![0]);
    }
}
