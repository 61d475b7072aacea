/// Gold thresholds and the cubes they convert to, highest first.
pub const TIP_TIERS: [(u64, u64); 3] = [(100, 10), (50, 5), (10, 1)];

/// Converts a gold tip to cubes using a step function, not a proportional rate.
/// Tips below the lowest tier are worth nothing.
pub fn cubes_for_tip(gold: u64) -> u64 {
    TIP_TIERS
        .iter()
        .find(|(threshold, _)| gold >= *threshold)
        .map(|(_, cubes)| *cubes)
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::cubes_for_tip;

    #[test]
    fn test_tip_tiers() {
        assert_eq!(cubes_for_tip(9), 0);
        assert_eq!(cubes_for_tip(10), 1);
        assert_eq!(cubes_for_tip(49), 1);
        assert_eq!(cubes_for_tip(50), 5);
        assert_eq!(cubes_for_tip(99), 5);
        assert_eq!(cubes_for_tip(100), 10);
        assert_eq!(cubes_for_tip(5000), 10);
    }
}
