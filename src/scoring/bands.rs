//! Point band tables
//!
//! Each table is an ascending list of inclusive upper bounds. The first band
//! whose bound is >= the value decides the points; values above the last
//! bound get the table's ceiling.

/// An ordered (upper_bound, points) lookup table
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    bands: &'static [(f64, u8)],
    ceiling: u8,
}

impl BandTable {
    pub const fn new(bands: &'static [(f64, u8)], ceiling: u8) -> Self {
        Self { bands, ceiling }
    }

    /// Points for a value
    pub fn points(&self, value: f64) -> u8 {
        self.bands
            .iter()
            .find(|(upper, _)| value <= *upper)
            .map(|(_, points)| *points)
            .unwrap_or(self.ceiling)
    }

    /// Inclusive upper bounds in ascending order
    pub fn bounds(&self) -> impl Iterator<Item = f64> + '_ {
        self.bands.iter().map(|(upper, _)| *upper)
    }

    /// Points awarded above the last bound
    pub fn ceiling(&self) -> u8 {
        self.ceiling
    }
}

// ============================================================================
// Negative Points (0-10 each)
// ============================================================================

/// Energy in kJ per 100g
pub const ENERGY_KJ: BandTable = BandTable::new(
    &[
        (335.0, 0),
        (670.0, 1),
        (1005.0, 2),
        (1340.0, 3),
        (1675.0, 4),
        (2010.0, 5),
        (2345.0, 6),
        (2680.0, 7),
        (3015.0, 8),
        (3350.0, 9),
    ],
    10,
);

/// Sugars in g per 100g. The upper bands are not evenly spaced.
pub const SUGARS_G: BandTable = BandTable::new(
    &[
        (4.5, 0),
        (9.0, 1),
        (13.5, 2),
        (18.0, 3),
        (22.5, 4),
        (27.0, 5),
        (31.0, 6),
        (36.0, 7),
        (40.0, 8),
        (45.0, 9),
    ],
    10,
);

/// Saturated fat in g per 100g
pub const SATURATED_FAT_G: BandTable = BandTable::new(
    &[
        (1.0, 0),
        (2.0, 1),
        (3.0, 2),
        (4.0, 3),
        (5.0, 4),
        (6.0, 5),
        (7.0, 6),
        (8.0, 7),
        (9.0, 8),
        (10.0, 9),
    ],
    10,
);

/// Sodium in g per 100g (inputs arrive in mg and are converted first)
pub const SODIUM_G: BandTable = BandTable::new(
    &[
        (0.09, 0),
        (0.18, 1),
        (0.27, 2),
        (0.36, 3),
        (0.45, 4),
        (0.54, 5),
        (0.63, 6),
        (0.72, 7),
        (0.81, 8),
        (0.90, 9),
    ],
    10,
);

// ============================================================================
// Positive Points (0-5 each)
// ============================================================================

/// Fruit, vegetable and nut content in percent. Jumps from 2 straight to 5.
pub const FRUITS_VEG_NUTS_PCT: BandTable =
    BandTable::new(&[(40.0, 0), (60.0, 1), (80.0, 2)], 5);

/// Fiber in g per 100g
pub const FIBER_G: BandTable =
    BandTable::new(&[(0.9, 0), (1.9, 1), (2.8, 2), (3.7, 3), (4.7, 4)], 5);

/// Protein in g per 100g
pub const PROTEIN_G: BandTable =
    BandTable::new(&[(1.6, 0), (3.2, 1), (4.8, 2), (6.4, 3), (8.0, 4)], 5);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BandTable; 7] = [
        ENERGY_KJ,
        SUGARS_G,
        SATURATED_FAT_G,
        SODIUM_G,
        FRUITS_VEG_NUTS_PCT,
        FIBER_G,
        PROTEIN_G,
    ];

    #[test]
    fn test_bounds_strictly_ascending() {
        for table in ALL {
            let bounds: Vec<f64> = table.bounds().collect();
            assert!(bounds.windows(2).all(|w| w[0] < w[1]), "{:?}", bounds);
        }
    }

    #[test]
    fn test_upper_bound_is_inclusive() {
        assert_eq!(ENERGY_KJ.points(335.0), 0);
        assert_eq!(ENERGY_KJ.points(335.1), 1);
        assert_eq!(ENERGY_KJ.points(3350.0), 9);
        assert_eq!(ENERGY_KJ.points(3350.1), 10);
        assert_eq!(SATURATED_FAT_G.points(10.0), 9);
        assert_eq!(SATURATED_FAT_G.points(10.01), 10);
    }

    #[test]
    fn test_sugar_upper_bands() {
        assert_eq!(SUGARS_G.points(27.0), 5);
        assert_eq!(SUGARS_G.points(30.9), 6);
        assert_eq!(SUGARS_G.points(31.0), 6);
        assert_eq!(SUGARS_G.points(31.5), 7);
        assert_eq!(SUGARS_G.points(40.0), 8);
        assert_eq!(SUGARS_G.points(45.0), 9);
        assert_eq!(SUGARS_G.points(45.5), 10);
    }

    #[test]
    fn test_sodium_bands() {
        assert_eq!(SODIUM_G.points(0.0), 0);
        assert_eq!(SODIUM_G.points(0.4), 4);
        assert_eq!(SODIUM_G.points(0.9), 9);
        assert_eq!(SODIUM_G.points(2.0), 10);
    }

    #[test]
    fn test_fruits_veg_nuts_skips_three_and_four() {
        assert_eq!(FRUITS_VEG_NUTS_PCT.points(40.0), 0);
        assert_eq!(FRUITS_VEG_NUTS_PCT.points(60.0), 1);
        assert_eq!(FRUITS_VEG_NUTS_PCT.points(80.0), 2);
        assert_eq!(FRUITS_VEG_NUTS_PCT.points(80.5), 5);
        assert_eq!(FRUITS_VEG_NUTS_PCT.ceiling(), 5);
    }

    #[test]
    fn test_negative_values_land_in_first_band() {
        assert_eq!(PROTEIN_G.points(-3.0), 0);
        assert_eq!(FIBER_G.points(-0.1), 0);
    }

    #[test]
    fn test_fiber_and_protein_bands() {
        assert_eq!(FIBER_G.points(0.9), 0);
        assert_eq!(FIBER_G.points(1.0), 1);
        assert_eq!(FIBER_G.points(3.0), 3);
        assert_eq!(FIBER_G.points(4.8), 5);
        assert_eq!(PROTEIN_G.points(5.0), 3);
        assert_eq!(PROTEIN_G.points(8.0), 4);
        assert_eq!(PROTEIN_G.points(8.1), 5);
    }
}
