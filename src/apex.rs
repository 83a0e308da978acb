//! APEX conversion between 8-bit device codes and photographic quantities.
//!
//! Each converter is built from a literal `(code, value)` table and keeps two views of it:
//! sorted by code for [`ApexConverter::decode`] (exact match only) and sorted by value for
//! [`ApexConverter::encode`] (nearest match). Tables are reproduced bit-for-bit from the
//! device protocol; the exposure-compensation tables wrap from positive to negative values
//! across the code space, which is why encode needs its own value-sorted view.

use std::sync::LazyLock;

/// Binary search that falls back to the nearest of the two bracketing entries.
///
/// `compare(x)` returns `target - key(x)`. On an exact hit the hit index is returned.
/// Otherwise the entries on either side of the insertion point are compared and the right
/// one is taken only when it is strictly closer.
fn bsearch_nearest<T>(items: &[T], compare: impl Fn(&T) -> f64) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let mut lo = 0usize;
    let mut hi = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let e = compare(&items[mid]);
        if e < 0.0 {
            hi = mid;
        } else if e > 0.0 {
            lo = mid + 1;
        } else {
            return Some(mid);
        }
    }
    // lo is now the index of the first entry above the target
    if lo == 0 {
        return Some(0);
    }
    if lo == items.len() {
        return Some(lo - 1);
    }
    let left = compare(&items[lo - 1]).abs();
    let right = compare(&items[lo]).abs();
    Some(if right < left { lo } else { lo - 1 })
}

/// Bidirectional code/value converter for one photographic quantity.
#[derive(Debug, Clone)]
pub struct ApexConverter {
    by_code: Vec<(u8, f64)>,
    by_value: Vec<(u8, f64)>,
}

impl ApexConverter {
    pub fn new(table: &[(u8, f64)]) -> Self {
        let mut by_code = table.to_vec();
        by_code.sort_by_key(|&(code, _)| code);
        let mut by_value = table.to_vec();
        by_value.sort_by(|a, b| a.1.total_cmp(&b.1));
        ApexConverter { by_code, by_value }
    }

    /// Physical value for `code`, or `None` when the code is not in the table.
    pub fn decode(&self, code: u8) -> Option<f64> {
        let i = bsearch_nearest(&self.by_code, |&(c, _)| code as f64 - c as f64)?;
        let (found, value) = self.by_code[i];
        (found == code).then_some(value)
    }

    /// Code of the table entry closest to `value`; on a tie the smaller value wins.
    /// `None` only when the converter was built from an empty table.
    pub fn encode(&self, value: f64) -> Option<u8> {
        let i = bsearch_nearest(&self.by_value, |&(_, v)| value - v)?;
        Some(self.by_value[i].0)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Entries in code order.
    pub fn entries(&self) -> &[(u8, f64)] {
        &self.by_code
    }
}

/// Stop granularity of the shutter, aperture and exposure-compensation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApexStep {
    #[default]
    Third,
    Half,
}

pub fn shutter_speed(step: ApexStep) -> &'static ApexConverter {
    match step {
        ApexStep::Third => &SHUTTER_SPEED_THIRD,
        ApexStep::Half => &SHUTTER_SPEED_HALF,
    }
}

pub fn aperture(step: ApexStep) -> &'static ApexConverter {
    match step {
        ApexStep::Third => &APERTURE_THIRD,
        ApexStep::Half => &APERTURE_HALF,
    }
}

pub fn exposure_compensation(step: ApexStep) -> &'static ApexConverter {
    match step {
        ApexStep::Third => &EXP_COMP_THIRD,
        ApexStep::Half => &EXP_COMP_HALF,
    }
}

const ISO_SPEED_TABLE: &[(u8, f64)] = &[
    (0, 6.0), (3, 8.0), (5, 10.0), (8, 12.0), (11, 16.0), (13, 20.0), (16, 25.0), (19, 32.0),
    (21, 40.0), (24, 50.0), (27, 64.0), (29, 80.0), (32, 100.0), (35, 125.0), (37, 160.0),
    (40, 200.0), (43, 250.0), (45, 320.0), (48, 400.0), (51, 500.0), (53, 640.0), (56, 800.0),
    (59, 1000.0), (61, 1250.0), (64, 1600.0), (67, 2000.0), (69, 2500.0), (72, 3200.0),
    (75, 4000.0), (77, 5000.0), (80, 6400.0), (83, 8000.0), (85, 10000.0), (88, 12800.0),
    (91, 16000.0), (93, 20000.0), (96, 25600.0), (99, 32000.0), (101, 40000.0),
    (104, 51200.0), (107, 64000.0), (109, 80000.0), (112, 102400.0),
];

const EXP_COMP_HALF_TABLE: &[(u8, f64)] = &[
    (0, 0.0), (4, 0.5), (8, 1.0), (12, 1.5), (16, 2.0), (20, 2.5), (24, 3.0),
    (232, -3.0), (236, -2.5), (240, -2.0), (244, -1.5), (248, -1.0), (252, -0.5),
];

const EXP_COMP_THIRD_TABLE: &[(u8, f64)] = &[
    (0, 0.0), (3, 0.3), (5, 0.7), (8, 1.0), (11, 1.3), (14, 1.7), (16, 2.0),
    (19, 2.3), (21, 2.7), (24, 3.0), (27, 3.3), (29, 3.7), (32, 4.0), (35, 4.3),
    (37, 4.7), (40, 5.0), (43, 5.3), (45, 5.7), (48, 6.0), (51, 6.3),
    (205, -6.3), (208, -6.0), (211, -5.7), (213, -5.3), (216, -5.0), (219, -4.7),
    (221, -4.3), (224, -4.0), (227, -3.7), (229, -3.3), (232, -3.0), (235, -2.7),
    (237, -2.3), (240, -2.0), (243, -1.7), (245, -1.3), (248, -1.0), (251, -0.7),
    (253, -0.4),
];

const SHUTTER_SPEED_HALF_TABLE: &[(u8, f64)] = &[
    (17, 30.0), (20, 20.0), (24, 15.0), (28, 10.0), (32, 8.0), (36, 6.0), (40, 4.0),
    (44, 3.0), (48, 2.0), (52, 1.5), (56, 1.0), (60, 0.7), (64, 1.0 / 2.0), (68, 1.0 / 3.0),
    (72, 1.0 / 4.0), (76, 1.0 / 6.0), (80, 1.0 / 8.0), (84, 1.0 / 10.0), (88, 1.0 / 15.0),
    (92, 1.0 / 20.0), (96, 1.0 / 30.0), (100, 1.0 / 45.0), (104, 1.0 / 60.0),
    (108, 1.0 / 90.0), (112, 1.0 / 125.0), (116, 1.0 / 180.0), (120, 1.0 / 250.0),
    (124, 1.0 / 350.0), (128, 1.0 / 500.0), (132, 1.0 / 750.0), (136, 1.0 / 1000.0),
    (140, 1.0 / 1500.0), (144, 1.0 / 2000.0), (148, 1.0 / 3000.0), (152, 1.0 / 4000.0),
    (156, 1.0 / 6000.0), (160, 1.0 / 8000.0), (168, 1.0 / 16000.0), (176, 1.0 / 32000.0),
];

const SHUTTER_SPEED_THIRD_TABLE: &[(u8, f64)] = &[
    (16, 30.0), (19, 25.0), (21, 20.0), (24, 15.0), (27, 13.0), (29, 10.0),
    (32, 8.0), (35, 6.0), (37, 5.0), (40, 4.0), (43, 3.2), (45, 2.5), (48, 2.0),
    (51, 1.6), (53, 1.3), (56, 1.0), (59, 0.8), (61, 0.6), (64, 0.5), (67, 0.4),
    (69, 0.3), (72, 1.0 / 4.0), (75, 1.0 / 5.0), (77, 1.0 / 6.0), (80, 1.0 / 8.0),
    (83, 1.0 / 10.0), (85, 1.0 / 13.0), (88, 1.0 / 15.0), (91, 1.0 / 20.0),
    (93, 1.0 / 25.0), (96, 1.0 / 30.0), (99, 1.0 / 40.0), (101, 1.0 / 50.0),
    (104, 1.0 / 60.0), (107, 1.0 / 80.0), (109, 1.0 / 100.0), (112, 1.0 / 125.0),
    (115, 1.0 / 160.0), (117, 1.0 / 200.0), (120, 1.0 / 250.0), (123, 1.0 / 320.0),
    (125, 1.0 / 400.0), (128, 1.0 / 500.0), (131, 1.0 / 640.0), (133, 1.0 / 800.0),
    (136, 1.0 / 1000.0), (139, 1.0 / 1250.0), (141, 1.0 / 1600.0), (144, 1.0 / 2000.0),
    (147, 1.0 / 2500.0), (149, 1.0 / 3200.0), (152, 1.0 / 4000.0), (155, 1.0 / 5000.0),
    (157, 1.0 / 6000.0), (160, 1.0 / 8000.0), (163, 1.0 / 10000.0), (165, 1.0 / 12800.0),
    (168, 1.0 / 16000.0), (171, 1.0 / 20000.0), (173, 1.0 / 25600.0), (176, 1.0 / 32000.0),
];

const APERTURE_HALF_TABLE: &[(u8, f64)] = &[
    (8, 1.0), (12, 1.2), (16, 1.4), (20, 1.8), (28, 2.5), (32, 2.8), (36, 3.5),
    (40, 4.0), (44, 4.5), (48, 5.6), (52, 6.7), (56, 8.0), (60, 9.5), (64, 11.0),
    (68, 13.0), (72, 16.0), (76, 19.0), (80, 22.0), (84, 27.0), (88, 32.0), (92, 38.0),
    (96, 45.0), (100, 54.0), (104, 64.0), (108, 76.0), (112, 91.0),
];

// Code 191 is out of sequence in the device table; the code-sorted view absorbs it.
const APERTURE_THIRD_TABLE: &[(u8, f64)] = &[
    (8, 1.0), (11, 1.1), (13, 1.2), (16, 1.4), (19, 1.6), (21, 1.8), (24, 2.0),
    (27, 2.2), (29, 2.5), (32, 2.8), (35, 3.2), (37, 3.5), (40, 4.0), (43, 4.5),
    (45, 5.0), (48, 5.6), (51, 6.3), (53, 7.1), (56, 8.0), (59, 9.0), (61, 10.0),
    (64, 11.0), (67, 13.0), (69, 14.0), (72, 16.0), (75, 18.0), (77, 20.0), (80, 22.0),
    (83, 25.0), (85, 29.0), (88, 32.0), (91, 36.0), (93, 40.0), (96, 45.0), (99, 51.0),
    (191, 57.0), (104, 64.0), (107, 72.0), (108, 76.0), (112, 91.0),
];

/// ISO sensitivity.
pub static ISO_SPEED: LazyLock<ApexConverter> = LazyLock::new(|| ApexConverter::new(ISO_SPEED_TABLE));
/// 1/2-stop exposure compensation.
pub static EXP_COMP_HALF: LazyLock<ApexConverter> =
    LazyLock::new(|| ApexConverter::new(EXP_COMP_HALF_TABLE));
/// 1/3-stop exposure compensation.
pub static EXP_COMP_THIRD: LazyLock<ApexConverter> =
    LazyLock::new(|| ApexConverter::new(EXP_COMP_THIRD_TABLE));
/// 1/2-stop shutter speed, in seconds.
pub static SHUTTER_SPEED_HALF: LazyLock<ApexConverter> =
    LazyLock::new(|| ApexConverter::new(SHUTTER_SPEED_HALF_TABLE));
/// 1/3-stop shutter speed, in seconds.
pub static SHUTTER_SPEED_THIRD: LazyLock<ApexConverter> =
    LazyLock::new(|| ApexConverter::new(SHUTTER_SPEED_THIRD_TABLE));
/// 1/2-stop aperture (F-number).
pub static APERTURE_HALF: LazyLock<ApexConverter> =
    LazyLock::new(|| ApexConverter::new(APERTURE_HALF_TABLE));
/// 1/3-stop aperture (F-number).
pub static APERTURE_THIRD: LazyLock<ApexConverter> =
    LazyLock::new(|| ApexConverter::new(APERTURE_THIRD_TABLE));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bsearch_nearest_prefers_left_on_tie() {
        let xs = [0.0, 1.0, 2.0];
        // 0.5 is equidistant from 0.0 and 1.0
        assert_eq!(bsearch_nearest(&xs, |&x| 0.5 - x), Some(0));
        assert_eq!(bsearch_nearest(&xs, |&x| 1.5 - x), Some(1));
        assert_eq!(bsearch_nearest(&xs, |&x| 2.0 - x), Some(2));
        assert_eq!(bsearch_nearest::<f64>(&[], |&x| x), None);
        assert_eq!(bsearch_nearest(&[7.0], |&x| 100.0 - x), Some(0));
        assert_eq!(bsearch_nearest(&xs, |&x| -3.0 - x), Some(0));
        assert_eq!(bsearch_nearest(&xs, |&x| 9.0 - x), Some(2));
    }

    #[test]
    fn empty_table_encodes_to_none() {
        let conv = ApexConverter::new(&[]);
        assert!(conv.is_empty());
        assert_eq!(conv.encode(1.0), None);
        assert_eq!(conv.decode(0), None);
    }

    #[test]
    fn views_hold_the_same_entries() {
        let conv = &*EXP_COMP_THIRD;
        assert_eq!(conv.len(), EXP_COMP_THIRD_TABLE.len());
        assert!(conv.entries().windows(2).all(|w| w[0].0 < w[1].0));
        assert!(conv.by_value.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(conv.by_value.first().map(|e| e.0), Some(205));
    }

    #[test]
    fn out_of_sequence_aperture_code_decodes() {
        assert_eq!(APERTURE_THIRD.decode(191), Some(57.0));
        assert_eq!(APERTURE_THIRD.decode(104), Some(64.0));
        assert_eq!(APERTURE_THIRD.encode(57.0), Some(191));
    }
}
