//! Per-character placement rules for vertical writing.
//!
//! Characters map to a [`GlyphClass`] tag and each tag maps to a
//! [`PlacementPolicy`]. Both tables can be extended or retuned at runtime.

use hashbrown::HashMap;

/// Classification tag for a character in vertical mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphClass {
    /// Upright, centered on its em box.
    Standard,
    /// Turned 90 degrees and centered on its visible ink (long vowel mark, dashes).
    RotatedInkCentered,
    /// Turned 90 degrees and centered on its em box (brackets).
    RotatedEmCentered,
    /// Upright, moved from the bottom-left to the top-right of the cell (comma, period).
    QuadrantShifted,
}

/// Glyph rotation around its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Upright,
    /// 90 degrees clockwise.
    Quarter,
}

impl Rotation {
    pub fn degrees(self) -> f32 {
        match self {
            Rotation::Upright => 0.0,
            Rotation::Quarter => 90.0,
        }
    }
}

/// How a glyph is positioned inside its vertical cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementPolicy {
    /// Center of the em box on the cell center.
    EmCentered { rotation: Rotation },
    /// Center of the ink bounds on the cell center.
    InkCentered { rotation: Rotation },
    /// Em-centered, then shifted right by `dx_advance * advance` and up by
    /// `dy_cell * cell_height`.
    Shifted { dx_advance: f32, dy_cell: f32 },
}

impl PlacementPolicy {
    pub fn rotation(&self) -> Rotation {
        match *self {
            PlacementPolicy::EmCentered { rotation } | PlacementPolicy::InkCentered { rotation } => {
                rotation
            }
            PlacementPolicy::Shifted { .. } => Rotation::Upright,
        }
    }
}

const ROTATED_INK: &[char] = &[
    'ー', '～', '〜', '—', '―', '–', '-', '‐', '－', '=', '＝', '…', '‥', ':', ';', '：', '；',
];

const ROTATED_EM: &[char] = &[
    '[', ']', '(', ')', '（', '）', '<', '>', '＜', '＞', '「', '」', '『', '』', '〔', '〕',
    '｛', '｝', '{', '}', '〈', '〉', '《', '》', '【', '】', '［', '］', '\\',
];

const QUADRANT: &[char] = &['、', '。', '，', '．', ',', '.'];

/// Character to class and class to policy tables for vertical layout.
#[derive(Debug, Clone)]
pub struct VerticalClassTable {
    classes: HashMap<char, GlyphClass>,
    policies: HashMap<GlyphClass, PlacementPolicy>,
}

impl Default for VerticalClassTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table
            .assign(ROTATED_INK.iter().copied(), GlyphClass::RotatedInkCentered)
            .assign(ROTATED_EM.iter().copied(), GlyphClass::RotatedEmCentered)
            .assign(QUADRANT.iter().copied(), GlyphClass::QuadrantShifted);
        table
    }
}

impl VerticalClassTable {
    /// A table where every character is [`GlyphClass::Standard`].
    pub fn empty() -> Self {
        let policies = [
            (
                GlyphClass::Standard,
                PlacementPolicy::EmCentered {
                    rotation: Rotation::Upright,
                },
            ),
            (
                GlyphClass::RotatedInkCentered,
                PlacementPolicy::InkCentered {
                    rotation: Rotation::Quarter,
                },
            ),
            (
                GlyphClass::RotatedEmCentered,
                PlacementPolicy::EmCentered {
                    rotation: Rotation::Quarter,
                },
            ),
            (
                GlyphClass::QuadrantShifted,
                PlacementPolicy::Shifted {
                    dx_advance: 0.5,
                    dy_cell: 0.5,
                },
            ),
        ];
        Self {
            classes: HashMap::new(),
            policies: policies.into_iter().collect(),
        }
    }

    pub fn assign(
        &mut self,
        chars: impl IntoIterator<Item = char>,
        class: GlyphClass,
    ) -> &mut Self {
        for ch in chars {
            self.classes.insert(ch, class);
        }
        self
    }

    pub fn set_policy(&mut self, class: GlyphClass, policy: PlacementPolicy) -> &mut Self {
        self.policies.insert(class, policy);
        self
    }

    pub fn classify(&self, ch: char) -> GlyphClass {
        self.classes.get(&ch).copied().unwrap_or(GlyphClass::Standard)
    }

    pub fn policy(&self, class: GlyphClass) -> PlacementPolicy {
        self.policies
            .get(&class)
            .copied()
            .unwrap_or(PlacementPolicy::EmCentered {
                rotation: Rotation::Upright,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classes() {
        let table = VerticalClassTable::default();
        assert_eq!(table.classify('国'), GlyphClass::Standard);
        assert_eq!(table.classify('ー'), GlyphClass::RotatedInkCentered);
        assert_eq!(table.classify('「'), GlyphClass::RotatedEmCentered);
        assert_eq!(table.classify('、'), GlyphClass::QuadrantShifted);
        assert_eq!(table.classify('.'), GlyphClass::QuadrantShifted);
    }

    #[test]
    fn test_extension() {
        let mut table = VerticalClassTable::default();
        table
            .assign(['☆'], GlyphClass::RotatedEmCentered)
            .set_policy(
                GlyphClass::QuadrantShifted,
                PlacementPolicy::Shifted {
                    dx_advance: 0.6,
                    dy_cell: 0.6,
                },
            );
        assert_eq!(table.classify('☆'), GlyphClass::RotatedEmCentered);
        assert_eq!(
            table.policy(GlyphClass::QuadrantShifted),
            PlacementPolicy::Shifted {
                dx_advance: 0.6,
                dy_cell: 0.6
            }
        );
        assert_eq!(
            table.policy(GlyphClass::RotatedEmCentered).rotation(),
            Rotation::Quarter
        );
    }
}
