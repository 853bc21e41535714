use tracing::trace;

use crate::glyph_cache::GlyphPathCache;
use crate::layout::{
    CellRect, GlyphClass, GlyphPlacement, LayoutResult, LineBox, Orientation, PlacementPolicy,
    Rotation, VerticalClassTable, stacked_extent,
};
use crate::metrics::MetricsProvider;

/// Spacing inputs in pixels for the active orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutParams {
    pub orientation: Orientation,
    /// Extra space between consecutive characters of a line or column.
    pub char_spacing: f32,
    /// Extra space between consecutive lines or columns.
    pub line_spacing: f32,
}

/// Character-by-character layout for horizontal and vertical text.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    table: VerticalClassTable,
}

impl LayoutEngine {
    pub fn new(table: VerticalClassTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VerticalClassTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut VerticalClassTable {
        &mut self.table
    }

    /// Place every character of `content`.
    ///
    /// Lines are separated by `\n`. Every outline is read through `glyphs`
    /// to collect the ink extent, so the compositor later hits the cache.
    pub fn layout(
        &self,
        content: &str,
        params: &LayoutParams,
        metrics: &MetricsProvider,
        glyphs: &mut GlyphPathCache,
    ) -> LayoutResult {
        let lines = split_lines(content);
        let mut result = match params.orientation {
            Orientation::Horizontal => layout_horizontal(&lines, params, metrics),
            Orientation::Vertical => self.layout_vertical(&lines, params, metrics, glyphs),
        };
        result.ink = ink_extent(&result.placements, metrics, glyphs);
        trace!(
            orientation = ?result.orientation,
            glyphs = result.placements.len(),
            width = result.width,
            height = result.height,
            ink = ?result.ink,
            "laid out content"
        );
        result
    }

    fn layout_vertical(
        &self,
        columns: &[Vec<char>],
        params: &LayoutParams,
        metrics: &MetricsProvider,
        glyphs: &mut GlyphPathCache,
    ) -> LayoutResult {
        let cell = metrics.cell_height();
        let row_step = cell + params.char_spacing;
        let em_dy = (metrics.ascent() - metrics.descent()) / 2.0;

        let widths: Vec<f32> = columns
            .iter()
            .map(|column| column_width(column, metrics))
            .collect();
        let width = column_extent(&widths, params.line_spacing);

        let mut placements = Vec::new();
        let mut lines = Vec::with_capacity(columns.len());
        // Columns run right to left.
        let mut right = width;
        for (index, (column, &col_width)) in columns.iter().zip(&widths).enumerate() {
            let left = right - col_width;
            let cx = left + col_width / 2.0;
            let start = placements.len();

            for (row, &ch) in column.iter().enumerate() {
                let top = row as f32 * row_step;
                let cy = top + cell / 2.0;
                let advance = metrics.advance(ch);
                let class = self.table.classify(ch);
                let policy = self.table.policy(class);
                let em_offset = [-advance / 2.0, em_dy];

                let offset = match policy {
                    PlacementPolicy::EmCentered { .. } => em_offset,
                    PlacementPolicy::InkCentered { .. } => {
                        match glyphs.get_or_build(metrics, ch).ink {
                            Some(ink) => [
                                -(ink.left() + ink.right()) / 2.0,
                                -(ink.top() + ink.bottom()) / 2.0,
                            ],
                            None => em_offset,
                        }
                    }
                    PlacementPolicy::Shifted {
                        dx_advance,
                        dy_cell,
                    } => [
                        em_offset[0] + dx_advance * advance,
                        em_offset[1] - dy_cell * cell,
                    ],
                };

                placements.push(GlyphPlacement {
                    ch,
                    class,
                    anchor: [cx, cy],
                    rotation: policy.rotation(),
                    offset,
                    advance,
                    cell: CellRect {
                        x: left,
                        y: top,
                        width: col_width,
                        height: cell,
                    },
                    line: index,
                });
            }

            lines.push(LineBox {
                rect: CellRect {
                    x: left,
                    y: 0.0,
                    width: col_width,
                    height: stacked_extent(column.len(), row_step, cell),
                },
                glyphs: start..placements.len(),
            });
            right = left - params.line_spacing;
        }

        let height = lines.iter().map(|line| line.rect.height).fold(0.0, f32::max);
        LayoutResult {
            orientation: Orientation::Vertical,
            placements,
            lines,
            width,
            height,
            ink: None,
        }
    }
}

fn layout_horizontal(
    lines: &[Vec<char>],
    params: &LayoutParams,
    metrics: &MetricsProvider,
) -> LayoutResult {
    let cell = metrics.cell_height();
    let step = cell + params.line_spacing;
    let ascent = metrics.ascent();

    let mut placements = Vec::new();
    let mut boxes = Vec::with_capacity(lines.len());
    let mut width: f32 = 0.0;
    for (index, line) in lines.iter().enumerate() {
        let top = index as f32 * step;
        let start = placements.len();
        let mut pen: f32 = 0.0;
        let mut right: f32 = 0.0;
        for &ch in line {
            let advance = metrics.advance(ch);
            placements.push(GlyphPlacement {
                ch,
                class: GlyphClass::Standard,
                anchor: [pen, top + ascent],
                rotation: Rotation::Upright,
                offset: [0.0, 0.0],
                advance,
                cell: CellRect {
                    x: pen,
                    y: top,
                    width: advance,
                    height: cell,
                },
                line: index,
            });
            right = right.max(pen + advance);
            pen = (pen + advance + params.char_spacing).max(0.0);
        }
        width = width.max(right);
        boxes.push(LineBox {
            rect: CellRect {
                x: 0.0,
                y: top,
                width: right,
                height: cell,
            },
            glyphs: start..placements.len(),
        });
    }

    LayoutResult {
        orientation: Orientation::Horizontal,
        placements,
        width,
        height: stacked_extent(boxes.len(), step, cell),
        lines: boxes,
        ink: None,
    }
}

/// Union of the placed ink rectangles; blank glyphs contribute nothing.
fn ink_extent(
    placements: &[GlyphPlacement],
    metrics: &MetricsProvider,
    glyphs: &mut GlyphPathCache,
) -> Option<CellRect> {
    placements
        .iter()
        .filter_map(|placement| {
            let ink = glyphs.get_or_build(metrics, placement.ch).ink?;
            ink.transform(placement.transform())
        })
        .map(CellRect::from)
        .reduce(CellRect::union)
}

fn split_lines(content: &str) -> Vec<Vec<char>> {
    content
        .split('\n')
        .map(|line| line.chars().filter(|&ch| ch != '\r').collect())
        .collect()
}

/// Never narrower than the font size, widened by the widest advance.
fn column_width(column: &[char], metrics: &MetricsProvider) -> f32 {
    column
        .iter()
        .map(|&ch| metrics.advance(ch))
        .fold(metrics.font_size(), f32::max)
}

/// Total width of columns `widths` spaced `spacing` apart. Positive spacing
/// also follows the last column.
fn column_extent(widths: &[f32], spacing: f32) -> f32 {
    if widths.is_empty() {
        return 0.0;
    }
    let gaps = (widths.len() - 1) as f32 * spacing + spacing.max(0.0);
    widths.iter().sum::<f32>() + gaps
}
