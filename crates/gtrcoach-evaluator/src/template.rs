//! Fold template: the seven-cell two-color base and the board regions anchored to it.
//!
//! The template is written relative to the bottom row so it applies to any board height:
//!
//! ```text
//! bottom-2:  A B . . . .   tier 3
//! bottom-1:  A A B . . .   tier 2
//! bottom  :  B B . . . .   tier 1
//! ```
//!
//! `A` and `B` are free colors (`A != B`). Tiers give the build order; a tier only counts as
//! complete when all of its slots hold the assigned color.
//!
//! [`FoldGeometry`] anchors the template to a concrete board and exposes the regions the
//! detector and the scorer work in:
//!
//! - the **trigger cell** `(0, bottom-3)`, where the chain simulation drops its starter
//! - the **simulation region**, all columns over rows `bottom-3..=bottom`
//! - the **evaluation region**, columns 0-1 over rows `bottom-2..=bottom` and columns 2-5 over
//!   rows `bottom-3..=bottom`

use std::ops::Range;

use arrayvec::ArrayVec;
use gtrcoach_engine::{Board, Position, PuyoColor, Region};
use serde::{Deserialize, Serialize};

/// Columns holding the fold.
pub const FOLD_COLUMNS: Range<usize> = 0..3;

/// Columns right of the fold where the chain tail is built.
pub const TAIL_COLUMNS: Range<usize> = 3..Board::WIDTH;

/// Number of rows the template spans.
pub const FOLD_ROWS: usize = 3;

/// Free color of a template slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotColor {
    A,
    B,
}

/// Build-order rank of a template slot, bottom row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    First,
    Second,
    Third,
}

impl Tier {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// The tier that has to be complete before this one is worth its full bonus.
    #[must_use]
    pub fn prerequisite(self) -> Option<Self> {
        match self {
            Self::First => None,
            Self::Second => Some(Self::First),
            Self::Third => Some(Self::Second),
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One cell of the fold template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateSlot {
    pub column: usize,
    pub rows_above_bottom: usize,
    pub color: SlotColor,
    pub tier: Tier,
}

impl TemplateSlot {
    const fn new(column: usize, rows_above_bottom: usize, color: SlotColor, tier: Tier) -> Self {
        Self {
            column,
            rows_above_bottom,
            color,
            tier,
        }
    }
}

/// The seven slots, listed tier by tier.
pub const FOLD_TEMPLATE: [TemplateSlot; 7] = [
    TemplateSlot::new(0, 0, SlotColor::B, Tier::First),
    TemplateSlot::new(1, 0, SlotColor::B, Tier::First),
    TemplateSlot::new(0, 1, SlotColor::A, Tier::Second),
    TemplateSlot::new(1, 1, SlotColor::A, Tier::Second),
    TemplateSlot::new(2, 1, SlotColor::B, Tier::Second),
    TemplateSlot::new(0, 2, SlotColor::A, Tier::Third),
    TemplateSlot::new(1, 2, SlotColor::B, Tier::Third),
];

/// Concrete colors for the template's `A` and `B` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoldColors {
    pub a: PuyoColor,
    pub b: PuyoColor,
}

impl FoldColors {
    #[must_use]
    pub fn color_of(self, slot: SlotColor) -> PuyoColor {
        match slot {
            SlotColor::A => self.a,
            SlotColor::B => self.b,
        }
    }

    /// Every ordered pair of distinct colors.
    #[must_use]
    pub fn all() -> ArrayVec<Self, 12> {
        PuyoColor::ALL
            .into_iter()
            .flat_map(|a| a.others().map(move |b| Self { a, b }))
            .collect()
    }
}

/// The template anchored to a board's bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldGeometry {
    bottom: usize,
}

impl FoldGeometry {
    /// Returns `None` for boards too small to hold the template.
    #[must_use]
    pub fn of(board: &Board) -> Option<Self> {
        if board.height() < FOLD_ROWS || board.width() < FOLD_COLUMNS.end {
            return None;
        }
        let bottom = board.bottom()?;
        Some(Self { bottom })
    }

    #[must_use]
    pub fn bottom(&self) -> usize {
        self.bottom
    }

    #[must_use]
    pub fn slot_position(&self, slot: &TemplateSlot) -> Position {
        Position::new(slot.column, self.bottom - slot.rows_above_bottom)
    }

    /// Slots paired with their board positions.
    pub fn slots(&self) -> impl Iterator<Item = (TemplateSlot, Position)> + '_ {
        FOLD_TEMPLATE
            .into_iter()
            .map(|slot| (slot, self.slot_position(&slot)))
    }

    pub fn tier_slots(&self, tier: Tier) -> impl Iterator<Item = (TemplateSlot, Position)> + '_ {
        self.slots().filter(move |(slot, _)| slot.tier == tier)
    }

    #[must_use]
    pub fn slot_at(&self, pos: Position) -> Option<TemplateSlot> {
        self.slots()
            .find(|(_, slot_pos)| *slot_pos == pos)
            .map(|(slot, _)| slot)
    }

    /// Whether every slot of `tier` holds its assigned color on `board`.
    #[must_use]
    pub fn is_tier_complete(&self, board: &Board, tier: Tier, colors: FoldColors) -> bool {
        self.tier_slots(tier)
            .all(|(slot, pos)| board.color_at_position(pos) == Some(colors.color_of(slot.color)))
    }

    /// Top row of the template.
    #[must_use]
    pub fn top(&self) -> usize {
        self.bottom + 1 - FOLD_ROWS
    }

    /// Row directly above the template, if the board has one.
    #[must_use]
    pub fn row_above(&self) -> Option<usize> {
        self.top().checked_sub(1)
    }

    /// Cell where the chain simulation drops its trigger.
    #[must_use]
    pub fn trigger_position(&self) -> Option<Position> {
        self.row_above().map(|y| Position::new(0, y))
    }

    /// Rectangle the chain simulation runs in.
    #[must_use]
    pub fn simulation_region(&self) -> Region {
        let top = self.row_above().unwrap_or(self.top());
        Region::new(0..Board::WIDTH, top..self.bottom + 1)
    }

    /// Whether `pos` belongs to the irregular evaluation region.
    #[must_use]
    pub fn in_evaluation_region(&self, pos: Position) -> bool {
        let top = if pos.x < 2 {
            self.top()
        } else {
            self.row_above().unwrap_or(self.top())
        };
        pos.x < Board::WIDTH && (top..=self.bottom).contains(&pos.y)
    }

    /// Cells of the evaluation region in row-major order.
    pub fn evaluation_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.simulation_region()
            .positions()
            .filter(|pos| self.in_evaluation_region(*pos))
    }

    /// Whether `pos` lies in the fold columns within the template rows.
    #[must_use]
    pub fn in_fold_area(&self, pos: Position) -> bool {
        FOLD_COLUMNS.contains(&pos.x) && (self.top()..=self.bottom).contains(&pos.y)
    }

    /// Tail columns over the bottom four rows.
    #[must_use]
    pub fn tail_base_region(&self) -> Region {
        Region::new(TAIL_COLUMNS, self.bottom.saturating_sub(3)..self.bottom + 1)
    }
}
