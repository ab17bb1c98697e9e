// SPDX-License-Identifier: GPL-3.0-only

//! Fixed strip geometry per template
//!
//! All sizes are in output pixels and do not depend on the photos.

use crate::app::StripTemplate;
use crate::constants::strip::PHOTOS_PER_STRIP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Canvas size, text baselines and photo placement for one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripLayout {
    pub width: u32,
    pub height: u32,
    /// Title baseline
    pub title_y: u32,
    /// Date baseline
    pub date_y: u32,
    /// Where each photo is drawn, in index order
    pub slots: [Rect; PHOTOS_PER_STRIP],
    /// Polaroid card behind each photo
    pub frames: Option<[Rect; PHOTOS_PER_STRIP]>,
}

// Single column templates
const COLUMN_X: u32 = 100;
const COLUMN_SLOT_W: u32 = 600;
const COLUMN_SLOT_H: u32 = 225;
const COLUMN_PITCH: u32 = 260;

// Modern grid
const GRID_CELL_W: u32 = 420;
const GRID_CELL_H: u32 = 315;
const GRID_GAP: u32 = 40;
const GRID_TOP: u32 = 150;

// Polaroid cards
const CARD_W: u32 = 600;
const CARD_H: u32 = 370;
const CARD_PITCH: u32 = 400;
const CARD_INSET: u32 = 20;
const CARD_PHOTO_H: u32 = 280;

impl StripLayout {
    pub fn for_template(template: StripTemplate) -> Self {
        match template {
            StripTemplate::Classic => Self::column(800, 1200, 150, 60, 100),
            StripTemplate::Vintage => Self::column(800, 1240, 160, 70, 115),
            StripTemplate::Modern => {
                let width = 1000;
                let left = (width - (GRID_CELL_W * 2 + GRID_GAP)) / 2;
                let slots = std::array::from_fn(|i| {
                    let (col, row) = ((i % 2) as u32, (i / 2) as u32);
                    Rect::new(
                        left + col * (GRID_CELL_W + GRID_GAP),
                        GRID_TOP + row * (GRID_CELL_H + GRID_GAP),
                        GRID_CELL_W,
                        GRID_CELL_H,
                    )
                });
                Self {
                    width,
                    height: 900,
                    title_y: 70,
                    date_y: 110,
                    slots,
                    frames: None,
                }
            }
            StripTemplate::Polaroid => {
                let frames: [Rect; PHOTOS_PER_STRIP] = std::array::from_fn(|i| {
                    Rect::new(COLUMN_X, 150 + i as u32 * CARD_PITCH, CARD_W, CARD_H)
                });
                let slots = frames.map(|f| {
                    Rect::new(
                        f.x + CARD_INSET,
                        f.y + CARD_INSET,
                        f.width - 2 * CARD_INSET,
                        CARD_PHOTO_H,
                    )
                });
                Self {
                    width: 800,
                    height: 1760,
                    title_y: 60,
                    date_y: 100,
                    slots,
                    frames: Some(frames),
                }
            }
        }
    }

    fn column(width: u32, height: u32, top: u32, title_y: u32, date_y: u32) -> Self {
        Self {
            width,
            height,
            title_y,
            date_y,
            slots: std::array::from_fn(|i| {
                Rect::new(
                    COLUMN_X,
                    top + i as u32 * COLUMN_PITCH,
                    COLUMN_SLOT_W,
                    COLUMN_SLOT_H,
                )
            }),
            frames: None,
        }
    }
}
