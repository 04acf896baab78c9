//! Renderer boundary. The core hands out snapshots; everything visual,
//! including the glyph used for each building kind, lives behind `Renderer`.

use std::fmt::Write as _;

use crate::buildings::BuildingKind;
use crate::grid::Occupancy;
use crate::ledger::Resources;
use crate::snapshot::{CellView, CitySnapshot};

pub trait Renderer {
    fn begin_row(&mut self, y: i32);
    fn draw_cell(&mut self, cell: &CellView);
    fn draw_resources(&mut self, resources: &Resources);
}

/// Walks a snapshot row by row and feeds it to `renderer`.
pub fn present<R: Renderer + ?Sized>(snapshot: &CitySnapshot, renderer: &mut R) {
    let width = snapshot.width.max(1) as usize;
    for (y, row) in snapshot.cells.chunks(width).enumerate() {
        renderer.begin_row(y as i32);
        for cell in row {
            renderer.draw_cell(cell);
        }
    }
    renderer.draw_resources(&snapshot.resources);
}

pub fn glyph(kind: BuildingKind) -> char {
    match kind {
        BuildingKind::Residential => 'R',
        BuildingKind::Commercial => 'C',
        BuildingKind::Industrial => 'I',
        BuildingKind::Power => 'P',
        BuildingKind::Road => '#',
    }
}

/// Plain-text map: occupied tiles show their kind glyph, empty tiles their
/// land value (`A` for 10).
#[derive(Debug, Default)]
pub struct TextRenderer {
    out: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(snapshot: &CitySnapshot) -> String {
        let mut renderer = Self::new();
        present(snapshot, &mut renderer);
        renderer.finish()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl Renderer for TextRenderer {
    fn begin_row(&mut self, y: i32) {
        if y > 0 {
            self.out.push('\n');
        }
    }

    fn draw_cell(&mut self, cell: &CellView) {
        let symbol = match cell.occupancy {
            Occupancy::Occupied(kind) => glyph(kind),
            Occupancy::Empty => char::from_digit(u32::from(cell.land_value), 11).unwrap_or('?'),
        };
        self.out.push(symbol.to_ascii_uppercase());
    }

    fn draw_resources(&mut self, resources: &Resources) {
        let _ = write!(
            self.out,
            "\nmoney: ${}  population: {}  power: {}",
            resources.money, resources.population, resources.power
        );
    }
}
