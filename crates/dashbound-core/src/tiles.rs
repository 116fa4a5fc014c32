use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How the collision resolver treats a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    None,
    Background,
    Blocking,
    Death,
    /// Bounce pad: launches the player upward and restores the dash.
    Jump,
}

/// Index into the static tile catalog.
///
/// Ids can only be obtained from the catalog constants below or through
/// `TryFrom<u16>`, so every `TileId` in existence refers to a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct TileId(u16);

/// Immutable description of a catalog tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileDefinition {
    /// Column/row of the sprite on the tile sheet.
    pub sprite_offset: (u32, u32),
    pub tile_type: TileType,
    pub visible: bool,
}

const fn sprite(x: u32, y: u32, tile_type: TileType) -> TileDefinition {
    TileDefinition {
        sprite_offset: (x, y),
        tile_type,
        visible: true,
    }
}

const fn hidden(tile_type: TileType) -> TileDefinition {
    TileDefinition {
        sprite_offset: (0, 0),
        tile_type,
        visible: false,
    }
}

/// Every tile the game knows about, indexed by `TileId`.
static CATALOG: [TileDefinition; 32] = [
    // Transparency checkerboard
    sprite(0, 0, TileType::Background),
    sprite(1, 0, TileType::Background),
    // Default background
    sprite(0, 1, TileType::Background),
    // Default box: fill, edges, outer corners, inner corners
    sprite(4, 2, TileType::Blocking),
    sprite(5, 0, TileType::Blocking),
    sprite(5, 3, TileType::Blocking),
    sprite(4, 1, TileType::Blocking),
    sprite(7, 1, TileType::Blocking),
    sprite(4, 0, TileType::Blocking),
    sprite(7, 0, TileType::Blocking),
    sprite(4, 3, TileType::Blocking),
    sprite(7, 3, TileType::Blocking),
    sprite(6, 2, TileType::Blocking),
    sprite(5, 2, TileType::Blocking),
    sprite(6, 1, TileType::Blocking),
    sprite(5, 1, TileType::Blocking),
    // Hazard box, same layout four rows down the sheet
    sprite(4, 6, TileType::Death),
    sprite(5, 4, TileType::Death),
    sprite(5, 7, TileType::Death),
    sprite(4, 5, TileType::Death),
    sprite(7, 5, TileType::Death),
    sprite(4, 4, TileType::Death),
    sprite(7, 4, TileType::Death),
    sprite(4, 7, TileType::Death),
    sprite(7, 7, TileType::Death),
    sprite(6, 6, TileType::Death),
    sprite(5, 6, TileType::Death),
    sprite(6, 5, TileType::Death),
    sprite(5, 5, TileType::Death),
    // Standalone tiles
    sprite(2, 0, TileType::Jump),
    hidden(TileType::Blocking),
    hidden(TileType::Death),
];

impl TileId {
    pub const TRANSPARENT_LIGHT: TileId = TileId(0);
    pub const TRANSPARENT_DARK: TileId = TileId(1);
    pub const BACKGROUND: TileId = TileId(2);
    pub const BOUNCE_PAD: TileId = TileId(29);
    pub const INVISIBLE_WALL: TileId = TileId(30);
    pub const KILL_PLANE: TileId = TileId(31);

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn definition(self) -> &'static TileDefinition {
        // In range by construction.
        &CATALOG[self.0 as usize]
    }

    pub fn tile_type(self) -> TileType {
        self.definition().tile_type
    }
}

impl TryFrom<u16> for TileId {
    type Error = CoreError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        if (raw as usize) < CATALOG.len() {
            Ok(TileId(raw))
        } else {
            Err(CoreError::UnknownTile(raw))
        }
    }
}

impl From<TileId> for u16 {
    fn from(id: TileId) -> Self {
        id.0
    }
}

/// The full catalog, in id order.
pub fn catalog() -> &'static [TileDefinition] {
    &CATALOG
}

/// Classify an optional cell. Empty cells are `TileType::None`.
pub fn classify(cell: Option<TileId>) -> TileType {
    cell.map_or(TileType::None, TileId::tile_type)
}

/// A set of 13 tiles covering every edge and corner position of a filled
/// rectangular region. The auto-tiler picks a member per cell from the
/// cell's 8-neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBox {
    pub name: &'static str,
    pub fill: TileId,
    pub top: TileId,
    pub bottom: TileId,
    pub left: TileId,
    pub right: TileId,
    pub corner_top_left: TileId,
    pub corner_top_right: TileId,
    pub corner_bottom_left: TileId,
    pub corner_bottom_right: TileId,
    pub corner_inner_top_left: TileId,
    pub corner_inner_top_right: TileId,
    pub corner_inner_bottom_left: TileId,
    pub corner_inner_bottom_right: TileId,
}

const fn box_from(name: &'static str, first: u16) -> TileBox {
    TileBox {
        name,
        fill: TileId(first),
        top: TileId(first + 1),
        bottom: TileId(first + 2),
        left: TileId(first + 3),
        right: TileId(first + 4),
        corner_top_left: TileId(first + 5),
        corner_top_right: TileId(first + 6),
        corner_bottom_left: TileId(first + 7),
        corner_bottom_right: TileId(first + 8),
        corner_inner_top_left: TileId(first + 9),
        corner_inner_top_right: TileId(first + 10),
        corner_inner_bottom_left: TileId(first + 11),
        corner_inner_bottom_right: TileId(first + 12),
    }
}

pub static DEFAULT_BOX: TileBox = box_from("default", 3);
pub static HAZARD_BOX: TileBox = box_from("hazard", 16);

/// Every box tile-set in the catalog.
pub static BOXES: [&TileBox; 2] = [&DEFAULT_BOX, &HAZARD_BOX];

impl TileBox {
    /// Look up a box tile-set by name.
    pub fn by_name(name: &str) -> Option<&'static TileBox> {
        BOXES.iter().copied().find(|b| b.name == name)
    }

    pub fn members(&self) -> [TileId; 13] {
        [
            self.fill,
            self.top,
            self.bottom,
            self.left,
            self.right,
            self.corner_top_left,
            self.corner_top_right,
            self.corner_bottom_left,
            self.corner_bottom_right,
            self.corner_inner_top_left,
            self.corner_inner_top_right,
            self.corner_inner_bottom_left,
            self.corner_inner_bottom_right,
        ]
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.members().contains(&id)
    }

    /// Pick the variant for a member cell. `is_member(dx, dy)` reports whether
    /// the neighbour at that offset belongs to this box (y grows downward).
    ///
    /// Horizontal edges win over vertical ones, and inner corners are only
    /// considered for cells whose four direct neighbours are all members.
    pub fn select_variant(&self, is_member: impl Fn(i64, i64) -> bool) -> TileId {
        let left = is_member(-1, 0);
        let right = is_member(1, 0);
        let up = is_member(0, -1);
        let down = is_member(0, 1);

        if !left {
            if !up {
                self.corner_top_left
            } else if !down {
                self.corner_bottom_left
            } else {
                self.left
            }
        } else if !right {
            if !up {
                self.corner_top_right
            } else if !down {
                self.corner_bottom_right
            } else {
                self.right
            }
        } else if !up {
            self.top
        } else if !down {
            self.bottom
        } else if !is_member(-1, -1) {
            self.corner_inner_top_left
        } else if !is_member(1, -1) {
            self.corner_inner_top_right
        } else if !is_member(-1, 1) {
            self.corner_inner_bottom_left
        } else if !is_member(1, 1) {
            self.corner_inner_bottom_right
        } else {
            self.fill
        }
    }
}
