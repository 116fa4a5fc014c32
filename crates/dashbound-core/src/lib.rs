pub mod error;
pub mod input;
pub mod level;
pub mod tiles;

pub use error::CoreError;
pub use input::{BufferedInput, RawIntent};
pub use level::Level;
pub use tiles::{TileBox, TileId, TileType};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::level::Level;
    use crate::tiles::{DEFAULT_BOX, HAZARD_BOX, TileId};

    /// Build a level from ASCII rows (row 0 first).
    ///
    /// `.` empty, `b` background, `#` default box, `x` hazard box,
    /// `^` bounce pad, `w` invisible wall, `k` kill plane.
    pub fn level_from_ascii(rows: &[&str]) -> Level {
        let height = rows.len();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut columns = vec![vec![None; height]; width];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                columns[x][y] = match ch {
                    '.' | ' ' => None,
                    'b' => Some(TileId::BACKGROUND),
                    '#' => Some(DEFAULT_BOX.fill),
                    'x' => Some(HAZARD_BOX.fill),
                    '^' => Some(TileId::BOUNCE_PAD),
                    'w' => Some(TileId::INVISIBLE_WALL),
                    'k' => Some(TileId::KILL_PLANE),
                    other => panic!("unknown level char {other:?}"),
                };
            }
        }
        Level::from_columns(columns).expect("ascii level must be rectangular and non-empty")
    }

    /// Empty level with solid default-box rows from `floor_y` to the bottom.
    pub fn flat_floor_level(width: u32, height: u32, floor_y: u32) -> Level {
        let mut level =
            Level::empty(width, height).expect("flat floor level needs non-zero size");
        level.fill_box(&DEFAULT_BOX, 0, floor_y, width, height.saturating_sub(floor_y));
        level.auto_tile_box(&DEFAULT_BOX);
        level
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::tiles::TileType;

        #[test]
        fn ascii_builder_maps_chars() {
            let level = level_from_ascii(&["..^", "#xk"]);
            assert_eq!((level.width(), level.height()), (3, 2));
            assert_eq!(level.collision_type_at(2, 0), TileType::Jump);
            assert_eq!(level.collision_type_at(0, 1), TileType::Blocking);
            assert_eq!(level.collision_type_at(1, 1), TileType::Death);
            assert_eq!(level.collision_type_at(2, 1), TileType::Death);
        }

        #[test]
        fn flat_floor_rows_block() {
            let level = flat_floor_level(10, 12, 10);
            assert_eq!(level.collision_type_at(4, 9), TileType::None);
            assert_eq!(level.collision_type_at(4, 10), TileType::Blocking);
            assert_eq!(level.collision_type_at(4, 11), TileType::Blocking);
        }
    }
}
