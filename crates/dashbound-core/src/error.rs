/// Errors raised where tile ids or coordinates enter the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A tile id that has no entry in the catalog.
    UnknownTile(u16),
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    /// A level grid with no columns or no rows.
    EmptyGrid,
    /// A level grid whose columns differ in height.
    RaggedGrid {
        column: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTile(id) => write!(f, "unknown tile id: {id}"),
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "cell ({x}, {y}) is outside the {width}x{height} level"),
            Self::EmptyGrid => write!(f, "level grid must have at least one row and column"),
            Self::RaggedGrid {
                column,
                expected,
                found,
            } => write!(
                f,
                "column {column} has {found} cells, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for CoreError {}
