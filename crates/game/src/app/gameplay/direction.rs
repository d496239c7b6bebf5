use std::f32::consts::FRAC_1_SQRT_2;

/// One of the eight compass directions an entity can face or move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Direction {
    Left,
    UpLeft,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
}

/// One of the four screen axes a direction can push along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Axis {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub(crate) const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::UpLeft => 1,
            Self::Up => 2,
            Self::UpRight => 3,
            Self::Right => 4,
            Self::DownRight => 5,
            Self::Down => 6,
            Self::DownLeft => 7,
        }
    }

    pub(crate) fn contains(self, axis: Axis) -> bool {
        match axis {
            Axis::Left => matches!(self, Self::Left | Self::UpLeft | Self::DownLeft),
            Axis::Right => matches!(self, Self::Right | Self::UpRight | Self::DownRight),
            Axis::Up => matches!(self, Self::Up | Self::UpLeft | Self::UpRight),
            Axis::Down => matches!(self, Self::Down | Self::DownLeft | Self::DownRight),
        }
    }

    /// Row of the player sprite sheet drawn for this facing.
    pub(crate) fn sprite_row(self) -> i32 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
            Self::UpLeft => 4,
            Self::UpRight => 5,
            Self::DownLeft => 6,
            Self::DownRight => 7,
        }
    }

    /// Unit-length heading in screen space (y grows downward).
    pub(crate) fn unit_vector(self) -> (f32, f32) {
        let d = FRAC_1_SQRT_2;
        match self {
            Self::Left => (-1.0, 0.0),
            Self::UpLeft => (-d, -d),
            Self::Up => (0.0, -1.0),
            Self::UpRight => (d, -d),
            Self::Right => (1.0, 0.0),
            Self::DownRight => (d, d),
            Self::Down => (0.0, 1.0),
            Self::DownLeft => (-d, d),
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::UpLeft => "up_left",
            Self::Up => "up",
            Self::UpRight => "up_right",
            Self::Right => "right",
            Self::DownRight => "down_right",
            Self::Down => "down",
            Self::DownLeft => "down_left",
        }
    }
}

impl Axis {
    pub(crate) const ALL: [Axis; 4] = [Axis::Left, Axis::Up, Axis::Right, Axis::Down];

    pub(crate) fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// -1 toward the origin, +1 away from it.
    pub(crate) fn sign(self) -> i32 {
        match self {
            Self::Left | Self::Up => -1,
            Self::Right | Self::Down => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_declaration_order() {
        for (expected, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), expected);
        }
    }

    #[test]
    fn diagonals_contain_both_axes() {
        assert!(Direction::UpLeft.contains(Axis::Up));
        assert!(Direction::UpLeft.contains(Axis::Left));
        assert!(!Direction::UpLeft.contains(Axis::Right));
        assert!(!Direction::Up.contains(Axis::Left));
    }

    #[test]
    fn sprite_rows_are_a_permutation() {
        let mut rows: Vec<i32> = Direction::ALL.iter().map(|d| d.sprite_row()).collect();
        rows.sort_unstable();
        assert_eq!(rows, (0..8).collect::<Vec<_>>());
        assert_eq!(Direction::Up.sprite_row(), 0);
        assert_eq!(Direction::DownRight.sprite_row(), 7);
    }

    #[test]
    fn unit_vectors_have_unit_length() {
        for direction in Direction::ALL {
            let (x, y) = direction.unit_vector();
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-5);
        }
    }
}
