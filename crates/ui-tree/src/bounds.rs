//! Pixel rectangles in the `[x1,y1][x2,y2]` dump format

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::BoundsError;

/// On-screen rectangle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Create bounds, rejecting inverted rectangles
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Result<Self, BoundsError> {
        if left > right || top > bottom {
            return Err(BoundsError::Inverted(format!(
                "[{},{}][{},{}]",
                left, top, right, bottom
            )));
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Largest absolute difference across the four edge coordinates.
    pub fn max_edge_deviation(&self, other: &Bounds) -> u32 {
        let edges = [
            (self.left, other.left),
            (self.top, other.top),
            (self.right, other.right),
            (self.bottom, other.bottom),
        ];
        edges
            .iter()
            .map(|(a, b)| (i64::from(*a) - i64::from(*b)).unsigned_abs())
            .max()
            .map(|deviation| u32::try_from(deviation).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}][{},{}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl FromStr for Bounds {
    type Err = BoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BoundsError::Format(s.to_string());
        let body = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(invalid)?;

        let (first, second) = body.split_once("][").ok_or_else(invalid)?;
        let (left, top) = parse_pair(first).ok_or_else(invalid)?;
        let (right, bottom) = parse_pair(second).ok_or_else(invalid)?;
        Bounds::new(left, top, right, bottom)
    }
}

fn parse_pair(pair: &str) -> Option<(i32, i32)> {
    let (x, y) = pair.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let bounds: Bounds = "[0,120][1080,240]".parse().unwrap();
        assert_eq!(bounds.left, 0);
        assert_eq!(bounds.bottom, 240);
        assert_eq!(bounds.width(), 1080);
        assert_eq!(bounds.height(), 120);
        assert_eq!(bounds.to_string(), "[0,120][1080,240]");
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let bounds: Bounds = " [ 5, 2 ][105 ,42] ".parse().unwrap();
        assert_eq!(bounds, Bounds::new(5, 2, 105, 42).unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            "".parse::<Bounds>(),
            Err(BoundsError::Format(_))
        ));
        assert!(matches!(
            "[0,0][10]".parse::<Bounds>(),
            Err(BoundsError::Format(_))
        ));
        assert!(matches!(
            "[0,0][a,10]".parse::<Bounds>(),
            Err(BoundsError::Format(_))
        ));
        assert!(matches!(
            "[50,0][10,10]".parse::<Bounds>(),
            Err(BoundsError::Inverted(_))
        ));
    }

    #[test]
    fn test_max_edge_deviation() {
        let a = Bounds::new(0, 0, 100, 40).unwrap();
        let b = Bounds::new(5, 2, 105, 42).unwrap();
        assert_eq!(a.max_edge_deviation(&b), 5);
        assert_eq!(b.max_edge_deviation(&a), 5);
        assert_eq!(a.max_edge_deviation(&a), 0);
    }

    #[test]
    fn test_center_and_contains() {
        let bounds = Bounds::new(100, 200, 300, 250).unwrap();
        assert_eq!(bounds.center(), (200, 225));
        assert!(bounds.contains_point(100, 200));
        assert!(!bounds.contains_point(99, 200));
    }
}
