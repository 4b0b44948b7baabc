//! Coarse obstacle classification from bounding-box dimensions alone.
//!
//! Rules are evaluated in table order and the first match wins; the ranges
//! overlap, so the order is part of the behaviour.

use crate::geometry::BoundingBox;

/// Coarse obstacle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Wall,
    Floor,
    Ceiling,
    Table,
    Seat,
    Window,
    Door,
    Unknown,
    /// No geometry has been observed for the anchor yet.
    None,
}

impl Category {
    /// Spoken/display label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Wall => "Wall",
            Category::Floor => "Floor",
            Category::Ceiling => "Ceiling",
            Category::Table => "Table",
            Category::Seat => "Chair or seat",
            Category::Window => "Window",
            Category::Door => "Door",
            Category::Unknown | Category::None => "Obstacle",
        }
    }

    /// Parse a scan-source surface label (`"door"`, `"window"`, ...).
    pub fn from_surface(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wall" => Some(Category::Wall),
            "floor" => Some(Category::Floor),
            "ceiling" => Some(Category::Ceiling),
            "table" => Some(Category::Table),
            "seat" | "chair" => Some(Category::Seat),
            "window" => Some(Category::Window),
            "door" => Some(Category::Door),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Wall => "wall",
            Category::Floor => "floor",
            Category::Ceiling => "ceiling",
            Category::Table => "table",
            Category::Seat => "seat",
            Category::Window => "window",
            Category::Door => "door",
            Category::Unknown => "unknown",
            Category::None => "none",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

struct Rule {
    category: Category,
    matches: fn(&BoundingBox) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        category: Category::Wall,
        matches: |b| b.width() > 2.0 && b.height() > 2.0 && b.depth() < 0.5,
    },
    Rule {
        category: Category::Floor,
        matches: |b| b.width() > 1.0 && b.height() < 0.2,
    },
    // Shadowed by the floor rule: every box that satisfies it already
    // satisfied the one above. Kept in place so results stay stable for
    // existing recordings; a fix must swap the two rules and say so.
    Rule {
        category: Category::Ceiling,
        matches: |b| b.width() > 1.0 && b.height() < 0.2 && b.top_y() > 2.0,
    },
    Rule {
        category: Category::Table,
        matches: |b| {
            let h = b.height();
            h > 0.7 && h < 1.0 && b.width() > 0.5 && b.depth() > 0.5
        },
    },
    Rule {
        category: Category::Seat,
        matches: |b| {
            let h = b.height();
            h > 0.4 && h < 1.0 && b.width() < 0.8 && b.depth() < 0.8
        },
    },
];

/// Classify a bounding box. Degenerate boxes are always `Unknown`.
pub fn classify(bbox: &BoundingBox) -> Category {
    if bbox.is_degenerate() {
        return Category::Unknown;
    }
    RULES
        .iter()
        .find(|r| (r.matches)(bbox))
        .map_or(Category::Unknown, |r| r.category)
}

/// Classify, falling back to the scan source's own label when the
/// geometric rules find nothing.
pub fn classify_with_hint(bbox: &BoundingBox, surface: Option<Category>) -> Category {
    match classify(bbox) {
        Category::Unknown if !bbox.is_degenerate() => surface.unwrap_or(Category::Unknown),
        c => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Vec3};
    use rstest::rstest;

    #[rstest]
    #[case(2.2, 2.1, 0.3, Category::Wall)]
    #[case(3.0, 0.05, 3.0, Category::Floor)]
    #[case(1.2, 0.8, 0.7, Category::Table)]
    #[case(0.5, 0.9, 0.5, Category::Seat)]
    #[case(0.5, 0.45, 0.5, Category::Seat)]
    #[case(0.3, 1.8, 0.3, Category::Unknown)]
    #[case(2.2, 2.1, 0.6, Category::Unknown)]
    fn table_of_rules(#[case] w: f32, #[case] h: f32, #[case] d: f32, #[case] want: Category) {
        assert_eq!(classify(&BoundingBox::from_extents(w, h, d)), want);
    }

    #[test]
    fn table_wins_over_seat_when_both_match() {
        // 0.7 < h < 1.0, w in (0.5, 0.8), d in (0.5, 0.8): both rules match.
        let b = BoundingBox::from_extents(0.6, 0.8, 0.6);
        assert_eq!(classify(&b), Category::Table);
    }

    #[test]
    fn high_thin_slab_still_reads_as_floor() {
        let b = BoundingBox::new(Vec3::new(-1.5, 2.4, -1.5), Vec3::new(1.5, 2.5, 1.5));
        assert!(b.top_y() > 2.0);
        assert_eq!(classify(&b), Category::Floor);
    }

    #[test]
    fn degenerate_is_unknown_even_with_hint() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(classify(&b), Category::Unknown);
        assert_eq!(classify_with_hint(&b, Some(Category::Door)), Category::Unknown);
    }

    #[test]
    fn hint_only_fills_unknown() {
        let door = BoundingBox::from_extents(0.9, 2.0, 0.05);
        assert_eq!(classify_with_hint(&door, Some(Category::Door)), Category::Door);
        let wall = BoundingBox::from_extents(2.2, 2.1, 0.3);
        assert_eq!(classify_with_hint(&wall, Some(Category::Window)), Category::Wall);
    }

    #[test]
    fn labels() {
        assert_eq!(Category::Seat.label(), "Chair or seat");
        assert_eq!(Category::Unknown.label(), "Obstacle");
        assert_eq!(Category::None.label(), "Obstacle");
        assert_eq!(Category::from_surface(" Window "), Some(Category::Window));
        assert_eq!(Category::from_surface("lamp"), None);
    }
}
