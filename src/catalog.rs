//! Built-in pattern catalog and the read-only lookup API over it.
//!
//! The table is materialized once at startup and shared through `AppState`;
//! nothing here mutates after construction.

use crate::domain::{Category, Difficulty, PatternRecord};

const DEFAULT_LIST_LIMIT: usize = 50;

macro_rules! pattern {
    ($id:expr, $name:expr, $cat:expr, $diff:expr, $desc:expr, [$($row:expr),* $(,)?], $rows:expr, $pop:expr, $rate:expr, $formula:expr, $loops:expr, $conds:expr) => {
        PatternRecord {
            id: $id,
            name: $name.to_string(),
            category: $cat,
            difficulty: $diff,
            description: $desc.to_string(),
            preview: vec![$($row.to_string()),*],
            rows: $rows,
            popularity: $pop,
            completion_rate: $rate,
            formula: $formula.to_string(),
            loops: $loops,
            conditions: $conds,
        }
    };
}

/// Literal table served by the API. Ids are unique; order is the lookup order.
pub fn builtin_patterns() -> Vec<PatternRecord> {
    use Category::*;
    use Difficulty::*;
    vec![
        pattern!(1, "Square Pattern (Solid)", BasicStar, Easy, "A solid square filled with stars",
            ["****", "****", "****", "****"], 4, 95, 92, "stars = n, spaces = 0", 2, 0),
        pattern!(2, "Right Triangle Pattern", BasicStar, Easy, "Stars forming a right triangle",
            ["*", "**", "***", "****"], 4, 98, 95, "stars = i, spaces = 0", 2, 0),
        pattern!(3, "Left Triangle Pattern", BasicStar, Easy, "Stars aligned to the left forming triangle",
            ["   *", "  **", " ***", "****"], 4, 87, 89, "stars = i, spaces = n-i", 2, 0),
        pattern!(4, "Inverted Right Triangle", BasicStar, Easy, "Upside-down right triangle",
            ["****", "***", "**", "*"], 4, 85, 88, "stars = n-i+1, spaces = 0", 2, 0),
        pattern!(5, "Isosceles Triangle", BasicStar, Easy, "Centered triangle with equal sides",
            ["  *  ", " *** ", "*****"], 3, 91, 90, "stars = 2*i+1, spaces = n-i-1", 2, 0),
        pattern!(11, "Hollow Square", Hollow, Medium, "Square with hollow interior",
            ["****", "*  *", "*  *", "****"], 4, 84, 76,
            "stars = n (if first/last row/col), spaces = n-2 (middle)", 2, 4),
        pattern!(31, "Diamond Pattern (Solid)", Diamond, Medium, "Solid diamond shape",
            ["  *  ", " *** ", "*****", " *** ", "  *  "], 5, 89, 82,
            "stars = 2*i+1 (upper), 2*(n-i-1)+1 (lower), spaces = n-i-1", 2, 1),
        pattern!(32, "Hollow Diamond", Diamond, Medium, "Diamond with hollow center",
            ["  *  ", " * * ", "*   *", " * * ", "  *  "], 5, 85, 76,
            "stars = 1 (if first/last), spaces = n-i-1 + i-1 (middle)", 2, 4),
        pattern!(41, "Number Triangle (1,2,3...)", Number, Easy, "Triangle with sequential numbers",
            ["1", "12", "123", "1234"], 4, 92, 88, "numbers = 1 to i", 2, 0),
        pattern!(66, "Butterfly Pattern", Special, Hard, "Butterfly wing pattern",
            ["*    *", "**  **", "******", "**  **", "*    *"], 5, 91, 67,
            "stars = i+1 (left), 2*(n-i-1) (right), spaces = 2*(n-i-1)", 2, 2),
        pattern!(69, "X Pattern (Cross)", Special, Medium, "X or cross pattern",
            ["*   *", " * * ", "  *  ", " * * ", "*   *"], 5, 86, 78,
            "stars = 1 (if i==j or i+j==n-1)", 2, 2),
    ]
}

/// Optional filters accepted by `GET /patterns`.
#[derive(Clone, Debug, Default)]
pub struct PatternFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub limit: Option<usize>,
}

/// Immutable pattern table.
#[derive(Clone, Debug)]
pub struct Catalog {
    patterns: Vec<PatternRecord>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(builtin_patterns())
    }
}

impl Catalog {
    pub fn new(patterns: Vec<PatternRecord>) -> Self {
        Self { patterns }
    }

    pub fn all(&self) -> &[PatternRecord] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn lookup_id(&self, id: u32) -> Option<&PatternRecord> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// Case-insensitive exact match first, then the first row whose name
    /// contains `name`. Blank input never matches.
    pub fn lookup_name(&self, name: &str) -> Option<&PatternRecord> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.patterns
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
            .or_else(|| {
                self.patterns
                    .iter()
                    .find(|p| p.name.to_lowercase().contains(&needle))
            })
    }

    pub fn list(&self, filter: &PatternFilter) -> Vec<PatternRecord> {
        let category = filter.category.as_deref().map(str::to_lowercase);
        let difficulty = filter.difficulty.as_deref().map(str::to_lowercase);
        self.patterns
            .iter()
            .filter(|p| category.as_deref().map_or(true, |c| p.category.as_str() == c))
            .filter(|p| difficulty.as_deref().map_or(true, |d| p.difficulty.as_str() == d))
            .take(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .cloned()
            .collect()
    }
}

/// Rough 0..1 difficulty weight for a pattern.
pub fn complexity_score(pattern: &PatternRecord) -> f32 {
    let base = match pattern.difficulty {
        Difficulty::Easy => 0.3,
        Difficulty::Medium => 0.6,
        Difficulty::Hard => 0.9,
    };
    let loops = pattern.loops as f32 * 0.1;
    let conditions = pattern.conditions as f32 * 0.05;
    (base + loops + conditions).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let catalog = Catalog::default();
        let ids: HashSet<u32> = catalog.all().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn every_pattern_round_trips_by_id() {
        let catalog = Catalog::default();
        for p in catalog.all() {
            assert_eq!(catalog.lookup_id(p.id), Some(p));
        }
        assert!(catalog.lookup_id(999).is_none());
    }

    #[test]
    fn every_pattern_is_found_by_name_in_any_case() {
        let catalog = Catalog::default();
        for p in catalog.all() {
            for query in [p.name.clone(), p.name.to_uppercase(), p.name.to_lowercase()] {
                let hit = catalog.lookup_name(&query).expect("name lookup");
                assert_eq!(hit.name.to_lowercase(), p.name.to_lowercase());
            }
        }
    }

    #[test]
    fn partial_name_returns_first_row_in_table_order() {
        let catalog = Catalog::default();
        // "Diamond Pattern (Solid)" precedes "Hollow Diamond".
        assert_eq!(catalog.lookup_name("diamond").map(|p| p.id), Some(31));
        assert_eq!(catalog.lookup_name("triangle").map(|p| p.id), Some(2));
    }

    #[test]
    fn unknown_or_blank_name_is_not_found() {
        let catalog = Catalog::default();
        assert!(catalog.lookup_name("Invalid Pattern").is_none());
        assert!(catalog.lookup_name("   ").is_none());
    }

    #[test]
    fn list_applies_filters_and_limit() {
        let catalog = Catalog::default();
        let diamonds = catalog.list(&PatternFilter {
            category: Some("diamond".into()),
            ..Default::default()
        });
        assert_eq!(diamonds.iter().map(|p| p.id).collect::<Vec<_>>(), vec![31, 32]);

        let medium = catalog.list(&PatternFilter {
            difficulty: Some("MEDIUM".into()),
            limit: Some(2),
            ..Default::default()
        });
        assert_eq!(medium.len(), 2);
        assert!(medium.iter().all(|p| p.difficulty == Difficulty::Medium));

        assert_eq!(catalog.list(&PatternFilter::default()).len(), catalog.len());
    }

    #[test]
    fn complexity_score_is_clipped() {
        let catalog = Catalog::default();
        let square = catalog.lookup_id(1).expect("square");
        assert!((complexity_score(square) - 0.5).abs() < 1e-6);
        let butterfly = catalog.lookup_id(66).expect("butterfly");
        assert!((complexity_score(butterfly) - 1.0).abs() < 1e-6);
    }
}
