/// Knobs controlling how rule text is normalized while parsing.
///
/// The defaults match how rule strings have always been accepted:
/// adjacent parenthesized groups are joined with `AND` and connective
/// keywords must be upper-case.
///
/// # Example
///
/// ```
/// use ruletree::{parse_rule_with, ParseOptions};
///
/// let options = ParseOptions::new().case_insensitive_keywords(true);
/// let root = parse_rule_with("age > 30 and salary > 50000", &options).unwrap();
/// assert_eq!(root.comparison_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    join_adjacent_groups: bool,
    case_insensitive_keywords: bool,
    max_group_depth: usize,
}

/// Default limit on nested parenthesized groups.
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 64;

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            join_adjacent_groups: true,
            case_insensitive_keywords: false,
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `(a) (b)` as `(a) AND (b)`. Enabled by default.
    ///
    /// When disabled, two groups with nothing between them are a syntax error.
    #[must_use]
    pub fn join_adjacent_groups(mut self, enabled: bool) -> Self {
        self.join_adjacent_groups = enabled;
        self
    }

    /// Accept `and`/`or` (any case) in addition to `AND`/`OR`. Disabled by default.
    #[must_use]
    pub fn case_insensitive_keywords(mut self, enabled: bool) -> Self {
        self.case_insensitive_keywords = enabled;
        self
    }

    /// Reject rules whose parentheses nest deeper than `depth`.
    ///
    /// Each group level costs parser stack, so raise this with care. Long
    /// flat chains such as `a == 1 AND b == 2 AND ...` are not affected.
    #[must_use]
    pub fn max_group_depth(mut self, depth: usize) -> Self {
        self.max_group_depth = depth;
        self
    }

    #[must_use]
    pub fn joins_adjacent_groups(&self) -> bool {
        self.join_adjacent_groups
    }

    #[must_use]
    pub fn keywords_case_insensitive(&self) -> bool {
        self.case_insensitive_keywords
    }

    #[must_use]
    pub fn group_depth_limit(&self) -> usize {
        self.max_group_depth
    }
}
