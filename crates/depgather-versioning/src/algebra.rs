//! Set operations over version ranges used for incremental source queries:
//! subset tests, union envelopes and the "still needed" part of a request.

use std::cmp::Ordering;

use crate::range::VersionRange;
use crate::version::{Version, VersionComparison};

impl VersionRange {
    /// `true` if the bounds of `self` lie within the bounds of `superset`
    /// and `superset` admits prereleases whenever `self` does.
    ///
    /// Only bounds and prerelease flags are compared. A stable range also
    /// accepts a prerelease sitting on one of its bounds (see
    /// [`VersionRange::satisfies`]), and such edge prereleases are not taken
    /// into account here: `[1.0, 2.0)` is a subset of `[1.0, 3.0]` even
    /// though only the former accepts `2.0.0-beta`.
    pub fn is_subset_or_equal_to(&self, superset: &VersionRange) -> bool {
        self.is_subset_or_equal_to_with(superset, VersionComparison::VersionRelease)
    }

    pub fn is_subset_or_equal_to_with(
        &self,
        superset: &VersionRange,
        comparison: VersionComparison,
    ) -> bool {
        if self.is_empty() {
            return true;
        }
        if superset.is_empty() {
            return false;
        }
        if self.include_prerelease() && !superset.include_prerelease() {
            return false;
        }

        let lower_ok = match self.min_version() {
            Some(min) => {
                superset.bounds_contain(min, comparison)
                    // both exclude the same boundary value
                    || (!self.is_min_inclusive()
                        && !superset.is_min_inclusive()
                        && superset
                            .min_version()
                            .is_some_and(|s| comparison.equals(min, s)))
            }
            None => !superset.has_lower_bound(),
        };
        let upper_ok = match self.max_version() {
            Some(max) => {
                superset.bounds_contain(max, comparison)
                    || (!self.is_max_inclusive()
                        && !superset.is_max_inclusive()
                        && superset
                            .max_version()
                            .is_some_and(|s| comparison.equals(max, s)))
            }
            None => !superset.has_upper_bound(),
        };
        lower_ok && upper_ok
    }

    /// The union envelope of `ranges`: lowest lower bound, highest upper
    /// bound, prerelease inclusion if any input includes it.
    ///
    /// Empty inputs are skipped; with no non-empty input the result is
    /// [`VersionRange::none`]. Floats are not carried over.
    pub fn combine<'a, I>(ranges: I) -> VersionRange
    where
        I: IntoIterator<Item = &'a VersionRange>,
    {
        Self::combine_with(ranges, VersionComparison::VersionRelease)
    }

    pub fn combine_with<'a, I>(ranges: I, comparison: VersionComparison) -> VersionRange
    where
        I: IntoIterator<Item = &'a VersionRange>,
    {
        let mut ranges = ranges.into_iter().filter(|r| !r.is_empty());
        let Some(first) = ranges.next() else {
            return VersionRange::none();
        };

        let mut lowest = first.min_version().cloned();
        let mut include_lowest = lowest.is_some() && first.is_min_inclusive();
        let mut highest = first.max_version().cloned();
        let mut include_highest = highest.is_some() && first.is_max_inclusive();
        let mut include_prerelease = first.include_prerelease();

        for range in ranges {
            include_prerelease |= range.include_prerelease();

            // once a side is unbounded it stays unbounded
            if let Some(ref low) = lowest {
                match range.min_version() {
                    Some(min) => match comparison.compare(min, low) {
                        Ordering::Less => {
                            lowest = Some(min.clone());
                            include_lowest = range.is_min_inclusive();
                        }
                        Ordering::Equal => include_lowest |= range.is_min_inclusive(),
                        Ordering::Greater => {}
                    },
                    None => {
                        lowest = None;
                        include_lowest = false;
                    }
                }
            }

            if let Some(ref high) = highest {
                match range.max_version() {
                    Some(max) => match comparison.compare(max, high) {
                        Ordering::Greater => {
                            highest = Some(max.clone());
                            include_highest = range.is_max_inclusive();
                        }
                        Ordering::Equal => include_highest |= range.is_max_inclusive(),
                        Ordering::Less => {}
                    },
                    None => {
                        highest = None;
                        include_highest = false;
                    }
                }
            }
        }

        // Unbounded on both sides is "everything", never the empty sentinel.
        let combined = if lowest.is_none() && highest.is_none() {
            VersionRange::all()
        } else {
            VersionRange::new(lowest, include_lowest, highest, include_highest)
        };
        let include_prerelease = include_prerelease || combined.include_prerelease();
        combined.with_include_prerelease(include_prerelease)
    }

    /// The part of `requested` not covered by `already_searched`.
    ///
    /// Returns [`VersionRange::none`] when nothing is needed. Only a single
    /// uncovered edge is ever carved out; other partial overlaps fall back to
    /// the union of both ranges, which over-fetches but never under-fetches.
    pub fn needed_range(
        already_searched: Option<&VersionRange>,
        requested: &VersionRange,
    ) -> VersionRange {
        let Some(searched) = already_searched.filter(|r| !r.is_empty()) else {
            return requested.clone();
        };
        if requested.is_subset_or_equal_to(searched) {
            return VersionRange::none();
        }
        // Prerelease versions anywhere in the request may be missing.
        if requested.include_prerelease() && !searched.include_prerelease() {
            return requested.clone();
        }
        if searched.is_subset_or_equal_to(requested) {
            return requested.clone();
        }

        let comparison = VersionComparison::VersionRelease;

        // searched covers the low end of the request
        if let (Some(req_min), Some(searched_max)) =
            (requested.min_version(), searched.max_version())
        {
            if searched.bounds_contain(req_min, comparison) {
                return edge(
                    Some(searched_max),
                    !searched.is_max_inclusive(),
                    requested.max_version(),
                    requested.is_max_inclusive(),
                    requested,
                );
            }
        }

        // searched covers the high end of the request
        if let (Some(req_max), Some(searched_min)) =
            (requested.max_version(), searched.min_version())
        {
            if searched.bounds_contain(req_max, comparison) {
                return edge(
                    requested.min_version(),
                    requested.is_min_inclusive(),
                    Some(searched_min),
                    !searched.is_min_inclusive(),
                    requested,
                );
            }
        }

        VersionRange::combine([searched, requested])
    }
}

fn edge(
    min: Option<&Version>,
    min_inclusive: bool,
    max: Option<&Version>,
    max_inclusive: bool,
    requested: &VersionRange,
) -> VersionRange {
    let range = VersionRange::new(min.cloned(), min_inclusive, max.cloned(), max_inclusive);
    let include_prerelease = range.include_prerelease() || requested.include_prerelease();
    range.with_include_prerelease(include_prerelease)
}
