use crate::error::CoreError;
use crate::region::{Component, Junction, JunctionKind, Region};

/// An ordered interleaving of regions and junctions describing either a
/// single alignment segment, a single annotated transcript variant, or a
/// union of either.
#[derive(Debug, Clone)]
pub struct SpliceList {
    identifier: String,
    components: Vec<Component>,
    regions: Vec<Region>,
    junctions: Vec<Junction>,
}

impl SpliceList {
    /// Builds a `SpliceList` from a set of exon (start, stop) pairs, sorting
    /// them by start position and rejecting any pair of exons that overlap
    /// or touch. `set_left_junction`/`set_right_junction` control whether the
    /// outermost start/end junctions are eligible to carry a complement
    /// (soft-clip edges of an alignment segment, or the open ends of an
    /// annotated transcript that should pair across introns).
    pub fn from_exons(
        identifier: impl Into<String>,
        exons: &[(i64, i64)],
        set_left_junction: bool,
        set_right_junction: bool,
    ) -> Result<Self, CoreError> {
        let identifier = identifier.into();
        let mut exons: Vec<(i64, i64)> = exons.to_vec();
        exons.sort_by_key(|e| e.0);

        for w in exons.windows(2) {
            if w[0].1 >= w[1].0 {
                return Err(CoreError::OverlappingExons {
                    identifier,
                    left: w[0],
                    right: w[1],
                });
            }
        }

        let mut components = Vec::with_capacity(3 * exons.len());
        let last_idx = exons.len().saturating_sub(1);
        for (idx, &(start, stop)) in exons.iter().enumerate() {
            let is_first = idx == 0;
            let is_last = idx == last_idx;
            components.push(Component::Junction(Junction::new(
                start,
                JunctionKind::Start,
                is_first && set_left_junction,
            )));
            components.push(Component::Region(Region::new(start, stop)));
            components.push(Component::Junction(Junction::new(
                stop,
                JunctionKind::End,
                is_last && set_right_junction,
            )));
        }

        if !set_left_junction && !components.is_empty() {
            components.remove(0);
        }
        if !set_right_junction && !components.is_empty() {
            components.pop();
        }

        Ok(Self::from_components(identifier, components))
    }

    fn from_components(identifier: String, components: Vec<Component>) -> Self {
        let regions = components
            .iter()
            .filter_map(|c| match c {
                Component::Region(r) => Some(*r),
                _ => None,
            })
            .collect();
        let junctions = components
            .iter()
            .filter_map(|c| match c {
                Component::Junction(j) => Some(j.clone()),
                _ => None,
            })
            .collect();
        SpliceList {
            identifier,
            components,
            regions,
            junctions,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    /// Whether `other` could plausibly have been produced by `self`: every
    /// region of `other` is covered by `self`'s regions within `tolerance`
    /// total overhang, every junction of `other` matches some junction of
    /// `self` of the same kind within `tolerance`, and any pair of matched
    /// junctions that are themselves complements land on adjacent indices
    /// in `self` (ruling out a read that skips an exon `self` does not).
    pub fn contains(&self, other: &SpliceList, tolerance: i64) -> bool {
        let merged_self = merge_regions(&self.regions);
        for region in &other.regions {
            for (gap_start, gap_stop) in uncovered_subintervals(*region, &merged_self) {
                if gap_stop - gap_start + 1 > tolerance {
                    return false;
                }
            }
        }

        let mut match_order = Vec::new();
        for j in &other.junctions {
            let mut matched_idx = None;
            for (i, sj) in self.junctions.iter().enumerate() {
                if sj.kind() == j.kind() && (sj.position() - j.position()).abs() <= tolerance {
                    matched_idx = Some(i);
                }
            }
            let Some(idx) = matched_idx else {
                return false;
            };
            if j.complement().is_some() {
                match_order.push(idx);
            }
        }

        for pair in match_order.chunks(2) {
            if pair.len() == 2 && (pair[0] as i64 - pair[1] as i64).abs() > 1 {
                return false;
            }
        }

        true
    }

    /// Merges two splice lists into one spanning both: regions are unioned
    /// (adjacent/overlapping regions coalesce), and junctions are unioned by
    /// object identity with any junction now interior to a merged region
    /// dropped. Junction objects are never copied, so complement links set
    /// up during transcript assembly survive the merge.
    pub fn union(a: &SpliceList, b: &SpliceList) -> SpliceList {
        let identifier = if a.identifier == b.identifier {
            a.identifier.clone()
        } else {
            format!("{},{}", a.identifier, b.identifier)
        };

        let all_regions: Vec<Region> = a.regions.iter().chain(b.regions.iter()).cloned().collect();
        let merged = merge_regions(&all_regions);

        let mut junctions: Vec<Junction> = Vec::new();
        for j in a.junctions.iter().chain(b.junctions.iter()) {
            if !junctions.iter().any(|existing| Junction::ptr_eq(existing, j)) {
                junctions.push(j.clone());
            }
        }

        let kept_junctions: Vec<Junction> = junctions
            .into_iter()
            .filter(|j| {
                let interior_pos = match j.kind() {
                    JunctionKind::Start => j.position() - 1,
                    JunctionKind::End => j.position() + 1,
                };
                !position_covered(interior_pos, &merged)
            })
            .collect();

        let mut components: Vec<Component> =
            merged.iter().map(|r| Component::Region(*r)).collect();
        components.extend(kept_junctions.into_iter().map(Component::Junction));
        components.sort_by_key(|c| (c.position(), c.tie_rank()));

        Self::from_components(identifier, components)
    }

    /// Left-folds `union` across `rest`, starting from `first`.
    pub fn union_all(first: &SpliceList, rest: &[SpliceList]) -> SpliceList {
        rest.iter().fold(first.clone(), |acc, sl| Self::union(&acc, sl))
    }
}

fn merge_regions(regions: &[Region]) -> Vec<Region> {
    let mut rs: Vec<Region> = regions.to_vec();
    rs.sort_by_key(|r| r.start);
    let mut merged: Vec<Region> = Vec::with_capacity(rs.len());
    for r in rs {
        if let Some(last) = merged.last_mut() {
            if r.start <= last.stop + 1 {
                if r.stop > last.stop {
                    last.stop = r.stop;
                }
                continue;
            }
        }
        merged.push(r);
    }
    merged
}

fn position_covered(pos: i64, merged_sorted: &[Region]) -> bool {
    merged_sorted
        .iter()
        .any(|r| r.start <= pos && pos <= r.stop)
}

/// Returns the subintervals of `region` not covered by `merged` (sorted,
/// disjoint, non-touching regions), via an interval sweep rather than a
/// materialized position set.
fn uncovered_subintervals(region: Region, merged: &[Region]) -> Vec<(i64, i64)> {
    let mut gaps = Vec::new();
    let mut cursor = region.start;
    for m in merged {
        if m.stop < region.start {
            continue;
        }
        if m.start > region.stop {
            break;
        }
        let overlap_start = m.start.max(region.start);
        let overlap_stop = m.stop.min(region.stop);
        if cursor < overlap_start {
            gaps.push((cursor, overlap_start - 1));
        }
        cursor = cursor.max(overlap_stop + 1);
        if cursor > region.stop {
            break;
        }
    }
    if cursor <= region.stop {
        gaps.push((cursor, region.stop));
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_exons_rejects_overlap() {
        let err = SpliceList::from_exons("t", &[(1, 10), (10, 20)], true, true).unwrap_err();
        assert!(matches!(err, CoreError::OverlappingExons { .. }));
    }

    #[test]
    fn from_exons_component_count() {
        let sl = SpliceList::from_exons("t", &[(1, 10), (21, 30)], true, true).unwrap();
        assert_eq!(sl.components().len(), 3 * 2);
        let sl = SpliceList::from_exons("t", &[(1, 10), (21, 30)], false, false).unwrap();
        assert_eq!(sl.components().len(), 3 * 2 - 2);
    }

    #[test]
    fn single_exon_no_junctions_is_one_region() {
        let sl = SpliceList::from_exons("t", &[(1, 10)], false, false).unwrap();
        assert_eq!(sl.components().len(), 1);
        assert_eq!(sl.regions().len(), 1);
        assert_eq!(sl.junctions().len(), 0);
    }

    #[test]
    fn contains_is_reflexive_within_zero_tolerance() {
        let sl = SpliceList::from_exons("t", &[(1, 10), (21, 30)], true, true).unwrap();
        assert!(sl.contains(&sl.clone(), 0));
    }

    #[test]
    fn contains_fails_on_uncovered_overhang() {
        let reference = SpliceList::from_exons("ref", &[(100, 200)], true, true).unwrap();
        let read = SpliceList::from_exons("r", &[(90, 200)], true, true).unwrap();
        assert!(!reference.contains(&read, 5));
        assert!(reference.contains(&read, 10));
    }

    #[test]
    fn contains_rejects_skipped_exon_via_complement_adjacency() {
        // self = a variant that splices exon 1 directly to exon 3.
        let skip_variant = SpliceList::from_exons("skip", &[(100, 200), (500, 600)], true, true).unwrap();
        // self = a variant that also carries the exon in between.
        let include_variant =
            SpliceList::from_exons("include", &[(100, 200), (300, 400), (500, 600)], true, true).unwrap();

        // other = two independently-built segments whose facing edges are
        // wired as complements, exactly as Transcript::from_sam_lines would
        // wire a read pair's soft-clipped ends.
        let mate1 = SpliceList::from_exons("r/1", &[(100, 199)], false, true).unwrap();
        let mate2 = SpliceList::from_exons("r/2", &[(500, 599)], true, false).unwrap();
        let right_edge = mate1.junctions().last().unwrap();
        let left_edge = &mate2.junctions()[0];
        right_edge.set_complement(left_edge);
        left_edge.set_complement(right_edge);
        let query = SpliceList::union(&mate1, &mate2);

        assert!(skip_variant.contains(&query, 20));
        assert!(!include_variant.contains(&query, 20));
    }

    #[test]
    fn contains_ignores_complement_eligible_but_unwired_junction() {
        let variant = SpliceList::from_exons("v", &[(100, 200), (500, 600)], true, true).unwrap();
        // A lone segment's soft-clip edge is complement-eligible but never
        // actually paired with another segment, so its `complement()` stays
        // `None` and it must not be forced into the adjacency check.
        let lone = SpliceList::from_exons("r", &[(100, 199)], false, true).unwrap();
        let edge = lone.junctions().last().unwrap();
        assert!(edge.has_complement());
        assert!(edge.complement().is_none());

        assert!(variant.contains(&lone, 20));
    }

    #[test]
    fn union_merges_overlapping_regions() {
        let a = SpliceList::from_exons("a", &[(1, 10)], false, false).unwrap();
        let b = SpliceList::from_exons("b", &[(5, 20)], false, false).unwrap();
        let u = SpliceList::union(&a, &b);
        assert_eq!(u.regions(), &[Region::new(1, 20)]);
    }

    #[test]
    fn union_preserves_junction_identity() {
        let a = SpliceList::from_exons("a", &[(1, 10), (21, 30)], true, true).unwrap();
        let b = SpliceList::from_exons("b", &[(1, 10), (21, 30)], true, true).unwrap();
        let a_junction = a.junctions()[0].clone();
        let u = SpliceList::union(&a, &b);
        assert!(u.junctions().iter().any(|j| Junction::ptr_eq(j, &a_junction)));
    }
}
