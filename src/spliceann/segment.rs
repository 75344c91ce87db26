use std::str::FromStr;

use rust_htslib::bam::record::{Cigar, CigarString};

use crate::error::CoreError;
use crate::splice_list::SpliceList;

/// The ungapped reference regions and junction-eligibility flags implied by
/// a single SAM CIGAR string anchored at `pos`.
struct CigarRegions {
    regions: Vec<(i64, i64)>,
    set_left_junction: bool,
    set_right_junction: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunTag {
    Match,
    Skip,
    SoftClip,
}

/// Interprets a SAM CIGAR string into the reference regions a read
/// actually covers, absorbing short gaps (`skip_tolerance`) into the
/// surrounding match and dropping any remaining region shorter than
/// `map_tolerance`. A `*` CIGAR, or one that maps no region at all after
/// filtering, is reported as [`CoreError::NoMapping`].
fn regions_from_cigar(
    line: &str,
    cigar_str: &str,
    pos: i64,
    skip_tolerance: i64,
    map_tolerance: i64,
) -> Result<CigarRegions, CoreError> {
    if cigar_str == "*" {
        return Err(CoreError::NoMapping);
    }

    let cigar = CigarString::from_str(cigar_str)
        .map_err(|e| CoreError::malformed(format!("unreadable CIGAR string ({})", e), line))?;

    let mut tags: Vec<(RunTag, i64)> = Vec::with_capacity(cigar.len());
    for op in cigar.iter() {
        let tagged = match op {
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                Some((RunTag::Match, *len as i64))
            }
            Cigar::Del(len) | Cigar::RefSkip(len) => Some((RunTag::Skip, *len as i64)),
            Cigar::SoftClip(len) => Some((RunTag::SoftClip, *len as i64)),
            Cigar::Ins(_) | Cigar::HardClip(_) | Cigar::Pad(_) => None,
        };
        if let Some(t) = tagged {
            tags.push(t);
        }
    }

    let set_left_junction = matches!(tags.first(), Some((RunTag::SoftClip, len)) if *len > skip_tolerance);
    let set_right_junction = matches!(tags.last(), Some((RunTag::SoftClip, len)) if *len > skip_tolerance);

    let mut runs: Vec<(bool, i64)> = Vec::new();
    for (tag, len) in tags {
        if tag == RunTag::SoftClip {
            continue;
        }
        let is_match = tag == RunTag::Match;
        if let Some(last) = runs.last_mut() {
            if last.0 == is_match {
                last.1 += len;
                continue;
            }
        }
        runs.push((is_match, len));
    }

    let mut absorbed: Vec<(bool, i64)> = Vec::new();
    for (is_match, len) in runs {
        let is_match = is_match || len <= skip_tolerance;
        if let Some(last) = absorbed.last_mut() {
            if last.0 == is_match {
                last.1 += len;
                continue;
            }
        }
        absorbed.push((is_match, len));
    }

    let mut regions = Vec::new();
    let mut cursor = pos;
    for (is_match, len) in absorbed {
        if is_match {
            regions.push((cursor, cursor + len - 1));
        }
        cursor += len;
    }

    let filtered: Vec<(i64, i64)> = regions
        .into_iter()
        .filter(|(start, stop)| stop - start + 1 >= map_tolerance)
        .collect();

    if filtered.is_empty() {
        return Err(CoreError::NoMapping);
    }

    Ok(CigarRegions {
        regions: filtered,
        set_left_junction,
        set_right_junction,
    })
}

/// A single line of a SAM alignment, together with the splice structure
/// its CIGAR and POS columns imply.
pub struct Segment {
    raw_line: String,
    splice_list: SpliceList,
}

impl Segment {
    pub fn from_sam_line(
        line: &str,
        skip_tolerance: i64,
        map_tolerance: i64,
    ) -> Result<Self, CoreError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            return Err(CoreError::malformed("too few SAM columns", line));
        }
        let qname = fields[0];
        let pos: i64 = fields[3]
            .parse()
            .map_err(|_| CoreError::malformed("non-numeric POS", line))?;
        let cigar_str = fields[5];

        let cig = regions_from_cigar(line, cigar_str, pos, skip_tolerance, map_tolerance)?;
        let splice_list = SpliceList::from_exons(
            qname,
            &cig.regions,
            cig.set_left_junction,
            cig.set_right_junction,
        )?;

        Ok(Segment {
            raw_line: line.to_string(),
            splice_list,
        })
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    pub fn splice_list(&self) -> &SpliceList {
        &self.splice_list
    }

    pub fn qname(&self) -> &str {
        self.raw_line.split('\t').next().unwrap_or("")
    }

    pub fn flags(&self) -> u32 {
        self.raw_line
            .split('\t')
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// Appends a `TR:Z` tag listing the identifiers of every annotated
    /// transcript variant this segment's transcript could represent, or
    /// `*` if it represents none.
    pub fn apply_tag(&self, represents: &[String]) -> String {
        let value = if represents.is_empty() {
            "*".to_string()
        } else {
            represents.join(",")
        };
        format!("{}\tTR:Z:{}", self.raw_line, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_cigar_has_no_mapping() {
        let err = regions_from_cigar("line", "*", 1, 20, 10).unwrap_err();
        assert!(matches!(err, CoreError::NoMapping));
    }

    #[test]
    fn simple_match_maps_one_region() {
        let r = regions_from_cigar("line", "50M", 100, 20, 10).unwrap();
        assert_eq!(r.regions, vec![(100, 149)]);
        assert!(!r.set_left_junction);
        assert!(!r.set_right_junction);
    }

    #[test]
    fn spliced_read_maps_two_regions() {
        let r = regions_from_cigar("line", "30M500N20M", 100, 20, 10).unwrap();
        assert_eq!(r.regions, vec![(100, 129), (630, 649)]);
    }

    #[test]
    fn short_skip_is_absorbed_into_match() {
        let r = regions_from_cigar("line", "3M1I2D4M", 100, 2, 0).unwrap();
        assert_eq!(r.regions, vec![(100, 108)]);
    }

    #[test]
    fn long_soft_clip_sets_junction_eligibility() {
        let r = regions_from_cigar("line", "25S75M", 500, 20, 10).unwrap();
        assert!(r.set_left_junction);
        assert!(!r.set_right_junction);
    }

    #[test]
    fn short_region_dropped_by_map_tolerance() {
        let err = regions_from_cigar("line", "5M500N3M", 100, 20, 10).unwrap_err();
        assert!(matches!(err, CoreError::NoMapping));
    }

    #[test]
    fn unreadable_cigar_error_names_the_whole_line() {
        let line = "r1\t0\tchr1\t100\t255\t5Q\t*\t0\t0\tACGT\tIIII";
        let err = regions_from_cigar(line, "5Q", 100, 20, 10).unwrap_err();
        match err {
            CoreError::MalformedInput { line: reported, .. } => assert_eq!(reported, line),
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }
}
