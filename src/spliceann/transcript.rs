use crate::error::CoreError;
use crate::region::Component;
use crate::segment::Segment;

/// The segments produced by a single read group (a mapped fragment, or one
/// end of a paired-end fragment chained through RNEXT), with complementary
/// junctions across segment boundaries wired together.
pub struct Transcript {
    segments: Vec<Segment>,
}

impl Transcript {
    /// Builds segments from each SAM line in `lines`, skipping (with a
    /// warning) any line whose CIGAR carries no mapping information. Lines
    /// that are merely malformed are a fatal error. A group that maps no
    /// segments at all is [`CoreError::NoMappedSegments`].
    pub fn from_sam_lines(
        lines: &[String],
        skip_tolerance: i64,
        map_tolerance: i64,
    ) -> Result<Self, CoreError> {
        let mut segments = Vec::with_capacity(lines.len());
        for line in lines {
            match Segment::from_sam_line(line, skip_tolerance, map_tolerance) {
                Ok(segment) => segments.push(segment),
                Err(CoreError::NoMapping) => {
                    let mut fields = line.splitn(3, '\t');
                    let qname = fields.next().unwrap_or("");
                    let flag = fields.next().unwrap_or("");
                    log::warn!(
                        "{} with flag {} has no mapping information; skipping",
                        qname,
                        flag
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if segments.is_empty() {
            return Err(CoreError::NoMappedSegments);
        }

        wire_complements(&segments);

        Ok(Transcript { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Walks the flat concatenation of every segment's components and wires
/// adjacent Start/End junction pairs that are each eligible for a
/// complement (set by CIGAR soft-clip detection or exposed exon ends).
/// Junction objects are mutated in place through interior mutability, so no
/// `&mut` access to the segments is required.
fn wire_complements(segments: &[Segment]) {
    let components: Vec<&Component> = segments
        .iter()
        .flat_map(|s| s.splice_list().components().iter())
        .collect();

    for pair in components.windows(2) {
        if let (Component::Junction(a), Component::Junction(b)) = (&pair[0], &pair[1]) {
            if a.kind() != b.kind() && a.has_complement() && b.has_complement() {
                a.set_complement(b);
                b.set_complement(a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sam_line(qname: &str, flag: u32, pos: i64, cigar: &str, rnext: &str) -> String {
        format!(
            "{}\t{}\tchr1\t{}\t255\t{}\t{}\t0\t0\tACGT\tIIII",
            qname, flag, pos, cigar, rnext
        )
    }

    #[test]
    fn single_segment_transcript() {
        let lines = vec![sam_line("r1", 0, 100, "50M", "*")];
        let t = Transcript::from_sam_lines(&lines, 20, 10).unwrap();
        assert_eq!(t.segments().len(), 1);
    }

    #[test]
    fn all_unmapped_segments_errors() {
        let lines = vec![sam_line("r1", 4, 0, "*", "*")];
        let err = Transcript::from_sam_lines(&lines, 20, 10).unwrap_err();
        assert!(matches!(err, CoreError::NoMappedSegments));
    }

    #[test]
    fn soft_clipped_mate_edges_are_wired_as_complements() {
        // Mate 1 maps 100-199 with a trailing soft clip past skip_tolerance;
        // mate 2 maps 500-599 with a leading soft clip past skip_tolerance.
        // wire_complements should link the two facing junctions, exactly as
        // it would for a read pair whose splice falls between the mates.
        let lines = vec![
            sam_line("r1", 0x1 | 0x40, 100, "100M50S", "*"),
            sam_line("r1", 0x1 | 0x80, 500, "50S100M", "*"),
        ];
        let t = Transcript::from_sam_lines(&lines, 20, 10).unwrap();
        let segs = t.segments();
        assert_eq!(segs.len(), 2);

        let right_edge = segs[0].splice_list().junctions().last().unwrap();
        let left_edge = &segs[1].splice_list().junctions()[0];

        let wired = right_edge.complement().expect("right edge should be wired");
        assert!(crate::region::Junction::ptr_eq(&wired, left_edge));
        let wired_back = left_edge.complement().expect("left edge should be wired back");
        assert!(crate::region::Junction::ptr_eq(&wired_back, right_edge));
    }
}
