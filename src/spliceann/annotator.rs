use crate::annotations::Annotations;
use crate::error::CoreError;
use crate::grouping::group_sam_lines;
use crate::transcript::Transcript;

/// Groups `lines` into read groups, assembles a [`Transcript`] per group,
/// annotates it against `annotations`, and returns every segment's line
/// with its `TR:Z` tag appended, in the order the groups were produced.
///
/// A group with no mapped segments is logged and skipped; any other error
/// (malformed SAM/CIGAR input) aborts the whole run.
pub fn annotate_lines(
    lines: &[String],
    annotations: &Annotations,
    skip_tolerance: i64,
    map_tolerance: i64,
    junction_tolerance: i64,
) -> Result<Vec<String>, CoreError> {
    let groups = group_sam_lines(lines);
    let mut output = Vec::with_capacity(lines.len());

    for group in groups {
        let transcript = match Transcript::from_sam_lines(&group, skip_tolerance, map_tolerance) {
            Ok(t) => t,
            Err(CoreError::NoMappedSegments) => {
                log::info!("read group of {} record(s) had no mapped segments; skipping", group.len());
                continue;
            }
            Err(e) => return Err(e),
        };

        let represents = annotations.get_annotations(&transcript, junction_tolerance);
        for segment in transcript.segments() {
            output.push(segment.apply_tag(&represents));
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sam_line(qname: &str, flag: u32, pos: i64, cigar: &str) -> String {
        format!("{}\t{}\tchr1\t{}\t255\t{}\t*\t0\t0\tACGT\tIIII", qname, flag, pos, cigar)
    }

    #[test]
    fn tags_single_exon_read_against_matching_variant() {
        let gtf = "chr1\ttest\texon\t100\t200\t.\t+\t.\ttranscript_id \"NM_1\";\n";
        let annotations = Annotations::from_gtf(Cursor::new(gtf)).unwrap();
        let lines = vec![sam_line("r1", 0, 100, "101M")];

        let tagged = annotate_lines(&lines, &annotations, 20, 10, 0).unwrap();
        assert_eq!(tagged.len(), 1);
        assert!(tagged[0].ends_with("TR:Z:NM_1,pre-mRNA"));
    }

    #[test]
    fn unmapped_read_is_skipped_not_fatal() {
        let gtf = "chr1\ttest\texon\t100\t200\t.\t+\t.\ttranscript_id \"NM_1\";\n";
        let annotations = Annotations::from_gtf(Cursor::new(gtf)).unwrap();
        let lines = vec![sam_line("r1", 4, 0, "*")];

        let tagged = annotate_lines(&lines, &annotations, 20, 10, 0).unwrap();
        assert!(tagged.is_empty());
    }
}
