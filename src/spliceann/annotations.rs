use std::collections::HashMap;
use std::io::BufRead;

use crate::error::CoreError;
use crate::splice_list::SpliceList;
use crate::transcript::Transcript;

/// Splits a GTF attributes column ("key \"value\"; key \"value\"; ...")
/// into a keyed mapping. Only `transcript_id` is ever consumed by the
/// caller, but the whole column is parsed rather than scanned for a
/// substring match, so malformed quoting is caught uniformly.
fn parse_attributes(attrs: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for field in attrs.split(';') {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        if let Some(sep) = field.find(char::is_whitespace) {
            let key = field[..sep].trim();
            let value = field[sep..].trim().trim_matches('"').trim();
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}

/// The set of annotated splice variants (and their shared precursor
/// mRNA) a read might have originated from.
pub struct Annotations {
    variants: Vec<SpliceList>,
}

impl Annotations {
    /// Reads exon features from a GTF file, grouping consecutive rows that
    /// share a `transcript_id` into one [`SpliceList`] per variant, and
    /// appends a final `pre-mRNA` variant spanning the smallest first-exon
    /// start and the largest last-exon stop seen across all groups (each
    /// group's first/last exon taken after its own should-reverse
    /// normalization, not a true min/max over every exon row).
    pub fn from_gtf<R: BufRead>(reader: R) -> Result<Self, CoreError> {
        let mut exon_rows: Vec<(i64, i64, String)> = Vec::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                return Err(CoreError::malformed(
                    format!("GTF line {} has too few columns", lineno + 1),
                    line,
                ));
            }
            if fields[2] != "exon" {
                continue;
            }
            let start: i64 = fields[3]
                .parse()
                .map_err(|_| CoreError::malformed(format!("GTF line {} bad start", lineno + 1), line.clone()))?;
            let stop: i64 = fields[4]
                .parse()
                .map_err(|_| CoreError::malformed(format!("GTF line {} bad end", lineno + 1), line.clone()))?;
            let attrs = parse_attributes(fields[fields.len() - 1]);
            let transcript_id = attrs.get("transcript_id").cloned().ok_or_else(|| {
                CoreError::malformed(format!("GTF line {} missing transcript_id", lineno + 1), line.clone())
            })?;
            exon_rows.push((start, stop, transcript_id));
        }

        if exon_rows.is_empty() {
            return Err(CoreError::malformed("GTF file has no exon features", ""));
        }

        let mut variants = Vec::new();
        let mut global_min = i64::MAX;
        let mut global_max = i64::MIN;

        let mut idx = 0;
        while idx < exon_rows.len() {
            let transcript_id = exon_rows[idx].2.clone();
            let mut end = idx;
            while end + 1 < exon_rows.len() && exon_rows[end + 1].2 == transcript_id {
                end += 1;
            }

            let mut exons: Vec<(i64, i64)> = exon_rows[idx..=end].iter().map(|(s, e, _)| (*s, *e)).collect();

            if let Some(&(s0, e0)) = exons.first() {
                if s0 > e0 {
                    for pair in exons.iter_mut() {
                        if pair.0 > pair.1 {
                            *pair = (pair.1, pair.0);
                        }
                    }
                    exons.sort_by_key(|p| p.0);
                }
            }

            // Mirrors the original reference implementation exactly: the
            // precursor extent is tracked from this group's first and last
            // exon (after the should_reverse re-sort above), not a true
            // min/max sweep over every exon in the group. The two diverge
            // when a group's rows are individually valid but not listed in
            // ascending order without tripping should_reverse (e.g. a
            // minus-strand transcript whose rows run high-to-low but whose
            // own start/stop are never swapped).
            if let (Some(&(first_start, _)), Some(&(_, last_stop))) = (exons.first(), exons.last()) {
                global_min = global_min.min(first_start);
                global_max = global_max.max(last_stop);
            }

            variants.push(SpliceList::from_exons(transcript_id, &exons, true, true)?);
            idx = end + 1;
        }

        variants.push(SpliceList::from_exons(
            "pre-mRNA",
            &[(global_min, global_max)],
            true,
            true,
        )?);

        Ok(Annotations { variants })
    }

    pub fn variants(&self) -> &[SpliceList] {
        &self.variants
    }

    /// Unions every segment's splice list across `transcript`'s segments,
    /// then returns the identifiers of every annotated variant that
    /// `contains` the merged result within `junction_tolerance`, in the
    /// same order the variants appear in the source GTF (precursor mRNA
    /// last).
    pub fn get_annotations(&self, transcript: &Transcript, junction_tolerance: i64) -> Vec<String> {
        let segments = transcript.segments();
        let splice_lists: Vec<SpliceList> = segments.iter().map(|s| s.splice_list().clone()).collect();
        let Some((first, rest)) = splice_lists.split_first() else {
            return Vec::new();
        };
        let merged = SpliceList::union_all(first, rest);

        self.variants
            .iter()
            .filter(|v| v.contains(&merged, junction_tolerance))
            .map(|v| v.identifier().to_string())
            .collect()
    }
}
