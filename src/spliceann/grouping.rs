/// Partitions a set of SAM alignment lines into read groups by following
/// paired-end flag bits and RNEXT chains.
///
/// Lines without the "multiple segments" flag (0x1) are emitted as their
/// own singleton group. Lines that carry it are split into "first"
/// (0x40), "last" (0x80), and "middle" (neither) segments; starting from
/// each first segment, the RNEXT chain is followed through the middle
/// segments (each consumed at most once) until it terminates at `*`, loops
/// back to the starting QNAME (`=`), or reaches a last segment. Any first
/// segment whose chain never attaches to anything else is demoted back to
/// a singleton. Leftover middles and lasts that were never attached to any
/// chain are emitted as orphan singletons.
///
/// Output order: proper (multi-segment) groups, then ungrouped singletons,
/// then orphan singletons — each preserving input order within its class.
pub fn group_sam_lines(lines: &[String]) -> Vec<Vec<String>> {
    fn flags(line: &str) -> u32 {
        line.split('\t').nth(1).and_then(|s| s.parse().ok()).unwrap_or(0)
    }
    fn qname(line: &str) -> &str {
        line.split('\t').next().unwrap_or("")
    }
    fn rnext(line: &str) -> &str {
        line.split('\t').nth(6).unwrap_or("*")
    }
    fn next_target(line: &str) -> Option<String> {
        match rnext(line) {
            "=" => Some(qname(line).to_string()),
            "*" => None,
            other => Some(other.to_string()),
        }
    }

    let is_grouped = |l: &str| flags(l) & 0x1 != 0;
    let is_first = |l: &str| flags(l) & 0x40 != 0;
    let is_last = |l: &str| flags(l) & 0x80 != 0;

    let mut ungrouped: Vec<String> = Vec::new();
    let mut firsts: Vec<String> = Vec::new();
    let mut middles: Vec<String> = Vec::new();
    let mut lasts: Vec<String> = Vec::new();

    for line in lines {
        if !is_grouped(line) {
            ungrouped.push(line.clone());
        } else if is_first(line) {
            firsts.push(line.clone());
        } else if is_last(line) {
            lasts.push(line.clone());
        } else {
            middles.push(line.clone());
        }
    }

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut orphans: Vec<String> = Vec::new();

    for first in firsts {
        let mut group = vec![first.clone()];
        let mut target = next_target(&first);

        while let Some(t) = target.clone() {
            match middles.iter().position(|m| qname(m) == t) {
                Some(idx) => {
                    let m = middles.remove(idx);
                    target = next_target(&m);
                    group.push(m);
                }
                None => break,
            }
        }

        if let Some(t) = target {
            if let Some(idx) = lasts.iter().position(|l| qname(l) == t) {
                group.push(lasts.remove(idx));
            }
        }

        if group.len() == 1 {
            orphans.push(group.into_iter().next().unwrap());
        } else {
            if !is_last(group.last().unwrap()) {
                log::warn!(
                    "read group starting with {} does not end with a last segment",
                    qname(&group[0])
                );
            }
            groups.push(group);
        }
    }

    orphans.extend(middles);
    orphans.extend(lasts);

    log::info!(
        "grouped {} proper read group(s), {} ungrouped, {} orphan segment(s)",
        groups.len(),
        ungrouped.len(),
        orphans.len()
    );

    let mut result = groups;
    result.extend(ungrouped.into_iter().map(|l| vec![l]));
    result.extend(orphans.into_iter().map(|l| vec![l]));
    result
}
