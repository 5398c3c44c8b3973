// Disambiguation among multiple candidates.
//
// Priority: exact raw-code equality, then canonical-name suffix of the raw
// name. Ambiguity after both rules leaves the record unmatched; it is never
// resolved by arbitrary first-match, to avoid silently wrong reconciliations.

use idnb_core::CanonicalArea;

/// Pick exactly one code from a candidate list, or none.
///
/// Deterministic and independent of candidate order: each rule is applied
/// only when it narrows the field to exactly one candidate.
pub fn pick(
    candidates: &[CanonicalArea],
    raw_code: Option<&str>,
    raw_name: Option<&str>,
) -> Option<String> {
    match candidates {
        [] => None,
        [only] => Some(only.code.clone()),
        many => {
            if let Some(code) = raw_code {
                let mut hits = many.iter().filter(|c| c.code == code);
                if let (Some(hit), None) = (hits.next(), hits.next()) {
                    return Some(hit.code.clone());
                }
            }

            // Raw names often carry extra prefix tokens ("KABUPATEN X" for
            // canonical "X"), so equality or suffix both count.
            if let Some(name) = raw_name {
                let raw_upper = name.to_uppercase();
                let mut hits = many.iter().filter(|c| {
                    let canon = c.name.to_uppercase();
                    canon == raw_upper || raw_upper.ends_with(&canon)
                });
                if let (Some(hit), None) = (hits.next(), hits.next()) {
                    return Some(hit.code.clone());
                }
            }

            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(code: &str, name: &str) -> CanonicalArea {
        CanonicalArea {
            code: code.into(),
            name: name.into(),
            parent_code: None,
        }
    }

    #[test]
    fn empty_and_singleton() {
        assert_eq!(pick(&[], Some("31"), Some("X")), None);
        assert_eq!(
            pick(&[area("31.75", "Kota Jakarta Timur")], None, None).as_deref(),
            Some("31.75")
        );
    }

    #[test]
    fn exact_code_beats_name_similarity() {
        let candidates = [
            area("31.71", "Kota Jakarta Pusat"),
            area("31.74", "Kota Jakarta Selatan"),
        ];
        let picked = pick(&candidates, Some("31.74"), Some("JAKARTA PUSAT"));
        assert_eq!(picked.as_deref(), Some("31.74"));
    }

    #[test]
    fn name_suffix_rule_handles_prefix_tokens() {
        let candidates = [
            area("32.01", "Bogor"),
            area("32.71", "Kota Bogor"),
        ];
        // "KABUPATEN BOGOR" ends with "BOGOR" but not with "KOTA BOGOR",
        // so the suffix rule hits exactly once.
        let picked = pick(&candidates, None, Some("KABUPATEN BOGOR"));
        assert_eq!(picked.as_deref(), Some("32.01"));
    }

    #[test]
    fn equal_priority_evidence_stays_unmatched() {
        let candidates = [
            area("31.75", "Jakarta Timur"),
            area("75.01", "Kota Timur"),
        ];
        // "TIMUR" is a suffix of both canonical names and no code disambiguates
        assert_eq!(pick(&candidates, None, Some("TIMUR")), None);
    }

    #[test]
    fn deterministic_under_candidate_order() {
        let a = area("31.75", "Jakarta Timur");
        let b = area("75.01", "Kota Timur");
        let fwd = pick(&[a.clone(), b.clone()], None, Some("TIMUR"));
        let rev = pick(&[b, a], None, Some("TIMUR"));
        assert_eq!(fwd, rev);

        let a = area("31.71", "Kota Jakarta Pusat");
        let b = area("31.74", "Kota Jakarta Selatan");
        let fwd = pick(&[a.clone(), b.clone()], Some("31.74"), None);
        let rev = pick(&[b, a], Some("31.74"), None);
        assert_eq!(fwd.as_deref(), Some("31.74"));
        assert_eq!(fwd, rev);
    }

    #[test]
    fn ambiguous_code_evidence_falls_through_to_name() {
        // Two candidates share the raw code (shouldn't happen with a PK, but
        // the rule must narrow to exactly one to apply)
        let candidates = [
            area("31.75", "Jakarta Timur"),
            area("31.75", "Jakarta Timur (duplicate)"),
        ];
        assert_eq!(pick(&candidates, Some("31.75"), Some("JAKARTA TIMUR")).as_deref(), Some("31.75"));
    }
}
