use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Long-lived pseudo-identifier of a browser, e.g. `visitor_1718000000000_k3j9x0a1b`.
pub fn new_visitor_id() -> String {
    tagged_id("visitor")
}

/// Identifier of one browsing session.
pub fn new_session_id() -> String {
    tagged_id("session")
}

fn tagged_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Accepts only ids this module could have issued for `prefix`.
pub fn is_well_formed(id: &str, prefix: &str) -> bool {
    let mut parts = id.splitn(3, '_');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(p), Some(ms), Some(suffix))
            if p == prefix
                && !ms.is_empty()
                && ms.bytes().all(|b| b.is_ascii_digit())
                && suffix.len() == SUFFIX_LEN
                && suffix.bytes().all(|b| BASE36.contains(&b))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_expected_shape() {
        let visitor = new_visitor_id();
        let session = new_session_id();
        assert!(is_well_formed(&visitor, "visitor"), "{visitor}");
        assert!(is_well_formed(&session, "session"), "{session}");
        assert_ne!(new_visitor_id(), visitor);
    }

    #[test]
    fn foreign_values_are_rejected() {
        assert!(!is_well_formed("visitor_123", "visitor"));
        assert!(!is_well_formed("session_1_abcdefghi", "visitor"));
        assert!(!is_well_formed("visitor_x1_abcdefghi", "visitor"));
        assert!(!is_well_formed("visitor_1_ABCDEFGHI", "visitor"));
    }
}
