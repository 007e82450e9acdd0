//! Executor capacity resolution

/// Number of concurrent job slots a worker advertises
///
/// Fleets that leave parallelism unset (zero) or misconfigure it (negative)
/// still get a usable single-slot worker.
pub fn resolve_executors(requested: i32) -> u32 {
    if requested > 0 { requested as u32 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_defaults_to_one() {
        assert_eq!(resolve_executors(0), 1);
    }

    #[test]
    fn test_negative_defaults_to_one() {
        assert_eq!(resolve_executors(-1), 1);
        assert_eq!(resolve_executors(i32::MIN), 1);
    }

    #[test]
    fn test_positive_is_kept() {
        assert_eq!(resolve_executors(1), 1);
        assert_eq!(resolve_executors(4), 4);
        assert_eq!(resolve_executors(i32::MAX), i32::MAX as u32);
    }
}
