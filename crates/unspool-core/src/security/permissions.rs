//! Permission bit sanitization for extracted entries.

/// Bits stripped from every archive mode: setuid, setgid and sticky.
const SPECIAL_BITS: u32 = 0o7000;

/// Computes the mode to apply to an extracted entry.
///
/// Special bits are always dropped and the remaining bits are ANDed with the
/// caller's `mask`, so an archive can never grant more than the caller
/// allows.
///
/// # Examples
///
/// ```
/// use unspool_core::security::sanitize_permissions;
///
/// assert_eq!(sanitize_permissions(0o4755, 0o755), 0o755);
/// assert_eq!(sanitize_permissions(0o666, 0o755), 0o644);
/// ```
#[must_use]
pub const fn sanitize_permissions(mode: u32, mask: u32) -> u32 {
    mode & !SPECIAL_BITS & 0o777 & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_setuid_setgid_sticky() {
        assert_eq!(sanitize_permissions(0o4755, 0o777), 0o755);
        assert_eq!(sanitize_permissions(0o2755, 0o777), 0o755);
        assert_eq!(sanitize_permissions(0o1777, 0o777), 0o777);
    }

    #[test]
    fn test_mask_applies() {
        assert_eq!(sanitize_permissions(0o777, 0o755), 0o755);
        assert_eq!(sanitize_permissions(0o640, 0o700), 0o600);
        assert_eq!(sanitize_permissions(0o644, 0), 0);
    }

    #[test]
    fn test_file_type_bits_dropped() {
        assert_eq!(sanitize_permissions(0o100_644, 0o777), 0o644);
    }
}
