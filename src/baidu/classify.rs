//! Provider error-code classification
//!
//! The provider's non-zero codes are undocumented; this table covers the
//! ones observed in the wild and degrades to a generic message for the
//! rest. Classification is total over the integer domain.

use crate::baidu::api::ProviderResponse;
use crate::checker::CheckFailure;

/// Code the provider returns when it is throttling this client. Distinct
/// from a dead link; the batch driver backs off instead of reporting rot.
pub const RATE_LIMITED_ERRNO: i64 = -62;

/// Maps a provider response onto the check taxonomy; `errno == 0` is the
/// only success value
pub fn classify(response: &ProviderResponse) -> Result<(), CheckFailure> {
    if response.errno == 0 {
        return Ok(());
    }

    Err(CheckFailure::ProviderRejected {
        errno: response.errno,
        reason: failure_reason(response.errno, &response.errmsg),
        throttled: response.errno == RATE_LIMITED_ERRNO,
    })
}

/// Human-readable reason for a non-zero code.
///
/// A non-empty provider message takes precedence; the raw errno is always
/// retained for diagnosis. The table is append-only.
fn failure_reason(errno: i64, errmsg: &str) -> String {
    if !errmsg.is_empty() {
        return format!("share invalid (errno {}: {})", errno, errmsg);
    }

    match errno {
        -12 => format!("missing extraction code (errno {})", errno),
        -9 => format!("wrong extraction code (errno {})", errno),
        -62 => format!("request rate limited by provider (errno {})", errno),
        -8 => format!("share expired (errno {})", errno),
        _ => format!("share invalid (errno {})", errno),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(errno: i64, errmsg: &str) -> ProviderResponse {
        ProviderResponse {
            errno,
            errmsg: errmsg.to_string(),
        }
    }

    #[test]
    fn test_zero_is_valid() {
        assert!(classify(&response(0, "")).is_ok());
    }

    #[test]
    fn test_zero_is_valid_regardless_of_message() {
        assert!(classify(&response(0, "ignored")).is_ok());
    }

    #[test]
    fn test_known_codes() {
        let cases = [
            (-12, "missing extraction code"),
            (-9, "wrong extraction code"),
            (-62, "request rate limited by provider"),
            (-8, "share expired"),
        ];

        for (errno, expected) in cases {
            let failure = classify(&response(errno, "")).unwrap_err();
            let reason = failure.to_string();
            assert!(
                reason.contains(expected),
                "errno {}: got '{}'",
                errno,
                reason
            );
            assert!(reason.contains(&errno.to_string()));
        }
    }

    #[test]
    fn test_unknown_code_keeps_raw_errno() {
        let failure = classify(&response(-999, "")).unwrap_err();
        let reason = failure.to_string();
        assert!(reason.contains("share invalid"));
        assert!(reason.contains("-999"));
    }

    #[test]
    fn test_provider_message_takes_precedence() {
        let failure = classify(&response(-8, "link gone")).unwrap_err();
        let reason = failure.to_string();
        assert!(reason.contains("link gone"));
        assert!(reason.contains("-8"));
    }

    #[test]
    fn test_rate_limit_code_sets_flag() {
        let failure = classify(&response(-62, "")).unwrap_err();
        assert!(failure.is_rate_limited());
    }

    #[test]
    fn test_rate_limit_flag_ignores_message_content() {
        let failure = classify(&response(-62, "some message")).unwrap_err();
        assert!(failure.is_rate_limited());
    }

    #[test]
    fn test_other_codes_are_not_rate_limited() {
        for errno in [-12, -9, -8, -1, 2, -999] {
            let failure = classify(&response(errno, "")).unwrap_err();
            assert!(!failure.is_rate_limited(), "errno {}", errno);
        }
    }
}
