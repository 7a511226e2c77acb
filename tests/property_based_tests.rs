use longcall::cache::header_codec::{decode, encode, escape, unescape};
use longcall::constants::MAX_ENCODED_HEADERS_LEN;
use longcall::task::{TaskFailure, TaskStatus};
use proptest::prelude::*;

fn failure_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![Just(TaskStatus::Error), Just(TaskStatus::TimedOut)]
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Submitted),
        Just(TaskStatus::Pending),
        Just(TaskStatus::Complete),
        Just(TaskStatus::Error),
        Just(TaskStatus::TimedOut),
    ]
}

proptest! {
    /// Property: encoded headers always fit the persisted column
    #[test]
    fn encoded_headers_never_exceed_limit(
        status in failure_status_strategy(),
        error_type in ".{0,400}",
        error_message in ".{0,800}",
    ) {
        let failure = TaskFailure::new(error_type, error_message);
        let encoded = encode(status, Some(&failure));
        prop_assert!(encoded.len() <= MAX_ENCODED_HEADERS_LEN, "len {}", encoded.len());
    }

    /// Property: truncated headers still decode to the original status
    #[test]
    fn truncated_headers_keep_status(
        status in failure_status_strategy(),
        error_message in "[;=%a-z ]{0,1000}",
    ) {
        let failure = TaskFailure::new("demo::Failure", error_message.clone());
        let decoded = decode(&encode(status, Some(&failure)), "prop").unwrap();

        prop_assert_eq!(decoded.status, status);
        let recovered = decoded.failure.unwrap();
        prop_assert_eq!(recovered.error_type, "demo::Failure");
        prop_assert!(error_message.starts_with(&recovered.error_message)
            || recovered.error_message == "None");
    }

    /// Property: short failures survive encoding unchanged
    #[test]
    fn short_failures_round_trip(
        status in failure_status_strategy(),
        error_type in "[A-Za-z:_;=%]{1,40}",
        error_message in "[ -~]{1,120}",
    ) {
        let failure = TaskFailure::new(error_type, error_message);
        let decoded = decode(&encode(status, Some(&failure)), "prop").unwrap();
        prop_assert_eq!(decoded.status, status);
        prop_assert_eq!(decoded.failure, Some(failure));
    }

    /// Property: statuses without failures decode without failure metadata
    #[test]
    fn plain_status_round_trips(status in status_strategy()) {
        let decoded = decode(&encode(status, None), "prop").unwrap();
        prop_assert_eq!(decoded.status, status);
        prop_assert!(decoded.failure.is_none());
    }

    /// Property: escaping is reversible for arbitrary text
    #[test]
    fn escape_is_reversible(value in ".*") {
        let escaped = escape(&value);
        prop_assert!(!escaped.contains(';'));
        prop_assert!(!escaped.contains('='));
        prop_assert_eq!(unescape(&escaped), value);
    }
}
