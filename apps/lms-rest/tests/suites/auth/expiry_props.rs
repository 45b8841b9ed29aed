// Property: an access token validates exactly while now < expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lms_rest::auth::codec::TokenCodec;
use lms_rest::auth::token::Token;
use lms_rest::{TokenKind, UserId};
use proptest::prelude::*;

use crate::support::test_state::test_security;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_token_valid_until_expiry(ttl in 1u64..100_000, offset in 0u64..200_000) {
        let codec = TokenCodec::new(&test_security());
        let issued = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let token = Token::generate(
            TokenKind::Access,
            UserId(100),
            None,
            issued,
            Duration::from_secs(ttl),
        );
        let raw = codec.encode(&token).unwrap();

        let result = codec.decode(&raw, TokenKind::Access, issued + Duration::from_secs(offset));

        prop_assert_eq!(result.is_ok(), offset < ttl);
    }

    #[test]
    fn prop_kinds_never_cross(kind_is_access in any::<bool>()) {
        let codec = TokenCodec::new(&test_security());
        let (issued_kind, expected_kind) = if kind_is_access {
            (TokenKind::Access, TokenKind::Refresh)
        } else {
            (TokenKind::Refresh, TokenKind::Access)
        };
        let now = SystemTime::now();
        let token = Token::generate(issued_kind, UserId(1), None, now, Duration::from_secs(60));
        let raw = codec.encode(&token).unwrap();

        prop_assert!(codec.decode(&raw, expected_kind, now).is_err());
    }
}
