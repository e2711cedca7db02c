//! Tracking code generation.
//!
//! Codes look like `ORD-SITE-20261018-7QK2D`: a fixed prefix, the
//! organisation tag, the UTC submission date, and five random characters
//! from `A-Z0-9`. The format is persisted and shown to customers, so it must
//! stay parseable.

use async_trait::async_trait;
use chrono::NaiveDate;
use order_store::{OrderRepository, StoreError};
use rand::Rng;

use super::OrderError;
use crate::error::DomainError;

/// Fixed leading segment of every code.
pub const CODE_PREFIX: &str = "ORD";

/// Number of random characters at the end of a code.
pub const SUFFIX_LEN: usize = 5;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const DATE_FORMAT: &str = "%Y%m%d";

/// Answers whether a code is already in use.
///
/// Only an optimisation in front of the store's own unique constraint; a
/// code reported free may still lose an insert race.
#[async_trait]
pub trait CodeChecker: Send + Sync {
    async fn is_taken(&self, code: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<R: OrderRepository + ?Sized> CodeChecker for R {
    async fn is_taken(&self, code: &str) -> Result<bool, StoreError> {
        self.exists_by_code(code).await
    }
}

/// Produces unique, human-readable tracking codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCodeGenerator {
    org_tag: String,
    max_attempts: u32,
}

impl OrderCodeGenerator {
    pub const DEFAULT_ORG_TAG: &'static str = "SITE";
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

    /// Creates a generator for the given organisation tag.
    ///
    /// The tag is upper-cased and stripped to ASCII alphanumerics so codes
    /// keep exactly four dash-separated segments. An empty result falls back
    /// to `DEFAULT_ORG_TAG`.
    pub fn new(org_tag: impl AsRef<str>) -> Self {
        let tag: String = org_tag
            .as_ref()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        Self {
            org_tag: if tag.is_empty() {
                Self::DEFAULT_ORG_TAG.to_string()
            } else {
                tag
            },
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many candidates may be tried before giving up (at least one).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn org_tag(&self) -> &str {
        &self.org_tag
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Builds one candidate code for `date` using the thread-local RNG.
    pub fn candidate(&self, date: NaiveDate) -> String {
        self.candidate_with(date, &mut rand::thread_rng())
    }

    /// Builds one candidate code for `date` using `rng`.
    pub fn candidate_with<G: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut G) -> String {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();

        format!(
            "{CODE_PREFIX}-{}-{}-{suffix}",
            self.org_tag,
            date.format(DATE_FORMAT)
        )
    }

    /// Draws candidates until `checker` reports one free.
    ///
    /// Fails with `CodeGenerationExhausted` after `max_attempts` taken
    /// candidates. Checker errors are returned as they are.
    pub async fn generate<C: CodeChecker + ?Sized>(
        &self,
        checker: &C,
        date: NaiveDate,
    ) -> Result<String, DomainError> {
        for attempt in 1..=self.max_attempts {
            let code = self.candidate(date);
            if !checker.is_taken(&code).await? {
                return Ok(code);
            }

            metrics::counter!("order_code_collisions_total").increment(1);
            tracing::debug!(%code, attempt, "order code already taken, regenerating");
        }

        Err(OrderError::CodeGenerationExhausted {
            attempts: self.max_attempts,
        }
        .into())
    }
}

impl Default for OrderCodeGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ORG_TAG)
    }
}

/// The segments of a well-formed tracking code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCode<'a> {
    pub org_tag: &'a str,
    pub date: NaiveDate,
    pub suffix: &'a str,
}

/// Splits a tracking code into its segments.
///
/// Returns None unless the code is `ORD-<TAG>-<YYYYMMDD>-<5 x A-Z0-9>` with a
/// real calendar date and a non-empty alphanumeric tag.
pub fn parse_code(code: &str) -> Option<ParsedCode<'_>> {
    let rest = code.strip_prefix(CODE_PREFIX)?.strip_prefix('-')?;
    let (rest, suffix) = rest.rsplit_once('-')?;
    let (org_tag, date) = rest.rsplit_once('-')?;

    let suffix_ok = suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    let tag_ok = !org_tag.is_empty() && org_tag.bytes().all(|b| b.is_ascii_alphanumeric());
    if !suffix_ok || !tag_ok || date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;

    Some(ParsedCode {
        org_tag,
        date,
        suffix,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    /// Reports the first `collisions` checks as taken.
    struct CollidingChecker {
        collisions: u32,
        calls: AtomicU32,
    }

    impl CollidingChecker {
        fn new(collisions: u32) -> Self {
            Self {
                collisions,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl CodeChecker for CollidingChecker {
        async fn is_taken(&self, _code: &str) -> Result<bool, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(call < self.collisions)
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_candidate_format() {
        let generator = OrderCodeGenerator::new("acme");
        let code = generator.candidate(date());

        assert!(code.starts_with("ORD-ACME-20261018-"), "{code}");
        let parsed = parse_code(&code).unwrap();
        assert_eq!(parsed.org_tag, "ACME");
        assert_eq!(parsed.date, date());
        assert_eq!(parsed.suffix.len(), SUFFIX_LEN);
    }

    #[test]
    fn test_candidate_is_deterministic_for_seeded_rng() {
        let generator = OrderCodeGenerator::default();
        let a = generator.candidate_with(date(), &mut StdRng::seed_from_u64(7));
        let b = generator.candidate_with(date(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_org_tag_is_normalised() {
        assert_eq!(OrderCodeGenerator::new("my-co 1").org_tag(), "MYCO1");
        assert_eq!(OrderCodeGenerator::new("--").org_tag(), "SITE");
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        assert_eq!(OrderCodeGenerator::default().with_max_attempts(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_generate_retries_past_collisions() {
        let generator = OrderCodeGenerator::default().with_max_attempts(5);
        let checker = CollidingChecker::new(3);

        let code = generator.generate(&checker, date()).await.unwrap();

        assert!(parse_code(&code).is_some());
        assert_eq!(checker.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_generate_gives_up_after_budget() {
        let generator = OrderCodeGenerator::default().with_max_attempts(3);
        let checker = CollidingChecker::new(u32::MAX);

        let result = generator.generate(&checker, date()).await;

        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::CodeGenerationExhausted { attempts: 3 }))
        ));
        assert_eq!(checker.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        for code in [
            "",
            "ORD-SITE-20261018",
            "ORX-SITE-20261018-ABCDE",
            "ORD--20261018-ABCDE",
            "ORD-SITE-20261318-ABCDE",
            "ORD-SITE-2026101-ABCDE",
            "ORD-SITE-20261018-abcde",
            "ORD-SITE-20261018-ABCD",
            "ORD-SI-TE-20261018-ABCDE",
        ] {
            assert!(parse_code(code).is_none(), "{code}");
        }
    }
}
