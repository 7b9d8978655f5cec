//! Maps opaque error strings from external binaries into a small typed
//! taxonomy, via ordered substring matching.
//!
//! Grounded on vibe-kanban's `GitCli::classify_cli_error` (lowercase-once,
//! substring-match idiom), generalized to the full five-set priority order.

use crate::types::ErrorKind;

const RATE_LIMIT: &[&str] = &[
   "rate limit exceeded",
   "api rate limit",
   "secondary rate limit",
   "abuse detection",
   "too many requests",
];

const AUTH: &[&str] = &[
   "authentication failed",
   "could not read username",
   "permission denied",
   "invalid username or password",
   "access denied",
   "bad credentials",
   "not logged into",
   "must be authenticated",
   "invalid token",
   "token expired",
   "auth login",
];

const NETWORK: &[&str] = &[
   "could not resolve host",
   "connection refused",
   "network is unreachable",
   "connection timed out",
   "operation timed out",
   "unable to access",
   "no route to host",
   "failed to connect",
   "timeout",
];

const NON_FAST_FORWARD: &[&str] = &[
   "non-fast-forward",
   "rejected",
   "failed to push some refs",
   "updates were rejected",
   "fetch first",
   "tip of your current branch is behind",
   "rejected because the remote contains work",
];

const NOT_FOUND: &[&str] = &["not found", "no such", "repository not found", "does not exist"];

/// Classify an error's rendered message into an `ErrorKind`.
///
/// Deterministic, case-insensitive, and idempotent: the same string always
/// classifies to the same kind. Priority order matters because real messages
/// overlap (e.g. "rate limit exceeded: access denied" must classify as
/// rate-limit, not auth).
pub fn classify(message: &str) -> ErrorKind {
   let lower = message.to_lowercase();

   if RATE_LIMIT.iter().any(|p| lower.contains(p)) {
      return ErrorKind::RateLimit;
   }
   if AUTH.iter().any(|p| lower.contains(p)) {
      return ErrorKind::Auth;
   }
   if NETWORK.iter().any(|p| lower.contains(p)) {
      return ErrorKind::Network;
   }
   if NON_FAST_FORWARD.iter().any(|p| lower.contains(p)) {
      return ErrorKind::NonFastForward;
   }
   if NOT_FOUND.iter().any(|p| lower.contains(p)) {
      return ErrorKind::NotFound;
   }
   ErrorKind::Other
}

/// Platform-specific "checks not yet registered" signal, recognized only by
/// the CI Watch Service's adapter, not the general classifier.
pub fn is_no_checks_yet(message: &str) -> bool {
   message.to_lowercase().contains("no checks reported")
}
