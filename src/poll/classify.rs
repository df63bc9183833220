// src/poll/classify.rs

use serde::Deserialize;

use crate::wire::{parse_remote_error, RemoteError};

/// Two-state failure classification, decided once per failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Skip this query, advance the cursor, do not retry.
    Permanent,
    /// Retry the identical request after the external backoff interval.
    Transient,
}

/// One `(status, code)` pair the remote is known to never recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PermanentError {
    pub status: u16,
    pub code: i64,
}

/// Pairs discovered empirically against the live API: unqueryable identifier
/// forms (803), unknown path components (2500), and the remote's own
/// "unexpected error" (2) which loops forever if retried.
pub fn default_permanent_table() -> Vec<PermanentError> {
    vec![
        PermanentError {
            status: 404,
            code: 803,
        },
        PermanentError {
            status: 404,
            code: 2500,
        },
        PermanentError {
            status: 500,
            code: 2,
        },
    ]
}

/// Classifies failed responses against a fixed `(status, code)` table.
/// Anything not in the table is transient, including responses with no
/// decodable error envelope.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    table: Vec<PermanentError>,
}

impl ErrorClassifier {
    pub fn new(table: Vec<PermanentError>) -> Self {
        Self { table }
    }

    pub fn classify(&self, status: u16, body: &[u8]) -> (FailureClass, Option<RemoteError>) {
        let remote = parse_remote_error(body);
        let class = match &remote {
            Some(err)
                if self
                    .table
                    .iter()
                    .any(|p| p.status == status && p.code == err.code) =>
            {
                FailureClass::Permanent
            }
            _ => FailureClass::Transient,
        };
        (class, remote)
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(default_permanent_table())
    }
}
