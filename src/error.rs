// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engine error types.

/// Error type for badge evaluation and group detection.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Evaluator error: {0}")]
    Evaluator(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
