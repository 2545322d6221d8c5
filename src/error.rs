//! Error taxonomy for a documentation run.
//!
//! Every variant is fatal: a run either produces a complete, consistent set of
//! pages or nothing at all.

use thiserror::Error;

/// Broad classification of an [`ApigenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Collision,
    Resolution,
}

#[derive(Error, Debug)]
pub enum ApigenError {
    #[error("invalid group name {group:?} on '{entity}': group names must be non-empty and free of path separators and reserved characters")]
    InvalidGroupName { entity: String, group: String },

    #[error("invalid overload id {overload:?} on '{entity}': overload ids must be non-empty, must not start with '.' or contain \"..\", and must be free of path separators and reserved characters")]
    InvalidOverloadId { entity: String, overload: String },

    #[error("duplicate overload id '{overload}' for '{entity}' (overloads #{first} and #{second})")]
    DuplicateOverload {
        entity: String,
        overload: String,
        first: usize,
        second: usize,
    },

    #[error("'{entity}' is defined more than once")]
    DuplicateEntity { entity: String },

    #[error("'{entity}' mixes definitions with and without overload ids")]
    MixedOverloads { entity: String },

    #[error("malformed overloaded docstring for '{entity}': expected {expected:?}")]
    MalformedOverloads { entity: String, expected: String },

    #[error("invalid subscript method pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("module '{module}' is configured more than once")]
    DuplicateModule { module: String },

    #[error("group '{group}' of '{container}' was already populated by module '{owner}' and cannot be reopened by '{module}'")]
    GroupReopened {
        container: String,
        group: String,
        owner: String,
        module: String,
    },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("output path collision: '{first}' -> {first_path} and '{second}' -> {second_path}")]
    PathCollision {
        first: String,
        first_path: String,
        second: String,
        second_path: String,
    },

    #[error("'{entity}' links to both {first_path} and {second_path}")]
    LinkConflict {
        entity: String,
        first_path: String,
        second_path: String,
    },

    #[error("summary requested for group '{group}' of '{container}', but no entities were registered in it")]
    EmptyGroup { container: String, group: String },

    #[error("unresolved cross-reference '{target}' in documentation of '{entity}'")]
    UnresolvedReference { entity: String, target: String },

    #[error("no page was planned for '{entity}'")]
    UnresolvedLink { entity: String },
}

impl ApigenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGroupName { .. }
            | Self::InvalidOverloadId { .. }
            | Self::DuplicateOverload { .. }
            | Self::DuplicateEntity { .. }
            | Self::MixedOverloads { .. }
            | Self::MalformedOverloads { .. }
            | Self::InvalidPattern { .. }
            | Self::DuplicateModule { .. }
            | Self::GroupReopened { .. }
            | Self::Config { .. } => ErrorKind::Configuration,
            Self::PathCollision { .. } | Self::LinkConflict { .. } => ErrorKind::Collision,
            Self::EmptyGroup { .. }
            | Self::UnresolvedReference { .. }
            | Self::UnresolvedLink { .. } => ErrorKind::Resolution,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApigenError>;
