use thiserror::Error;

/// Failures surfaced by field access and learning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A non-query access named something no raw key resolves to.
    #[error("undefined member `{member}` for {type_name}")]
    UnknownMember { member: String, type_name: String },

    /// Learning needs a nominal type to attach accessors and a profile to.
    #[error("examples are for learning structs; declare a named type first")]
    InvalidRootUsage,
}

pub type Result<T> = std::result::Result<T, Error>;
