use super::config::Category;

/// Why a memo could not be produced. Nothing is returned alongside an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GradingError {
    /// A raw mark is negative, not finite, or not a number at all.
    #[error("{category} mark #{position} is not a valid mark: '{value}'")]
    InvalidInput {
        /// Category the mark was supplied for
        category: Category,
        /// 1-based position in the raw sequence
        position: usize,
        /// The offending value as supplied
        value: String,
    },
    /// The identifier has no base-36 prefix to seed from.
    #[error("identifier '{0}' cannot be converted to a numeric seed")]
    MalformedIdentifier(String),
    /// Fewer subjects could be formed than the category declares.
    #[error("{category} marks cover {found} subject(s) but {expected} were declared")]
    InsufficientData {
        /// Category with the shortfall
        category: Category,
        /// Declared subject count
        expected: usize,
        /// Subjects the raw marks actually produce
        found: usize,
    },
    /// Subject codes starting at `start` run past the largest code.
    #[error("{count} subject code(s) starting at {start} do not fit")]
    CodeOverflow {
        /// First code of the run
        start: u32,
        /// Number of codes needed
        count: usize,
    },
}
