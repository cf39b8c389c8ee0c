//! Errors for registration, naming, and reactions.

use std::fmt;

use dom::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameErrorReason {
    /// Not a valid custom-element name (lowercase start, at least one
    /// hyphen, restricted character set).
    Malformed,
    /// Syntactically valid but reserved by the markup language.
    Reserved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameError {
    pub name: String,
    pub reason: NameErrorReason,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            NameErrorReason::Malformed => {
                write!(f, "'{}' is not a valid custom element name", self.name)
            }
            NameErrorReason::Reserved => write!(f, "'{}' is a reserved name", self.name),
        }
    }
}

impl std::error::Error for NameError {}

/// Registration failures. All are synchronous and leave the registry
/// unchanged, except `Reaction`, which reports the first reaction error
/// latched during the retroactive upgrade walk after the registration has
/// already taken effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefineError {
    ConstructorNotCallable,
    InvalidName(NameError),
    DuplicateName(String),
    DuplicateConstructor {
        /// Name the constructor is already bound to.
        existing: String,
    },
    PrototypeNotARecord,
    CallbackNotCallable(&'static str),
    Reaction(ReactionError),
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::ConstructorNotCallable => write!(f, "constructor is not callable"),
            DefineError::InvalidName(err) => fmt::Display::fmt(err, f),
            DefineError::DuplicateName(name) => write!(f, "'{name}' is already defined"),
            DefineError::DuplicateConstructor { existing } => {
                write!(f, "constructor is already bound to '{existing}'")
            }
            DefineError::PrototypeNotARecord => write!(f, "prototype is not a record"),
            DefineError::CallbackNotCallable(which) => {
                write!(f, "'{which}' is present but not callable")
            }
            DefineError::Reaction(err) => write!(f, "upgrade reaction failed: {err}"),
        }
    }
}

impl std::error::Error for DefineError {}

impl From<NameError> for DefineError {
    fn from(err: NameError) -> Self {
        DefineError::InvalidName(err)
    }
}

/// Failure raised inside a lifecycle or attribute reaction. The first one in
/// a processing pass is latched and re-raised after the pass completes;
/// sibling reactions still run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionError {
    pub element: NodeId,
    pub message: String,
}

impl ReactionError {
    pub fn new(element: NodeId, message: impl Into<String>) -> Self {
        Self {
            element,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reaction on {:?} failed: {}", self.element, self.message)
    }
}

impl std::error::Error for ReactionError {}
