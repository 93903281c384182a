use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Absence of a type is not an error by itself: [`crate::TypePool::describe`] reports it as an
/// unresolved [`crate::Resolution`], and only [`crate::Resolution::resolve`] turns it into
/// [`Error::NoSuchType`]. The remaining variants fall into four groups.
///
/// # Error Categories
///
/// ## Decoding Errors
/// - [`Error::Malformed`] - Corrupted or truncated class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond buffer boundaries
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::MalformedSignature`] - A generic signature failed to parse
/// - [`Error::RecursionLimit`] - Signature nesting exceeded the configured depth
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::ArchiveError`] - Jar/zip archive errors from the `zip` crate
///
/// ## Caller Contract Violations
/// - [`Error::IllegalName`] - A queried name can never denote a type
/// - [`Error::IllegalState`] - An operation was invoked on a value that cannot support it
/// - [`Error::PoolReleased`] - A description outlived the pool that created it
///
/// ## Resolution and Annotation Loading Errors
/// - [`Error::NoSuchType`] - An unresolved resolution was resolved
/// - [`Error::ClassNotFound`] - A type referenced from an annotation value is absent
/// - [`Error::EnumConstantNotPresent`] - An enumeration value names a missing constant
/// - [`Error::AnnotationTypeMismatch`] - A stored value does not fit the declared property
/// - [`Error::IncompleteAnnotation`] - A property has neither a value nor a default
///
/// # Examples
///
/// ```rust
/// use classpool::{Error, prelude::*};
///
/// let pool = DefaultPool::new(NoOpLocator.into_rc(), PoolConfig::default());
/// match pool.describe("com.example.Missing")?.resolve() {
///     Ok(description) => println!("found {}", description.name()),
///     Err(Error::NoSuchType(name)) => println!("{name} is not on the class path"),
///     Err(e) => return Err(e),
/// }
/// # Ok::<(), classpool::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Decoding Errors
    /// The class file is damaged and could not be parsed.
    ///
    /// This error indicates that the binary structure is corrupted or doesn't conform to the
    /// class file format. The error includes the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the data.
    ///
    /// This error occurs when trying to read beyond the end of a buffer. It's a safety check
    /// to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// A generic signature string could not be tokenized.
    ///
    /// Decoding never fails because of this; the affected declaration keeps its raw
    /// signature and generic accessors fall back to the erasure. The error only surfaces
    /// when a caller explicitly asks for the type variables of a malformed declaration.
    #[error("Malformed generic signature - {0}")]
    MalformedSignature(String),

    /// Signature nesting exceeded the configured depth.
    #[error("Reached the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    // I/O and External Errors
    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations such as opening a
    /// class path root or mapping an archive into memory.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the zip crate while opening a jar or zip archive.
    #[error("{0}")]
    ArchiveError(#[from] zip::result::ZipError),

    // Caller Contract Violations
    /// The queried name can never denote a type, for example because it contains a path
    /// separator.
    #[error("Illegal type name - {0}")]
    IllegalName(String),

    /// An operation was invoked on a value that cannot support it.
    ///
    /// Examples are asking a wildcard for its erasure, looking up the component type of a
    /// nested annotation array or resolving a type variable that no enclosing declaration
    /// defines.
    #[error("Illegal state - {0}")]
    IllegalState(String),

    /// A lazy description was accessed after its owning pool had been dropped.
    #[error("The type pool backing this description was released")]
    PoolReleased,

    // Resolution and Annotation Loading Errors
    /// A type could not be found by any locator in the chain.
    ///
    /// The associated name is the name that was queried.
    #[error("Cannot resolve type description for {0}")]
    NoSuchType(String),

    /// A type referenced by an annotation value could not be found while loading it.
    #[error("Class not found - {0}")]
    ClassNotFound(String),

    /// An enumeration annotation value names a constant that the enumeration does not declare.
    #[error("{enum_type}.{constant} is not present")]
    EnumConstantNotPresent {
        /// Name of the enumeration type
        enum_type: String,
        /// Name of the missing constant
        constant: String,
    },

    /// A stored annotation value does not fit the declared type of its property.
    #[error("Annotation property {property} holds an incompatible value: {found}")]
    AnnotationTypeMismatch {
        /// Name of the property
        property: String,
        /// Description of the value that was found
        found: String,
    },

    /// An annotation property has neither an explicit value nor a default value.
    #[error("Annotation {annotation_type} is missing a value for {property}")]
    IncompleteAnnotation {
        /// Name of the annotation type
        annotation_type: String,
        /// Name of the property without value
        property: String,
    },

    /// Failed to lock target
    #[error("Failed to lock target")]
    LockError,
}
