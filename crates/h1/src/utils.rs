//! Internal helper macros.

/// Returns `Err($error)` from the enclosing function unless `$predicate` holds.
///
/// Used by the parsers for grammar and limit checks, where failing fast reads
/// better than nested `if` blocks.
///
/// ```ignore
/// ensure!(version == b"1.1", ParseError::MalformedRequestLine);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr $(,)?) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
