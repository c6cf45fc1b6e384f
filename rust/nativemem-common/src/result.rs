pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Fails the enclosing function with `InvalidArgument` unless the condition holds.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_position(position: usize, limit: usize) -> super::Result<()> {
        verify_arg!(position, position <= limit);
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_position(3, 8).is_ok());
        let err = check_position(9, 8).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "position");
                assert_eq!(message, "position <= limit");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_error_predicates() {
        let e = crate::error::Error::invalid_range(0, 16, "null address");
        assert!(e.is_invalid_range());
        assert!(!e.is_unsupported_buffer_kind());
        assert_eq!(
            e.to_string(),
            "invalid range at 0x0 (length 16): null address"
        );

        let e = crate::error::Error::unsupported_buffer_kind("heap");
        assert!(e.is_unsupported_buffer_kind());
    }
}
