//! Splitting of function addresses.
//!
//! An address names both the function to invoke and the route inside it, in the form
//! `<function>/<path>`, for example `app-store-service:deployed/graphql`. The function
//! part may carry a qualifier such as an alias or version after a colon; only the first
//! `/` separates the two halves.
//!
//! ```rust
//! use phc_sdk::api::address::Address;
//!
//! let address = Address::parse("svc:deployed/v1/graphql").unwrap();
//! assert_eq!(address.function_name, "svc:deployed");
//! assert_eq!(address.path, "/v1/graphql");
//! ```
use super::error::GqlError;

const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address<'a> {
    pub function_name: &'a str,
    /// Route inside the function. Always starts with `/`.
    pub path: &'a str,
}

impl<'a> Address<'a> {
    /// Splits `address` at its first `/`.
    ///
    /// An address starting with `/` is accepted and yields an empty function name; the
    /// invoker will reject it when the call is made.
    pub fn parse(address: &'a str) -> Result<Self, GqlError> {
        let index = address.find(SEPARATOR)
            .ok_or_else(|| GqlError::InvalidAddress(address.to_string()))?;

        let (function_name, path) = address.split_at(index);

        Ok(Self {
            function_name,
            path
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_separator() {
        let address = Address::parse("some_lambda:status/some/path").unwrap();
        assert_eq!(address.function_name, "some_lambda:status");
        assert_eq!(address.path, "/some/path");
    }

    #[test]
    fn keeps_single_slash_path() {
        let address = Address::parse("svc:deployed/graphql").unwrap();
        assert_eq!(address.function_name, "svc:deployed");
        assert_eq!(address.path, "/graphql");

        let address = Address::parse("svc/").unwrap();
        assert_eq!(address.function_name, "svc");
        assert_eq!(address.path, "/");
    }

    #[test]
    fn rejects_address_without_separator() {
        let error = Address::parse("some_lambda:status.invalid_path").unwrap_err();
        assert!(matches!(error, GqlError::InvalidAddress(ref address) if address == "some_lambda:status.invalid_path"));

        assert!(matches!(Address::parse(""), Err(GqlError::InvalidAddress(_))));
    }

    #[test]
    fn accepts_empty_function_name() {
        let address = Address::parse("/graphql").unwrap();
        assert_eq!(address.function_name, "");
        assert_eq!(address.path, "/graphql");
    }

    #[test]
    fn path_always_starts_with_separator() {
        let addresses = [
            "a/b",
            "a//b",
            "marketplace-service:deployed/v1/marketplace/authenticated/graphql",
            "x:1/",
            "ü/ñ/ö",
        ];

        for raw in addresses {
            let address = Address::parse(raw).unwrap();
            assert!(address.path.starts_with('/'), "{raw}");
            assert!(!address.function_name.contains('/'), "{raw}");
            assert_eq!(format!("{}{}", address.function_name, address.path), raw);
        }
    }
}
