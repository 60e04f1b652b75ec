use crate::error::{Result, VerifierError};
use regex::Regex;
use std::collections::BTreeMap;

pub struct HeaderUtils;

impl HeaderUtils {
    /// Reject header names that are not HTTP tokens and values carrying line breaks
    pub fn validate(headers: &BTreeMap<String, String>) -> Result<()> {
        let token = Regex::new(r"^[A-Za-z0-9!#$%&'*+.^_`|~-]+$")?;
        for (name, value) in headers {
            if !token.is_match(name) {
                return Err(VerifierError::InvalidHeader(name.clone(), "not a valid header name".to_string()));
            }
            if value.chars().any(|c| c == '\r' || c == '\n') {
                return Err(VerifierError::InvalidHeader(name.clone(), "value contains a line break".to_string()));
            }
        }
        Ok(())
    }
}
