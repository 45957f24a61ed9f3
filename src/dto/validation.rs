//! Validation helpers for configuration and inbound DTOs.

use validator::ValidationError;

/// Validates that a command token is a single non-empty word.
///
/// Incoming messages are whitespace-tokenized, so a token containing
/// whitespace could never match.
///
/// # Examples
///
/// ```ignore
/// validate_command_token("bomb")       // Ok
/// validate_command_token("")           // Err - empty
/// validate_command_token("start game") // Err - whitespace
/// ```
pub fn validate_command_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        let mut err = ValidationError::new("command_token_empty");
        err.message = Some("Command token must not be empty".into());
        return Err(err);
    }

    if token.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("command_token_whitespace");
        err.message = Some(format!("Command token `{token}` must not contain whitespace").into());
        return Err(err);
    }

    Ok(())
}

/// Validates that an identifier coming from the bridge is not blank.
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("identifier_blank");
        err.message = Some("Identifier must not be blank".into());
        return Err(err);
    }

    Ok(())
}
