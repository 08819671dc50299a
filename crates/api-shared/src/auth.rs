use storeit_core::SessionToken;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("Authorization header must be 'Bearer <session>'")]
    Malformed,
}

/// Extracts the session token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn session_from_authorization(header: Option<&str>) -> Result<SessionToken, AuthError> {
    let header = header.ok_or(AuthError::Missing)?;
    let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Malformed);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(SessionToken::new(token))
}
