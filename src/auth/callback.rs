//! Redirect callback parsing.

use reqwest::Url;

use super::error::AuthError;

/// What the authorization server sent back to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
}

impl CallbackParams {
    /// Accepts a bare code, a query string (`?code=...`) or a full redirect URL.
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AuthError::MissingCode);
        }

        let url = if input.contains("://") {
            let url = Url::parse(input)
                .map_err(|err| AuthError::Invalid(format!("malformed callback url: {err}")))?;
            Some(url)
        } else if input.starts_with('?') || input.contains('=') {
            let query = input.trim_start_matches('?');
            Url::parse(&format!("http://localhost/?{query}")).ok()
        } else {
            None
        };

        let Some(url) = url else {
            return Ok(Self {
                code: input.to_string(),
                state: None,
            });
        };

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => return Err(AuthError::Provider(value.into_owned())),
                "code" if !value.is_empty() => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }
        code.map(|code| Self { code, state })
            .ok_or(AuthError::MissingCode)
    }
}
