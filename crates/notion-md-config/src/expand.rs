//! `${VAR}` expansion for `notion-md.toml` strings.
//!
//! Only the braced forms are recognised: `${VAR}` must resolve, while
//! `${VAR:-default}` falls back to its default. A bare `$VAR` stays as
//! written, which keeps tokens that happen to contain `$` intact.

use std::borrow::Cow;

use crate::ConfigError;

/// Expands configuration strings against a variable lookup.
///
/// The lookup is injected so `Config` can read the process environment while
/// tests supply a fixed map.
pub(crate) struct EnvExpander<F> {
    lookup: F,
}

/// Variable referenced without a default and not set.
struct MissingVar;

impl<F> EnvExpander<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub(crate) fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Expand one field, naming it in the error.
    pub(crate) fn field(&self, value: &str, field: &str) -> Result<String, ConfigError> {
        if !value.contains("${") {
            return Ok(value.to_owned());
        }

        shellexpand::env_with_context(value, |name| match (self.lookup)(name) {
            Some(found) => Ok(Some(found)),
            None => Err(MissingVar),
        })
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
    }

    /// Expand the integration token. A token that expands to nothing counts
    /// as unset, so `token = "${TEAM_TOKEN:-}"` still falls back to
    /// `NOTION_TOKEN`.
    pub(crate) fn token(&self, value: Option<&str>) -> Result<Option<String>, ConfigError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let token = self.field(value, "notion.token")?;
        Ok((!token.trim().is_empty()).then_some(token))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn expander(vars: &[(&str, &str)]) -> EnvExpander<impl Fn(&str) -> Option<String>> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        EnvExpander::new(move |name: &str| vars.get(name).cloned())
    }

    #[test]
    fn test_plain_value_untouched() {
        let result = expander(&[]).field("2022-06-28", "notion.version").unwrap();
        assert_eq!(result, "2022-06-28");
    }

    #[test]
    fn test_embedded_var() {
        let result = expander(&[("NOTION_HOST", "notion.internal")])
            .field("https://${NOTION_HOST}/v1", "notion.base_url")
            .unwrap();
        assert_eq!(result, "https://notion.internal/v1");
    }

    #[test]
    fn test_default_used_when_unset() {
        let result = expander(&[])
            .field("${NOTION_VERSION:-2022-06-28}", "notion.version")
            .unwrap();
        assert_eq!(result, "2022-06-28");
    }

    #[test]
    fn test_missing_var_names_field_and_var() {
        let err = expander(&[])
            .field("${NOTION_BASE}", "notion.base_url")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("NOTION_BASE"));
        assert!(err.to_string().contains("notion.base_url"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let token = expander(&[("NOTION_TOKEN", "secret_env")])
            .token(Some("secret_$NOTION_TOKEN"))
            .unwrap();
        assert_eq!(token.as_deref(), Some("secret_$NOTION_TOKEN"));
    }

    #[test]
    fn test_token_expanded() {
        let token = expander(&[("TEAM_TOKEN", "secret_team")])
            .token(Some("${TEAM_TOKEN}"))
            .unwrap();
        assert_eq!(token.as_deref(), Some("secret_team"));
    }

    #[test]
    fn test_blank_token_is_unset() {
        let expander = expander(&[("TEAM_TOKEN", "  ")]);
        assert_eq!(expander.token(Some("${TEAM_TOKEN}")).unwrap(), None);
        assert_eq!(expander.token(Some("${OTHER_TOKEN:-}")).unwrap(), None);
        assert_eq!(expander.token(None).unwrap(), None);
    }

    #[test]
    fn test_missing_token_var_is_error() {
        let err = expander(&[]).token(Some("${TEAM_TOKEN}")).unwrap_err();
        assert!(err.to_string().contains("notion.token"));
    }
}
