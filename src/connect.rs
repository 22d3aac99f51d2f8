use std::fmt;
use thiserror::Error;
use url::Url;

/// Validated connection settings for one explorer session.
///
/// Lives only in memory: it is built from the connect form and dropped on
/// disconnect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    base_url: Url,
    api_key: String,
}

impl ConnectionDescriptor {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn api_root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BaseUrl,
    ApiKey,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::BaseUrl => Field::ApiKey,
            Field::ApiKey => Field::BaseUrl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Please enter a valid URL")]
    InvalidUrl,
    #[error("API Key is required")]
    MissingApiKey,
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::InvalidUrl => Field::BaseUrl,
            FieldError::MissingApiKey => Field::ApiKey,
        }
    }
}

/// Every field error found in one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field() == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn clear_field(&mut self, field: Field) {
        self.0.retain(|e| e.field() != field);
    }
}

/// Syntactic validation only; nothing here touches the network.
pub fn validate(base_url: &str, api_key: &str) -> Result<ConnectionDescriptor, FormErrors> {
    let mut errors = Vec::new();

    // Url::parse only accepts absolute URLs
    let parsed = Url::parse(base_url.trim()).ok();
    if parsed.is_none() {
        errors.push(FieldError::InvalidUrl);
    }
    if api_key.is_empty() {
        errors.push(FieldError::MissingApiKey);
    }

    match parsed {
        Some(base_url) if errors.is_empty() => Ok(ConnectionDescriptor {
            base_url,
            api_key: api_key.to_string(),
        }),
        _ => Err(FormErrors(errors)),
    }
}

/// Connect screen state: two raw inputs plus the last validation result
#[derive(Debug, Clone)]
pub struct ConnectForm {
    pub base_url: String,
    pub api_key: String,
    pub focus: Field,
    pub errors: FormErrors,
}

impl ConnectForm {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_default();
        // Jump straight to the key when the URL was pre-filled
        let focus = if base_url.is_empty() { Field::BaseUrl } else { Field::ApiKey };
        Self {
            base_url,
            api_key: String::new(),
            focus,
            errors: FormErrors::default(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_buffer().push(c);
        self.errors.clear_field(self.focus);
    }

    pub fn pop_char(&mut self) {
        self.focused_buffer().pop();
        self.errors.clear_field(self.focus);
    }

    fn focused_buffer(&mut self) -> &mut String {
        match self.focus {
            Field::BaseUrl => &mut self.base_url,
            Field::ApiKey => &mut self.api_key,
        }
    }

    /// Validate the current inputs, keeping the errors for display on failure
    pub fn submit(&mut self) -> Option<ConnectionDescriptor> {
        match validate(&self.base_url, &self.api_key) {
            Ok(descriptor) => {
                self.errors = FormErrors::default();
                Some(descriptor)
            }
            Err(errors) => {
                if let Some(first) = errors.0.first() {
                    self.focus = first.field();
                }
                self.errors = errors;
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_descriptor(base_url: &str) -> ConnectionDescriptor {
    validate(base_url, "secret").unwrap()
}
