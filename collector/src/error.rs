use hostinguard_config::CredentialsError;

/// A plain-text status report could not be turned into metrics.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("the {0} report was not available after all retries")]
    Unavailable(&'static str),
    #[error("memory report has no {0:?} line")]
    MissingLine(&'static str),
    #[error("{line:?} line of the memory report has no column {column}")]
    MissingColumn { line: &'static str, column: usize },
    #[error("{value:?} in the {context} is not an integer")]
    NotAnInteger { context: &'static str, value: String },
    #[error("access log line {0:?} is not of the form `<count> <status>`")]
    MalformedLine(String),
}

/// An upstream API call failed or answered with something unusable.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("request to the {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("the {service} response has no field {field:?}")]
    MissingField { service: &'static str, field: String },
    #[error("the {service} field {field:?} is not numeric: {value}")]
    NotNumeric {
        service: &'static str,
        field: String,
        value: String,
    },
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("no analytics {0} available for these credentials")]
    NoProfile(&'static str),
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

impl GatewayError {
    pub(crate) fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| GatewayError::Http { service, source }
    }
}
