use url::Url;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),
}

/// Parse a string URL & returns it as [Url].
pub fn parse_url(s: &str) -> Result<Url, url::ParseError> {
    s.parse()
}

/// Parse a node endpoint, which must be reachable over http(s).
pub fn parse_http_url(s: &str) -> Result<Url, UrlError> {
    let url = parse_url(s)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}
