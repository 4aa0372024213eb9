//! Retrieval of the OpenAPI document a run is built from

use openapiv3::OpenAPI;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed for {url} ({status})")]
    Authentication { url: String, status: u16 },

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth").field("username", &self.username).field("password", &"***").finish()
    }
}

/// Where the API document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenApiSource {
    File(PathBuf),
    Url { url: String, credentials: Option<BasicAuth> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl OpenApiSource {
    /// `http(s)://` locations become URLs, anything else a file path
    pub fn parse(location: &str, credentials: Option<BasicAuth>) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url { url: location.to_string(), credentials }
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    pub async fn fetch(&self) -> Result<OpenAPI> {
        match self {
            Self::File(path) => fetch_file(path).await,
            Self::Url { url, credentials } => fetch_url(url, credentials.as_ref()).await,
        }
    }
}

impl fmt::Display for OpenApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url { url, credentials: Some(auth) } => write!(f, "{} (as {})", url, auth.username),
            Self::Url { url, credentials: None } => write!(f, "{}", url),
        }
    }
}

fn format_from_extension(location: &str) -> Option<Format> {
    let location = location.split(['?', '#']).next().unwrap_or(location);
    let extension = Path::new(location).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "yml" | "yaml" => Some(Format::Yaml),
        "json" => Some(Format::Json),
        _ => None,
    }
}

fn format_from_content_type(content_type: &str) -> Option<Format> {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("yaml") {
        Some(Format::Yaml)
    } else if content_type.contains("json") {
        Some(Format::Json)
    } else {
        None
    }
}

fn decode(text: &str, format: Format) -> Result<OpenAPI> {
    match format {
        Format::Yaml => Ok(serde_yaml::from_str(text)?),
        Format::Json => Ok(serde_json::from_str(text)?),
    }
}

async fn fetch_file(path: &Path) -> Result<OpenAPI> {
    debug!("Reading API document from {}", path.display());
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io { path: path.to_path_buf(), source })?;

    let format = format_from_extension(&path.to_string_lossy()).unwrap_or(Format::Json);
    decode(&text, format)
}

async fn fetch_url(url: &str, credentials: Option<&BasicAuth>) -> Result<OpenAPI> {
    info!("Fetching API document from {}", url);
    let client = reqwest::Client::new();
    let mut request = client.get(url);
    if let Some(auth) = credentials {
        request = request.basic_auth(&auth.username, Some(&auth.password));
    }

    let response = request.send().await?;
    let status = response.status();
    match status {
        StatusCode::OK => {}
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(SourceError::Authentication { url: url.to_string(), status: status.as_u16() });
        }
        _ => return Err(SourceError::UnexpectedStatus { url: url.to_string(), status: status.as_u16() }),
    }

    let header_format = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(format_from_content_type);
    let format = format_from_extension(url).or(header_format).unwrap_or(Format::Json);

    let text = response.text().await?;
    decode(&text, format)
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port, returning the base URL
    pub async fn serve_once(status_line: &'static str, content_type: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::serve_once;
    use super::*;
    use tempfile::TempDir;

    const YAML: &str = "\
openapi: 3.0.0
info:
  title: Widgets
  version: '1'
paths:
  /widgets:
    get:
      responses:
        '200':
          description: ok
";

    #[test]
    fn test_parse_location() {
        assert!(matches!(OpenApiSource::parse("https://x/api.yml", None), OpenApiSource::Url { .. }));
        assert_eq!(OpenApiSource::parse("api.yml", None), OpenApiSource::File(PathBuf::from("api.yml")));
    }

    #[test]
    fn test_display_hides_password() {
        let source = OpenApiSource::parse(
            "https://x/api.yml",
            Some(BasicAuth { username: "ci".to_string(), password: "hunter2".to_string() }),
        );
        assert_eq!(source.to_string(), "https://x/api.yml (as ci)");
        assert!(!format!("{:?}", source).contains("hunter2"));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(format_from_extension("api.YAML"), Some(Format::Yaml));
        assert_eq!(format_from_extension("https://h/api.yml?token=1"), Some(Format::Yaml));
        assert_eq!(format_from_extension("https://h/openapi"), None);
        assert_eq!(format_from_content_type("application/x-yaml; charset=utf-8"), Some(Format::Yaml));
        assert_eq!(format_from_content_type("text/plain"), None);
    }

    #[tokio::test]
    async fn test_fetch_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.yaml");
        tokio::fs::write(&path, YAML).await.unwrap();

        let doc = OpenApiSource::File(path).fetch().await.unwrap();
        assert!(doc.paths.paths.contains_key("/widgets"));
    }

    #[tokio::test]
    async fn test_unknown_extension_is_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.txt");
        tokio::fs::write(&path, YAML).await.unwrap();

        assert!(matches!(OpenApiSource::File(path).fetch().await, Err(SourceError::Json(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = OpenApiSource::File(PathBuf::from("/nonexistent/api.yml")).fetch().await;
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn test_fetch_url_by_content_type() {
        let base = serve_once("200 OK", "application/yaml", YAML.to_string()).await;
        let doc = OpenApiSource::parse(&format!("{}/openapi", base), None).fetch().await.unwrap();
        assert_eq!(doc.info.title, "Widgets");
    }

    #[tokio::test]
    async fn test_unauthorized_url() {
        let base = serve_once("401 Unauthorized", "text/plain", String::new()).await;
        let result = OpenApiSource::parse(&format!("{}/openapi.yml", base), None).fetch().await;
        assert!(matches!(result, Err(SourceError::Authentication { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_only_200_is_success() {
        let base = serve_once("204 No Content", "application/json", String::new()).await;
        let result = OpenApiSource::parse(&format!("{}/openapi.json", base), None).fetch().await;
        assert!(matches!(result, Err(SourceError::UnexpectedStatus { status: 204, .. })));
    }
}
