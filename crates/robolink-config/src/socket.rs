use std::fmt;
use std::fs::DirBuilder;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::de::{self, MapAccess, Visitor, value::MapAccessDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use crate::defaults::DEFAULT_TCP_PORT;

/// Declarative configuration for the daemon's listening socket.
///
/// Deserialises from either a socket URL (`tcp://127.0.0.1:9780`, the form
/// environment variables carry) or a table tagged by `transport`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum SocketEndpoint {
    /// Unix domain socket endpoint.
    Unix {
        /// Filesystem path of the socket.
        path: Utf8PathBuf,
    },
    /// TCP socket endpoint.
    Tcp {
        /// Host name or address to bind.
        host: String,
        /// Port to bind; zero picks an ephemeral port.
        port: u16,
    },
}

impl SocketEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP socket endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Returns the Unix socket path when the endpoint uses the Unix transport.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Ensures a Unix socket's parent directory exists with restrictive
    /// permissions. TCP endpoints need no preparation.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
            return Err(SocketPreparationError::MissingParent {
                path: path.to_path_buf(),
            });
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        if let Err(source) = builder.create(parent.as_std_path())
            && source.kind() != std::io::ErrorKind::AlreadyExists
        {
            return Err(SocketPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}

/// Table form accepted in configuration files.
#[derive(Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
enum TaggedEndpoint {
    Unix { path: Utf8PathBuf },
    Tcp { host: String, port: u16 },
}

impl From<TaggedEndpoint> for SocketEndpoint {
    fn from(tagged: TaggedEndpoint) -> Self {
        match tagged {
            TaggedEndpoint::Unix { path } => Self::Unix { path },
            TaggedEndpoint::Tcp { host, port } => Self::Tcp { host, port },
        }
    }
}

struct EndpointVisitor;

impl<'de> Visitor<'de> for EndpointVisitor {
    type Value = SocketEndpoint;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a socket URL or a table with a `transport` key")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(E::custom)
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        TaggedEndpoint::deserialize(MapAccessDeserializer::new(map)).map(SocketEndpoint::from)
    }
}

impl<'de> Deserialize<'de> for SocketEndpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(EndpointVisitor)
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    /// Parses `unix:///path`, `tcp://host:port` or `ws://host[:port]`.
    ///
    /// `ws` is accepted as a TCP alias so operators can paste the URL their
    /// clients connect to; its port defaults to [`DEFAULT_TCP_PORT`].
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(SocketParseError::MissingUnixPath(input.to_owned()));
                }
                Ok(Self::unix(path))
            }
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| SocketParseError::MissingHost(input.to_owned()))?;
                let port = url
                    .port()
                    .ok_or_else(|| SocketParseError::MissingPort(input.to_owned()))?;
                Ok(Self::tcp(host, port))
            }
            "ws" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| SocketParseError::MissingHost(input.to_owned()))?;
                Ok(Self::tcp(host, url.port().unwrap_or(DEFAULT_TCP_PORT)))
            }
            other => Err(SocketParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

/// Errors encountered while parsing a [`SocketEndpoint`] from text.
#[derive(Debug, Error)]
pub enum SocketParseError {
    /// Scheme was not recognised.
    #[error("unsupported socket scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing from the address.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing when creating a Unix socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// Configured socket path.
        path: Utf8PathBuf,
    },
    /// Failed to create or adjust socket directories.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::de::value::{Error as ValueError, MapDeserializer, StrDeserializer};

    use super::*;

    #[test]
    fn display_unix_socket() {
        let endpoint = SocketEndpoint::unix(Utf8PathBuf::from("/tmp/robolink.sock"));
        assert_eq!(endpoint.to_string(), "unix:///tmp/robolink.sock");
    }

    #[rstest]
    #[case("tcp://127.0.0.1:9000", SocketEndpoint::tcp("127.0.0.1", 9000))]
    #[case("ws://localhost:8080", SocketEndpoint::tcp("localhost", 8080))]
    #[case("ws://localhost", SocketEndpoint::tcp("localhost", DEFAULT_TCP_PORT))]
    #[case("unix:///run/robolink.sock", SocketEndpoint::unix("/run/robolink.sock"))]
    fn parses_endpoints(#[case] input: &str, #[case] expected: SocketEndpoint) {
        let endpoint: SocketEndpoint = input.parse().expect("parse endpoint");
        assert_eq!(endpoint, expected);
    }

    #[test]
    fn rejects_tcp_without_port() {
        let error = "tcp://127.0.0.1"
            .parse::<SocketEndpoint>()
            .expect_err("port is required");
        assert!(matches!(error, SocketParseError::MissingPort(_)));
    }

    #[test]
    fn rejects_unknown_scheme() {
        let error = "http://127.0.0.1:80"
            .parse::<SocketEndpoint>()
            .expect_err("scheme is unsupported");
        assert!(matches!(error, SocketParseError::UnsupportedScheme(_)));
    }

    #[rstest]
    #[case("tcp://127.0.0.1:7102", SocketEndpoint::tcp("127.0.0.1", 7102))]
    #[case("unix:///run/robolink.sock", SocketEndpoint::unix("/run/robolink.sock"))]
    fn deserialises_socket_urls(#[case] input: &str, #[case] expected: SocketEndpoint) {
        let deserializer = StrDeserializer::<ValueError>::new(input);
        let endpoint = SocketEndpoint::deserialize(deserializer).expect("deserialise url");
        assert_eq!(endpoint, expected);
    }

    #[test]
    fn deserialises_tagged_tables() {
        let entries = vec![("transport", "unix"), ("path", "/run/robolink.sock")];
        let deserializer = MapDeserializer::<_, ValueError>::new(entries.into_iter());
        let endpoint = SocketEndpoint::deserialize(deserializer).expect("deserialise table");
        assert_eq!(endpoint, SocketEndpoint::unix("/run/robolink.sock"));
    }

    #[test]
    fn rejects_malformed_socket_urls() {
        let deserializer = StrDeserializer::<ValueError>::new("invalid://socket");
        let error = SocketEndpoint::deserialize(deserializer).expect_err("scheme is unsupported");
        assert!(error.to_string().contains("unsupported socket scheme"));
    }

    #[test]
    fn tcp_endpoints_need_no_preparation() {
        SocketEndpoint::tcp("127.0.0.1", 0)
            .prepare_filesystem()
            .expect("tcp endpoints are always ready");
    }

    #[test]
    fn prepares_unix_socket_parent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let socket = dir.path().join("nested").join("robolink.sock");
        let endpoint = SocketEndpoint::unix(socket.to_str().expect("utf8 path"));
        endpoint.prepare_filesystem().expect("prepare parent");
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn rejects_unix_socket_without_parent() {
        let error = SocketEndpoint::unix("robolink.sock")
            .prepare_filesystem()
            .expect_err("relative socket without parent");
        assert!(matches!(error, SocketPreparationError::MissingParent { .. }));
    }
}
