// Discovery and load errors
//
// Messages are shown to the user verbatim as page-level text, so Display is
// written for people, not logs.

use std::fmt;

/// Failure of a single fetch against a proof source
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    NotFound,
    Status { status: u16, reason: String },
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Status { status, reason } => write!(f, "{} {}", status, reason),
            Self::Transport(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// The proof index (directory listing or manifest) could not be read
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    NotFound { location: String },
    Status { status: u16, reason: String },
    Transport(String),
    Manifest(String),
}

impl DiscoveryError {
    pub(crate) fn from_fetch(e: FetchError, location: &str) -> Self {
        match e {
            FetchError::NotFound => Self::NotFound {
                location: location.to_string(),
            },
            FetchError::Status { status, reason } => Self::Status { status, reason },
            FetchError::Transport(msg) => Self::Transport(msg),
        }
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { location } => write!(f, "Proofs directory not found at {}.", location),
            Self::Status { status, reason } => {
                write!(f, "Failed to fetch directory listing: {} {}", status, reason)
            }
            Self::Transport(msg) => write!(f, "Failed to fetch directory listing: {}", msg),
            Self::Manifest(msg) => write!(f, "Invalid proof manifest: {}", msg),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// One proof document could not be fetched or decoded
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Fetch { id: String, source: FetchError },
    Parse { id: String, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch {
                id,
                source: FetchError::NotFound,
            } => write!(f, "Proof {} not found", id),
            Self::Fetch { id, source } => write!(f, "Failed to fetch proof {}: {}", id, source),
            Self::Parse { id, message } => write!(f, "Proof {} is not valid JSON: {}", id, message),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_messages_distinguish_404() {
        let not_found = DiscoveryError::from_fetch(FetchError::NotFound, "./proofs");
        assert_eq!(not_found.to_string(), "Proofs directory not found at ./proofs.");

        let status = DiscoveryError::from_fetch(
            FetchError::Status {
                status: 500,
                reason: "Internal Server Error".to_string(),
            },
            "./proofs",
        );
        assert_eq!(
            status.to_string(),
            "Failed to fetch directory listing: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_load_messages() {
        let missing = LoadError::Fetch {
            id: "p1".to_string(),
            source: FetchError::NotFound,
        };
        assert_eq!(missing.to_string(), "Proof p1 not found");

        let parse = LoadError::Parse {
            id: "p2".to_string(),
            message: "EOF while parsing".to_string(),
        };
        assert_eq!(parse.to_string(), "Proof p2 is not valid JSON: EOF while parsing");
    }
}
