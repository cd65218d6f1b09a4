use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Browse,
    ViewFile,
    CheckOut,
    ViewMetadata,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Browse,
        ViewKind::ViewFile,
        ViewKind::CheckOut,
        ViewKind::ViewMetadata,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Browse => 0,
            Self::ViewFile => 1,
            Self::CheckOut => 2,
            Self::ViewMetadata => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Browse => "Browse",
            Self::ViewFile => "View File",
            Self::CheckOut => "Check Out",
            Self::ViewMetadata => "View Metadata",
        }
    }

    /// Short name accepted by the shell (`browse`, `view`, `checkout`, `meta`).
    pub fn slug(self) -> &'static str {
        match self {
            Self::Browse => "browse",
            Self::ViewFile => "view",
            Self::CheckOut => "checkout",
            Self::ViewMetadata => "meta",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "browse" | "b" => Some(Self::Browse),
            "view" | "viewfile" | "v" => Some(Self::ViewFile),
            "checkout" | "co" => Some(Self::CheckOut),
            "meta" | "metadata" | "viewmetadata" | "m" => Some(Self::ViewMetadata),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Browse => Self::ViewFile,
            Self::ViewFile => Self::CheckOut,
            Self::CheckOut => Self::ViewMetadata,
            Self::ViewMetadata => Self::Browse,
        }
    }
}
