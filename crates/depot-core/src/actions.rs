use super::endpoint::Endpoint;
use super::message::Message;
use super::requests::CheckInRequest;
use super::requests::CheckOutRequest;
use super::view::ViewKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    User(UserAction),
    Reply(ReplyAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Announce the client and request the initial listings for every view.
    Start,
    Connect(Endpoint),
    Descend {
        view: ViewKind,
        child: String,
    },
    Ascend {
        view: ViewKind,
    },
    SelectView(ViewKind),
    CheckIn(CheckInRequest),
    /// Check in every dependency first, then the parent naming the last one.
    CheckInBatch {
        parent: CheckInRequest,
        dependencies: Vec<String>,
    },
    CheckOut(CheckOutRequest),
    ViewFile {
        file_name: String,
    },
    ViewMetadata {
        file_name: String,
    },
    DescribePackage {
        file_name: String,
    },
    ClearStatus,
}

/// Decoded server reply, produced on the receiving thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyAction {
    Directories {
        view: ViewKind,
        names: Vec<String>,
        path: Option<String>,
    },
    Files {
        view: ViewKind,
        names: Vec<String>,
        path: Option<String>,
    },
    Connected {
        server: Option<Endpoint>,
    },
    CheckedIn {
        details: Vec<(String, String)>,
    },
    CheckedOut {
        details: Vec<(String, String)>,
    },
    FileReady {
        file_name: String,
    },
    Metadata {
        lines: Vec<String>,
    },
    PackageDescription {
        lines: Vec<String>,
    },
    ServerQuit,
}

impl ReplyAction {
    pub fn command_name(&self) -> &'static str {
        use super::command::Command;

        match self {
            Self::Directories { view, .. } => Command::GetDirs(*view).name(),
            Self::Files { view, .. } => Command::GetFiles(*view).name(),
            Self::Connected { .. } => Command::ConnectToServer.name(),
            Self::CheckedIn { .. } => Command::CheckInFiles.name(),
            Self::CheckedOut { .. } => Command::CheckOutFiles.name(),
            Self::FileReady { .. } => Command::ViewFile.name(),
            Self::Metadata { .. } => Command::MetadataContent.name(),
            Self::PackageDescription { .. } => Command::BrowseDescription.name(),
            Self::ServerQuit => Command::ServerQuit.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEffect {
    Send(Message),
    /// A requested file arrived in the local files directory.
    ShowFile {
        file_name: String,
    },
    RequestFrame,
}
