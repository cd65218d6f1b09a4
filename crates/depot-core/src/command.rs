//! Closed vocabulary of protocol commands.
//!
//! The wire protocol encodes view identity inside the command string
//! (`getDirsForBrowse`, `getFilesForCheckOut`, ...). `Command` keeps that
//! identity as a `ViewKind` instead of a string suffix.

use crate::view::ViewKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetDirs(ViewKind),
    GetFiles(ViewKind),
    ConnectToServer,
    CheckIn,
    CheckInFiles,
    CheckOutFiles,
    ViewFile,
    MetadataContent,
    BrowseDescription,
    ServerQuit,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Self::GetDirs(ViewKind::Browse) => "getDirsForBrowse",
            Self::GetDirs(ViewKind::ViewFile) => "getDirsForViewFile",
            Self::GetDirs(ViewKind::CheckOut) => "getDirsForCheckOut",
            Self::GetDirs(ViewKind::ViewMetadata) => "getDirsForViewMetadata",
            Self::GetFiles(ViewKind::Browse) => "getFilesForBrowse",
            Self::GetFiles(ViewKind::ViewFile) => "getFilesForViewFile",
            Self::GetFiles(ViewKind::CheckOut) => "getFilesForCheckOut",
            Self::GetFiles(ViewKind::ViewMetadata) => "getFilesForViewMetadata",
            Self::ConnectToServer => "connectToServer",
            Self::CheckIn => "checkIn",
            Self::CheckInFiles => "checkInFiles",
            Self::CheckOutFiles => "checkOutFiles",
            Self::ViewFile => "viewFile",
            Self::MetadataContent => "metadataContent",
            Self::BrowseDescription => "browseDescription",
            Self::ServerQuit => "serverQuit",
        }
    }

    /// Every command in the vocabulary, view-qualified families expanded.
    pub fn all() -> Vec<Command> {
        let mut commands = Vec::with_capacity(16);
        commands.extend(ViewKind::ALL.into_iter().map(Command::GetDirs));
        commands.extend(ViewKind::ALL.into_iter().map(Command::GetFiles));
        commands.extend([
            Command::ConnectToServer,
            Command::CheckIn,
            Command::CheckInFiles,
            Command::CheckOutFiles,
            Command::ViewFile,
            Command::MetadataContent,
            Command::BrowseDescription,
            Command::ServerQuit,
        ]);
        commands
    }

    /// Exact, case-sensitive lookup of a wire command name.
    pub fn parse(name: &str) -> Option<Command> {
        Self::all().into_iter().find(|command| command.name() == name)
    }

    /// Whether the server answers this command with a reply the client handles.
    /// `checkIn` only stages a file and its acknowledgement is ignored.
    pub fn has_reply_handler(self) -> bool {
        !matches!(self, Self::CheckIn)
    }
}
