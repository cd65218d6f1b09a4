//! Reply decoding.
//!
//! Runs on the receiving thread and only reads the just-received message; the
//! resulting `ReplyAction` is what gets handed to the foreground executor.

use thiserror::Error;

use crate::actions::ReplyAction;
use crate::command::Command;
use crate::message::Message;
use crate::message::DESCRIPTION_MARKER;
use crate::message::DIR_MARKER;
use crate::message::FILE_MARKER;
use crate::view::ViewKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("`{command}` reply is missing the `{field}` field")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },
    #[error("`{command}` reply has an empty `{field}` field")]
    EmptyField {
        command: &'static str,
        field: &'static str,
    },
    #[error("`{0}` has no reply handler")]
    NoHandler(&'static str),
}

pub fn decode_reply(command: Command, message: &Message) -> Result<ReplyAction, ReplyError> {
    match command {
        Command::GetDirs(view) => Ok(decode_directories(view, message)),
        Command::GetFiles(view) => Ok(decode_files(view, message)),
        Command::ConnectToServer => Ok(ReplyAction::Connected {
            server: message.sender(),
        }),
        Command::CheckInFiles => Ok(ReplyAction::CheckedIn {
            details: owned_payload(message),
        }),
        Command::CheckOutFiles => Ok(ReplyAction::CheckedOut {
            details: owned_payload(message),
        }),
        Command::ViewFile => decode_file_ready(message),
        Command::MetadataContent => Ok(ReplyAction::Metadata {
            lines: tagged(message, DESCRIPTION_MARKER),
        }),
        Command::BrowseDescription => Ok(ReplyAction::PackageDescription {
            lines: tagged(message, DESCRIPTION_MARKER),
        }),
        Command::ServerQuit => Ok(ReplyAction::ServerQuit),
        Command::CheckIn => Err(ReplyError::NoHandler(command.name())),
    }
}

pub fn decode_directories(view: ViewKind, message: &Message) -> ReplyAction {
    ReplyAction::Directories {
        view,
        names: tagged(message, DIR_MARKER),
        path: message.value("path").map(str::to_string),
    }
}

pub fn decode_files(view: ViewKind, message: &Message) -> ReplyAction {
    ReplyAction::Files {
        view,
        names: tagged(message, FILE_MARKER),
        path: message.value("path").map(str::to_string),
    }
}

fn decode_file_ready(message: &Message) -> Result<ReplyAction, ReplyError> {
    let command = Command::ViewFile.name();
    let raw = message.value("file").ok_or(ReplyError::MissingField {
        command,
        field: "file",
    })?;
    // The server terminates the name with a one-character delimiter.
    let mut file_name = raw.to_string();
    if file_name.pop().is_none() {
        return Err(ReplyError::EmptyField {
            command,
            field: "file",
        });
    }
    Ok(ReplyAction::FileReady { file_name })
}

fn tagged(message: &Message, marker: &str) -> Vec<String> {
    message
        .tagged_values(marker)
        .map(str::to_string)
        .collect()
}

fn owned_payload(message: &Message) -> Vec<(String, String)> {
    message
        .payload()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
