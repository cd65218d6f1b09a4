use std::collections::HashMap;
use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;

use depot_core::decode_reply;
use depot_core::Command;
use depot_core::Message;
use depot_core::ReplyAction;
use depot_core::ReplyError;

/// Decodes one reply on the receiving thread.
pub type Handler = fn(Command, &Message) -> Result<ReplyAction, ReplyError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Handled(ReplyAction),
    MissingCommand,
    Unregistered(String),
    Failed {
        command: &'static str,
        error: ReplyError,
    },
    Panicked {
        command: &'static str,
    },
}

/// Command name to handler. Frozen once built.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    handlers: HashMap<&'static str, (Command, Handler)>,
}

#[derive(Debug, Default)]
pub struct DispatchTableBuilder {
    handlers: HashMap<&'static str, (Command, Handler)>,
}

impl DispatchTableBuilder {
    pub fn register(mut self, command: Command, handler: Handler) -> Self {
        self.handlers.insert(command.name(), (command, handler));
        self
    }

    pub fn build(self) -> DispatchTable {
        DispatchTable {
            handlers: self.handlers,
        }
    }
}

impl DispatchTable {
    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder::default()
    }

    /// Every command that has a reply, decoded by the shared reply decoder.
    /// The four view-qualified listing families resolve to the same handler.
    pub fn standard() -> Self {
        Command::all()
            .into_iter()
            .filter(|command| command.has_reply_handler())
            .fold(Self::builder(), |builder, command| {
                builder.register(command, decode_reply)
            })
            .build()
    }

    pub fn resolve(&self, name: &str) -> Option<Command> {
        self.handlers.get(name).map(|(command, _)| *command)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(&self, message: &Message) -> Dispatch {
        let Some(name) = message.command() else {
            return Dispatch::MissingCommand;
        };
        let Some((command, handler)) = self.handlers.get(name) else {
            return Dispatch::Unregistered(name.to_string());
        };
        let command = *command;
        match catch_unwind(AssertUnwindSafe(|| handler(command, message))) {
            Ok(Ok(action)) => Dispatch::Handled(action),
            Ok(Err(error)) => Dispatch::Failed {
                command: command.name(),
                error,
            },
            Err(_) => Dispatch::Panicked {
                command: command.name(),
            },
        }
    }
}
