//! Ordered, string-keyed protocol message.
//!
//! Attribute order is part of the protocol: replies carry an unbounded group
//! of same-kind results under keys that merely *contain* a marker such as
//! `"dir"` or `"file"`, and consumers recover the group in insertion order.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::endpoint::Endpoint;

pub const KEY_TO: &str = "to";
pub const KEY_FROM: &str = "from";
pub const KEY_COMMAND: &str = "command";

pub const DIR_MARKER: &str = "dir";
pub const FILE_MARKER: &str = "file";
pub const DESCRIPTION_MARKER: &str = "description";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    attributes: IndexMap<String, String>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a message with the reserved routing keys in protocol order.
    pub fn routed(to: &Endpoint, from: &Endpoint, command: &str) -> Self {
        let mut msg = Self::new();
        msg.add(KEY_TO, to.token());
        msg.add(KEY_FROM, from.token());
        msg.add(KEY_COMMAND, command);
        msg
    }

    /// Adds an attribute. An existing key keeps its position and takes the new value.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Removes an attribute without disturbing the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The `command` value, treating an empty string as absent.
    pub fn command(&self) -> Option<&str> {
        self.value(KEY_COMMAND).filter(|command| !command.is_empty())
    }

    pub fn recipient(&self) -> Option<Endpoint> {
        self.value(KEY_TO).and_then(|token| token.parse().ok())
    }

    pub fn sender(&self) -> Option<Endpoint> {
        self.value(KEY_FROM).and_then(|token| token.parse().ok())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Values of every attribute whose key contains `marker`, in insertion order.
    pub fn tagged_values<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes()
            .filter(move |(key, _)| key.contains(marker))
            .map(|(_, value)| value)
    }

    /// Attributes other than `to`, `from` and `command`.
    pub fn payload(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes()
            .filter(|(key, _)| !matches!(*key, KEY_TO | KEY_FROM | KEY_COMMAND))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Message
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut msg = Self::new();
        for (key, value) in iter {
            msg.add(key, value);
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn routed_message_starts_with_reserved_keys() {
        let msg = Message::routed(
            &Endpoint::new("localhost", 8080),
            &Endpoint::new("localhost", 8082),
            "getDirsForBrowse",
        );
        let keys: Vec<&str> = msg.attributes().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["to", "from", "command"]);
        assert_eq!(msg.command(), Some("getDirsForBrowse"));
        assert_eq!(msg.recipient(), Some(Endpoint::new("localhost", 8080)));
    }

    #[test]
    fn tagged_values_follow_insertion_order() {
        let msg: Message = [
            ("command", "getDirsForBrowse"),
            ("dir2", "zeta"),
            ("other", "x"),
            ("dir1", "alpha"),
            ("subdir", "beta"),
        ]
        .into_iter()
        .collect();
        let dirs: Vec<&str> = msg.tagged_values(DIR_MARKER).collect();
        assert_eq!(dirs, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn remove_keeps_remaining_order_and_readd_appends() {
        let mut msg: Message = [("a", "1"), ("command", "x"), ("b", "2")]
            .into_iter()
            .collect();
        msg.remove("command");
        msg.add("command", "y");
        let keys: Vec<&str> = msg.attributes().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b", "command"]);
    }

    #[test]
    fn add_existing_key_replaces_in_place() {
        let mut msg: Message = [("a", "1"), ("b", "2")].into_iter().collect();
        msg.add("a", "3");
        let pairs: Vec<(&str, &str)> = msg.attributes().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn empty_command_reads_as_absent() {
        let msg = Message::new().with("command", "");
        assert_eq!(msg.command(), None);
        assert_eq!(Message::new().command(), None);
    }

    #[test]
    fn payload_skips_routing_keys() {
        let msg = Message::routed(
            &Endpoint::new("localhost", 8080),
            &Endpoint::new("localhost", 8082),
            "checkInFiles",
        )
        .with("status", "accepted");
        let payload: Vec<(&str, &str)> = msg.payload().collect();
        assert_eq!(payload, vec![("status", "accepted")]);
    }
}
