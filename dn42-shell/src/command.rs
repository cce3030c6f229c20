//! Command table and dispatch context.

use crate::{sanitize, Peering, Table};
use registry::SessionIdentity;
use std::collections::{btree_map, BTreeMap};

/// What the shell does after a command has run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Prompt for the next line.
    Continue,

    /// End the session.
    Stop,
}

/// Command handler: receives the dispatch context and the argument string.
pub type Handler = Box<dyn Fn(&mut Context<'_>, &str) -> Flow + Send + Sync>;

/// Named shell command.
pub struct Command {
    help: Option<&'static str>,
    handler: Handler,
}

impl Command {
    /// One-line help text, if the command is documented.
    pub fn help(&self) -> Option<&'static str> {
        self.help
    }

    /// Run the command.
    pub fn run(&self, ctx: &mut Context<'_>, args: &str) -> Flow {
        (self.handler)(ctx, args)
    }
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Command").field("help", &self.help).finish()
    }
}

/// Mapping from command name to [`Command`].
///
/// Built once and then shared read-only by every session. Iteration is in
/// name order.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: BTreeMap<&'static str, Command>,
}

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the built-in commands.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        crate::commands::register(&mut table);
        table
    }

    /// Add a command, replacing any command with the same name.
    pub fn insert<F>(&mut self, name: &'static str, help: Option<&'static str>, handler: F)
    where
        F: Fn(&mut Context<'_>, &str) -> Flow + Send + Sync + 'static,
    {
        self.commands.insert(
            name,
            Command {
                help,
                handler: Box::new(handler),
            },
        );
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Iterate over commands in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, &'static str, Command> {
        self.commands.iter()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Sanitized text produced by a command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Output {
    text: String,
}

impl Output {
    /// Create empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text, which may span several lines.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.text.push_str(&sanitize(text.as_ref()));
    }

    /// Append a rendered table.
    pub fn table(&mut self, table: &Table) {
        self.line(table.to_string());
    }

    /// Text collected so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Is there no output?
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take the collected text, leaving the output empty.
    pub fn take(&mut self) -> String {
        core::mem::take(&mut self.text)
    }
}

/// State a command handler runs with.
pub struct Context<'a> {
    /// Authenticated session identity.
    pub identity: &'a SessionIdentity,

    /// Peering backend.
    pub peering: &'a dyn Peering,

    /// Command table the command was dispatched from.
    pub commands: &'a CommandTable,

    /// Output sink.
    pub output: &'a mut Output,
}
