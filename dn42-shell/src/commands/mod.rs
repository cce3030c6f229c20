//! Built-in commands.

mod general;
mod peer;

use crate::CommandTable;

/// Add the built-in commands to `table`.
pub(crate) fn register(table: &mut CommandTable) {
    table.insert("help", Some(general::HELP), general::help);
    table.insert("greet", Some(general::GREET), general::greet);
    table.insert("whoami", Some(general::WHOAMI), general::whoami);
    table.insert("bye", Some(general::BYE), general::bye);

    table.insert("peers", Some(peer::PEERS), peer::peers);
    table.insert("create", Some(peer::CREATE), peer::create);
    table.insert("remove", Some(peer::REMOVE), peer::remove);
    table.insert("status", Some(peer::STATUS), peer::status);
}
