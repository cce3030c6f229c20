//! Session commands: `help`, `greet`, `whoami` and `bye`.

use crate::{Context, Flow, Justify, Table};
use registry::maintainer_name;

pub(super) const HELP: &str =
    "help [command]\nList available commands, or show help for one command.";
pub(super) const GREET: &str = "greet [name]\nSay hello.";
pub(super) const WHOAMI: &str = "whoami\nShow the maintainer and AS numbers of this session.";
pub(super) const BYE: &str = "bye\nEnd the session.";

const DOCUMENTED: &str = "Documented commands (type help <topic>):";
const UNDOCUMENTED: &str = "Undocumented commands:";

pub(super) fn help(ctx: &mut Context<'_>, args: &str) -> Flow {
    let topic = args.trim();

    if !topic.is_empty() {
        match ctx.commands.get(topic).and_then(|command| command.help()) {
            Some(help) => ctx.output.line(help),
            None => ctx.output.line(format!("*** No help on {topic}")),
        }

        return Flow::Continue;
    }

    let (documented, undocumented): (Vec<_>, Vec<_>) = ctx
        .commands
        .iter()
        .partition(|(_, command)| command.help().is_some());

    let mut text = String::new();

    for (header, commands) in [(DOCUMENTED, documented), (UNDOCUMENTED, undocumented)] {
        if commands.is_empty() {
            continue;
        }

        let names: Vec<&str> = commands.iter().map(|(name, _)| **name).collect();
        text.push_str(header);
        text.push('\n');
        text.push_str(&"=".repeat(header.len()));
        text.push('\n');
        text.push_str(&names.join("  "));
        text.push_str("\n\n");
    }

    ctx.output.line(text);
    Flow::Continue
}

pub(super) fn greet(ctx: &mut Context<'_>, args: &str) -> Flow {
    match args.trim() {
        "" => ctx.output.line("Hello there!"),
        name => ctx.output.line(format!("Hey {name}! Nice to see you!")),
    }

    Flow::Continue
}

pub(super) fn whoami(ctx: &mut Context<'_>, _args: &str) -> Flow {
    let identity = ctx.identity;
    let maintainer = maintainer_name(identity.username());

    let mut table = Table::new(format!("Logged in as {}", identity.username()))
        .column("Maintainer", Justify::Left)
        .column("AS", Justify::Right);

    if identity.asns().is_empty() {
        table.row([maintainer.as_str(), "-"]);
    }

    for asn in identity.asns() {
        table.row([maintainer.clone(), format!("AS{asn}")]);
    }

    ctx.output.table(&table);
    Flow::Continue
}

pub(super) fn bye(ctx: &mut Context<'_>, _args: &str) -> Flow {
    ctx.output.line("See you later!");
    Flow::Stop
}
