//! Peering commands: `peers`, `create`, `remove` and `status`.
//!
//! Every command taking an AS number only acts on AS numbers maintained by
//! the session identity.

use crate::{endpoint_ipv6, is_wireguard_key, Context, Flow, Justify, Table};
use registry::Asn;
use std::net::IpAddr;
use tracing::{info, warn};

pub(super) const PEERS: &str = "peers\nList known peers.";
pub(super) const CREATE: &str = concat!(
    "create <asn> <wg-public-key> <endpoint> <port>\n",
    "Create a WireGuard peering with one of your AS numbers.",
);
pub(super) const REMOVE: &str = "remove <asn>\nRemove the peering with one of your AS numbers.";
pub(super) const STATUS: &str = "status <asn>\nShow the peering status of one of your AS numbers.";

/// First line of a command's help text.
fn usage(ctx: &mut Context<'_>, help: &str) -> Flow {
    let synopsis = help.lines().next().unwrap_or(help);
    ctx.output.line(format!("*** Usage: {synopsis}"));
    Flow::Continue
}

/// Parse `arg` as an AS number maintained by the session identity.
///
/// Writes the denial and returns `None` otherwise.
fn owned_asn(ctx: &mut Context<'_>, command: &str, arg: &str) -> Option<Asn> {
    let Some(asn) = Asn::parse_user_input(arg) else {
        ctx.output.line(format!("*** Invalid AS number: {arg}"));
        return None;
    };

    if ctx.identity.owns(&asn) {
        return Some(asn);
    }

    let user = ctx.identity.username();
    warn!(user, asn = %asn, command, "AS not maintained by user");
    ctx.output.line(format!("*** AS{asn} is not maintained by {user}"));
    None
}

pub(super) fn peers(ctx: &mut Context<'_>, _args: &str) -> Flow {
    let mut table = Table::new("Known peers").column("AS", Justify::Right);

    for asn in ctx.peering.list_peers() {
        table.row([asn.to_string()]);
    }

    ctx.output.table(&table);
    Flow::Continue
}

pub(super) fn create(ctx: &mut Context<'_>, args: &str) -> Flow {
    let [asn, key, endpoint, port] = match args.split_whitespace().collect::<Vec<_>>()[..] {
        [asn, key, endpoint, port] => [asn, key, endpoint, port],
        _ => return usage(ctx, CREATE),
    };

    let Some(asn) = owned_asn(ctx, "create", asn) else {
        return Flow::Continue;
    };

    if !is_wireguard_key(key) {
        ctx.output.line(format!("*** Invalid WireGuard public key: {key}"));
        return Flow::Continue;
    }

    let port = match port.parse::<u16>() {
        Ok(port) if port != 0 => port,
        _ => {
            ctx.output.line(format!("*** Invalid port: {port}"));
            return Flow::Continue;
        }
    };

    let Some(address) = endpoint_ipv6(endpoint).into_iter().next() else {
        ctx.output
            .line(format!("*** Endpoint {endpoint} has no IPv6 address"));
        return Flow::Continue;
    };

    if ctx
        .peering
        .peer_create(&asn, key, IpAddr::V6(address), port)
    {
        info!(user = ctx.identity.username(), asn = %asn, "peering created");
        ctx.output.line(format!("Peering with AS{asn} created"));
    } else {
        ctx.output
            .line(format!("*** Could not create peering with AS{asn}"));
    }

    Flow::Continue
}

pub(super) fn remove(ctx: &mut Context<'_>, args: &str) -> Flow {
    let [asn] = match args.split_whitespace().collect::<Vec<_>>()[..] {
        [asn] => [asn],
        _ => return usage(ctx, REMOVE),
    };

    let Some(asn) = owned_asn(ctx, "remove", asn) else {
        return Flow::Continue;
    };

    if ctx.peering.peer_remove(&asn) {
        info!(user = ctx.identity.username(), asn = %asn, "peering removed");
        ctx.output.line(format!("Peering with AS{asn} removed"));
    } else {
        ctx.output
            .line(format!("*** Could not remove peering with AS{asn}"));
    }

    Flow::Continue
}

pub(super) fn status(ctx: &mut Context<'_>, args: &str) -> Flow {
    let [asn] = match args.split_whitespace().collect::<Vec<_>>()[..] {
        [asn] => [asn],
        _ => return usage(ctx, STATUS),
    };

    let Some(asn) = owned_asn(ctx, "status", asn) else {
        return Flow::Continue;
    };

    match ctx.peering.peer_status(&asn) {
        Some(status) => {
            let mut table = Table::new(format!("AS{asn}"))
                .column("Peer", Justify::Left)
                .column("State", Justify::Left);
            table.row([format!("AS{}", status.asn), status.state.to_string()]);
            ctx.output.table(&table);
        }
        None => ctx.output.line(format!("No peering with AS{asn}")),
    }

    Flow::Continue
}
