//! CLI argument definitions for both binaries.
//!
//! The wire contract only names positional arguments (`<port>` for the
//! server, `<server_addr> <port>` for the client); `--max-equipment` is an
//! addition needed to make the registry's configured `MAX` capacity
//! reachable from the command line at all (see DESIGN.md).

use std::net::IpAddr;

use clap::Parser;

/// Equipment message broker server.
#[derive(Debug, Parser)]
#[command(name = "eqbroker-server", version, about)]
pub struct ServerArgs {
    /// TCP port to listen on, all interfaces.
    pub port: u16,

    /// Maximum number of simultaneously registered equipment ids.
    #[arg(long, default_value_t = 99)]
    pub max_equipment: u8,
}

/// Equipment message broker client.
#[derive(Debug, Parser)]
#[command(name = "eqbroker-client", version, about)]
pub struct ClientArgs {
    /// Server address to connect to.
    pub server_addr: IpAddr,

    /// Server TCP port.
    pub port: u16,
}
