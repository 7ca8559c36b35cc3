use std::io;
use tracing::debug;

/// Check the stdio setup before serving.
///
/// A terminal on stdin is allowed so the server can be driven by hand.
pub fn validate_stdio_transport() -> io::Result<()> {
    if atty::is(atty::Stream::Stdin) {
        debug!("Stdin is a terminal; expecting hand-typed JSON-RPC");
    } else {
        debug!("Stdin is piped; ready for MCP client");
    }

    if atty::is(atty::Stream::Stdout) {
        debug!("Stdout is a terminal; responses will be printed as-is");
    }

    Ok(())
}
