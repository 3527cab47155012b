use crate::error::{LedgerError, Result};
use crate::server;
use crate::settings::Settings;

pub fn run(mut settings: Settings, addr: Option<String>) -> Result<()> {
    if let Some(addr) = addr {
        settings.listen_addr = addr;
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(server::serve(&settings))
        .map_err(|e| LedgerError::Other(format!("{e:#}")))
}
