use crate::error::Result;
use crate::settings::{save_settings, shellexpand_path, Backend, Settings};
use crate::sheet::sheet_file_name;

pub fn run(mut settings: Settings, data_dir: Option<String>, backend: Option<Backend>) -> Result<()> {
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(backend) = backend {
        settings.backend = backend;
    }

    save_settings(&settings)?;
    super::open_ledger(&settings)?;

    let sheet_path = settings.data_path().join(sheet_file_name(settings.backend));
    println!("Initialized kas at {}", sheet_path.display());
    Ok(())
}
