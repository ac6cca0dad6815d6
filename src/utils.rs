use crate::client::error::ClientError;
use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = "metobs";
const KEY_FILE_NAME: &str = "api-key";

/// Location of the API key file used by [`crate::DmiClient::from_default_key_file`].
pub fn default_key_path() -> Result<PathBuf, ClientError> {
    dirs::config_dir()
        .ok_or(ClientError::KeyPathResolution)
        .map(|p| p.join(CONFIG_DIR_NAME).join(KEY_FILE_NAME))
}
