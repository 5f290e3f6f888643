use base64::Engine;
use std::fs;
use std::path::PathBuf;

use super::error::AssistantError;

const SERVICE_NAME: &str = "com.office-assistant.gemini";
const KEYRING_USER: &str = "gemini_api_key";
const ENV_VAR: &str = "GEMINI_API_KEY";

/// Credential manager for the Gemini API key
///
/// Lookup order: `GEMINI_API_KEY`, OS keychain, then a base64 file under the
/// config directory (keychain access is unreliable in some sandboxes).
pub struct CredentialManager {
    dir: Option<PathBuf>,
    use_env: bool,
    use_keyring: bool,
}

impl CredentialManager {
    pub fn new() -> Self {
        Self {
            dir: dirs::config_dir().map(|dir| dir.join("office-assistant")),
            use_env: true,
            use_keyring: true,
        }
    }

    /// File-only store rooted at `dir` (no env var, no keychain)
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            use_env: false,
            use_keyring: false,
        }
    }

    fn key_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join("gemini_key"))
    }

    fn keyring_entry(&self) -> Option<keyring::Entry> {
        if !self.use_keyring {
            return None;
        }
        keyring::Entry::new(SERVICE_NAME, KEYRING_USER)
            .map_err(|e| tracing::debug!("[Credentials] Keychain unavailable: {}", e))
            .ok()
    }

    /// Store the API key in the keychain (best effort) and the fallback file
    pub fn store_api_key(&self, api_key: &str) -> Result<(), AssistantError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AssistantError::MissingCredential);
        }

        if let Some(entry) = self.keyring_entry() {
            if let Err(e) = entry.set_password(api_key) {
                tracing::warn!("[Credentials] Keychain store failed, using file only: {}", e);
            }
        }

        let path = self
            .key_path()
            .ok_or_else(|| AssistantError::Credentials("Could not determine config directory".into()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AssistantError::Credentials(format!("Failed to create config directory: {}", e))
            })?;
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(api_key);
        fs::write(&path, encoded)
            .map_err(|e| AssistantError::Credentials(format!("Failed to write API key: {}", e)))?;

        tracing::info!("[Credentials] Stored API key in {:?}", path);
        Ok(())
    }

    /// Resolve the API key, or `MissingCredential`
    pub fn get_api_key(&self) -> Result<String, AssistantError> {
        if self.use_env {
            if let Ok(key) = std::env::var(ENV_VAR) {
                if !key.trim().is_empty() {
                    return Ok(key.trim().to_string());
                }
            }
        }

        if let Some(entry) = self.keyring_entry() {
            if let Ok(key) = entry.get_password() {
                return Ok(key);
            }
        }

        if let Some(path) = self.key_path().filter(|p| p.exists()) {
            let encoded = fs::read_to_string(&path)
                .map_err(|e| AssistantError::Credentials(format!("Failed to read API key: {}", e)))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| AssistantError::Credentials(format!("Corrupt API key file: {}", e)))?;
            let key = String::from_utf8(bytes)
                .map_err(|e| AssistantError::Credentials(format!("Invalid UTF-8: {}", e)))?;
            tracing::debug!("[Credentials] Retrieved API key from {:?}", path);
            return Ok(key);
        }

        Err(AssistantError::MissingCredential)
    }

    /// Remove the key from the keychain and the file store
    pub fn delete_api_key(&self) -> Result<(), AssistantError> {
        if let Some(entry) = self.keyring_entry() {
            if let Some(e) = delete_failure(entry.delete_credential()) {
                tracing::warn!("[Credentials] Keychain delete failed: {}", e);
            }
        }

        if let Some(path) = self.key_path().filter(|p| p.exists()) {
            fs::remove_file(&path).map_err(|e| {
                AssistantError::Credentials(format!("Failed to delete API key file: {}", e))
            })?;
            tracing::info!("[Credentials] Deleted API key file {:?}", path);
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_ok()
    }
}

/// A keychain delete error worth reporting; a missing entry is already deleted
fn delete_failure(result: keyring::Result<()>) -> Option<keyring::Error> {
    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => None,
        Err(e) => Some(e),
    }
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new()
    }
}
