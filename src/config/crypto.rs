use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Issues the human-readable confirmation code and the opaque credential hash
/// that binds a QR payload to exactly one appointment record.
#[derive(Debug, Clone, Default)]
pub struct CryptoService;

impl CryptoService {
    /// Uniform draw over 100000..=999999, so the code is always 6 digits with
    /// no leading-zero suppression. Codes are not unique across records.
    pub fn generate_confirmation_code(&self) -> String {
        let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        code.to_string()
    }

    /// SHA-256 over a fresh 16-byte nonce, the record id, the contact address
    /// and the current instant, hex-encoded. The store enforces uniqueness;
    /// callers regenerate with a new nonce if the constraint ever fires.
    pub fn generate_credential_hash(&self, record_id: i64, email: &str) -> String {
        let nonce: [u8; 16] = rand::thread_rng().gen();
        let now_nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(record_id.to_le_bytes());
        hasher.update(email.as_bytes());
        hasher.update(now_nanos.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}
