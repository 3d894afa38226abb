//! Pre-signed upload authorization.
//!
//! Upload resources can be authorized by a time-limited grant computed
//! from a shared secret instead of the account password: the client sends
//! `md5(secret ‖ expiry ‖ nonce)` plus the expiry and nonce, and the
//! service validates the digest within the validity window. Revoking the
//! secret revokes all outstanding grants.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

/// Header carrying the grant metadata as a JSON object.
pub const INFO_HEADER: &str = "x-mg-info";

/// Header carrying the hex digest over the grant.
pub const HMAC_HEADER: &str = "x-mg-hmac";

/// A time-limited authorization for one upload request.
#[derive(Debug, Clone)]
pub struct UploadGrant {
    nonce: String,
    expires_at: i64,
    signature: String,
}

impl UploadGrant {
    /// Build a grant with an explicit expiry timestamp (unix seconds).
    ///
    /// The signature is the lowercase hex md5 digest of the concatenation
    /// `secret + expiry + nonce`. The validity window is enforced by the
    /// service, not locally.
    pub fn with_expiry(secret: &str, expires_at: i64, nonce: impl Into<String>) -> Self {
        let nonce = nonce.into();
        let signature = format!(
            "{:x}",
            md5::compute(format!("{secret}{expires_at}{nonce}"))
        );
        Self {
            nonce,
            expires_at,
            signature,
        }
    }

    /// Build a grant valid for `valid_for_secs` seconds from now, with a
    /// random nonce.
    pub fn new(secret: &str, valid_for_secs: i64) -> Self {
        let expires_at = Utc::now().timestamp() + valid_for_secs;
        let nonce = Uuid::new_v4().simple().to_string();
        Self::with_expiry(secret, expires_at, nonce)
    }

    /// The unique message nonce (`msg_data`).
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Expiry as a unix timestamp (`msg_timestamp`).
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Hex digest to send in the hmac header.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Render the JSON value of the info header.
    ///
    /// Always starts with `msg_data` and `msg_timestamp`; callers add the
    /// resource-specific fields (publish location, formatgroup, ...).
    /// Timestamps travel as strings, matching what the services expect.
    /// Field order is preserved, so the header value is deterministic.
    pub fn info(&self, extra: &[(&str, Value)]) -> String {
        let mut fields: Vec<(&str, Value)> = vec![
            ("msg_data", Value::String(self.nonce.clone())),
            ("msg_timestamp", Value::String(self.expires_at.to_string())),
        ];
        fields.extend(extra.iter().map(|(name, value)| (*name, value.clone())));

        let rendered: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!("{}:{}", Value::String((*name).to_string()), value))
            .collect();
        format!("{{{}}}", rendered.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signature_known_vector() {
        let grant = UploadGrant::with_expiry("s", 1_700_000_000, "abc");
        // md5("s" + "1700000000" + "abc")
        assert_eq!(grant.signature(), "4bb6351db85d71d11c5702df85b45475");
    }

    #[test]
    fn test_signature_depends_on_all_inputs() {
        let base = UploadGrant::with_expiry("secret", 1_700_000_000, "nonce");
        assert_eq!(base.signature(), "78bc3f60ad29ee3de95d4115b67d2eb5");
        assert_ne!(
            UploadGrant::with_expiry("other", 1_700_000_000, "nonce").signature(),
            base.signature()
        );
        assert_ne!(
            UploadGrant::with_expiry("secret", 1_700_000_001, "nonce").signature(),
            base.signature()
        );
        assert_ne!(
            UploadGrant::with_expiry("secret", 1_700_000_000, "other").signature(),
            base.signature()
        );
    }

    #[test]
    fn test_info_fields() {
        let grant = UploadGrant::with_expiry("s", 1_700_000_000, "abc");
        let rendered = grant.info(&[
            ("publish_filename", json!("movie.mp4")),
            ("publish_dir", json!("uploads")),
        ]);

        assert_eq!(
            rendered,
            r#"{"msg_data":"abc","msg_timestamp":"1700000000","publish_filename":"movie.mp4","publish_dir":"uploads"}"#
        );

        let info: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(info["msg_data"], "abc");
        // timestamp is sent as a string
        assert_eq!(info["msg_timestamp"], "1700000000");
    }

    #[test]
    fn test_random_nonce_is_unique() {
        let a = UploadGrant::new("s", 30);
        let b = UploadGrant::new("s", 30);
        assert_ne!(a.nonce(), b.nonce());
    }
}
