//! Credential bookkeeping types.
//!
//! The platform authenticator is an external collaborator; these are the
//! values exchanged with it through [`crate::CredentialSigner`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::CREDENTIAL_KIND;
use crate::error::Result;

/// A registered credential, as persisted in the credential store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    /// Credential identifier, hex encoded
    pub id: String,
    /// Credential type, always `"public-key"` for WebAuthn
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// When the credential was registered
    pub created_at: DateTime<Utc>,
}

fn default_kind() -> String {
    CREDENTIAL_KIND.to_string()
}

impl CredentialDescriptor {
    /// Creates a descriptor for a freshly registered credential.
    pub fn new(id: &[u8]) -> Self {
        Self {
            id: hex::encode(id),
            kind: default_kind(),
            created_at: Utc::now(),
        }
    }

    /// Decodes the credential identifier.
    pub fn id_bytes(&self) -> Result<Vec<u8>> {
        Ok(hex::decode(&self.id)?)
    }
}

/// What the signer returns for a challenge.
///
/// The credential identifier feeds key derivation, so both fields are treated
/// as secret.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialAssertion {
    /// Raw identifier of the credential that signed
    pub credential_id: Vec<u8>,
    /// Raw assertion signature
    pub signature: Vec<u8>,
}

impl CredentialAssertion {
    /// Creates an assertion.
    pub fn new(credential_id: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            credential_id,
            signature,
        }
    }
}

impl std::fmt::Debug for CredentialAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialAssertion")
            .field("credential_id", &"[REDACTED]")
            .field("signature_len", &self.signature.len())
            .finish()
    }
}
