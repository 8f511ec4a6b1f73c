//! WRAITH wallet implementation.
//!
//! [`StealthWallet`] drives key derivation from a platform credential: it keeps
//! track of registered credentials in an injected store, asks the signer for an
//! assertion over a fixed challenge, and derives the spending and viewing keys
//! from it. The result is a [`StealthAccount`], which holds the keys and offers
//! the recipient-side operations.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use zeroize::ZeroizeOnDrop;

use wraith_core::constants::{
    CREDENTIAL_STORAGE_KEY, DEFAULT_SIGNING_MESSAGE, DEFAULT_SIGN_TIMEOUT_SECS,
};
use wraith_core::error::{CredentialFailure, Result, WraithError};
use wraith_core::traits::{CredentialSigner, CredentialStore};
use wraith_core::types::{
    Announcement, CredentialDescriptor, MetaAddress, ScanReport, StealthAddressRecord,
    StealthKeys,
};
use wraith_crypto::{derive_from_assertion, keypair_from_private, EntropySource};

use crate::discovery::{ScanKeys, ScanResult};
use crate::recover::{recover_with_keys, StealthPrivateKey};

/// Configuration for credential-driven key derivation.
#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Challenge signed by the credential; also part of the HKDF info
    pub message: String,
    /// Which part of the assertion seeds the keys
    pub entropy_source: EntropySource,
    /// How long to wait for the signer
    pub sign_timeout: Duration,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            message: DEFAULT_SIGNING_MESSAGE.to_string(),
            entropy_source: EntropySource::default(),
            sign_timeout: Duration::from_secs(DEFAULT_SIGN_TIMEOUT_SECS),
        }
    }
}

impl WalletConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the challenge message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the entropy source.
    pub fn entropy_source(mut self, source: EntropySource) -> Self {
        self.entropy_source = source;
        self
    }

    /// Sets the signer timeout.
    pub fn sign_timeout(mut self, timeout: Duration) -> Self {
        self.sign_timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.message.is_empty() {
            return Err(WraithError::ConfigError("signing message is empty".into()));
        }
        if self.sign_timeout.is_zero() {
            return Err(WraithError::ConfigError("sign timeout must be positive".into()));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH WALLET
// ═══════════════════════════════════════════════════════════════════════════════

/// Credential-driven key derivation.
///
/// All state lives in the injected [`CredentialStore`]; the wallet itself
/// holds no secrets.
pub struct StealthWallet {
    signer: Arc<dyn CredentialSigner>,
    store: Arc<dyn CredentialStore>,
    config: WalletConfig,
}

impl StealthWallet {
    /// Creates a wallet with the default configuration.
    pub fn new(signer: Arc<dyn CredentialSigner>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            signer,
            store,
            config: WalletConfig::default(),
        }
    }

    /// Creates a wallet with a custom configuration.
    pub fn with_config(
        signer: Arc<dyn CredentialSigner>,
        store: Arc<dyn CredentialStore>,
        config: WalletConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            signer,
            store,
            config,
        })
    }

    /// Returns the wallet configuration.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Returns the credentials recorded in the store, oldest first.
    pub async fn known_credentials(&self) -> Result<Vec<CredentialDescriptor>> {
        match self.store.get(CREDENTIAL_STORAGE_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Returns true if at least one credential is recorded.
    pub async fn has_credentials(&self) -> Result<bool> {
        Ok(!self.known_credentials().await?.is_empty())
    }

    /// Forgets every recorded credential. The authenticator is not touched.
    pub async fn clear_credentials(&self) -> Result<()> {
        self.store.remove(CREDENTIAL_STORAGE_KEY).await
    }

    /// Registers a new credential and records its descriptor.
    #[instrument(skip(self))]
    pub async fn register(&self) -> Result<CredentialDescriptor> {
        let descriptor = self.bounded(self.signer.create()).await?;

        let mut known = self.known_credentials().await?;
        if !known.iter().any(|c| c.id == descriptor.id) {
            known.push(descriptor.clone());
            let json = serde_json::to_string(&known)?;
            self.store.set(CREDENTIAL_STORAGE_KEY, &json).await?;
        }

        info!(created_at = %descriptor.created_at, "Registered credential");
        Ok(descriptor)
    }

    /// Derives the account from a recorded credential.
    ///
    /// # Errors
    /// - `CredentialError(NoCredential)` if the store holds no credential
    /// - `CredentialError(Timeout)` if the signer does not answer in time
    /// - other `CredentialError`s as reported by the signer
    /// - `KeyDerivationError` if the assertion cannot seed the keys
    #[instrument(skip(self))]
    pub async fn derive(&self) -> Result<StealthAccount> {
        let known = self.known_credentials().await?;
        if known.is_empty() {
            return Err(CredentialFailure::NoCredential.into());
        }
        self.derive_with(&known).await
    }

    /// Registers a credential if none is recorded, then derives.
    ///
    /// If the authenticator reports that it already holds a credential, the
    /// first recorded descriptor is used instead.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<StealthAccount> {
        if !self.has_credentials().await? {
            match self.register().await {
                Ok(_) => {}
                Err(WraithError::CredentialError(CredentialFailure::AlreadyRegistered)) => {
                    warn!("Authenticator already holds a credential");
                    let known = self.known_credentials().await?;
                    let first = known
                        .first()
                        .cloned()
                        .ok_or(WraithError::CredentialError(CredentialFailure::AlreadyRegistered))?;
                    return self.derive_with(std::slice::from_ref(&first)).await;
                }
                Err(e) => return Err(e),
            }
        }
        self.derive().await
    }

    async fn derive_with(&self, allowed: &[CredentialDescriptor]) -> Result<StealthAccount> {
        debug!(credentials = allowed.len(), "Requesting assertion");
        let assertion = self
            .bounded(self.signer.sign(self.config.message.as_bytes(), allowed))
            .await?;

        let keys = derive_from_assertion(
            &assertion,
            &self.config.message,
            self.config.entropy_source,
        )?;
        let account = StealthAccount::from_keys(keys)?;

        info!(meta_address = %account.meta_address(), "Derived stealth keys");
        Ok(account)
    }

    /// Runs a signer call under the configured timeout.
    ///
    /// Signer errors that are not already credential errors are wrapped as
    /// `CredentialFailure::Other` so they stay distinct from crypto errors.
    async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        let limit = self.config.sign_timeout;
        match tokio::time::timeout(limit, call).await {
            Err(_) => Err(CredentialFailure::Timeout {
                seconds: limit.as_secs(),
            }
            .into()),
            Ok(Err(e @ WraithError::CredentialError(_))) => Err(e),
            Ok(Err(e)) => Err(CredentialFailure::Other(e.to_string()).into()),
            Ok(Ok(value)) => Ok(value),
        }
    }
}

impl std::fmt::Debug for StealthWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthWallet")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH ACCOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// A recipient's derived keys and their meta-address.
///
/// The account holds:
/// - Spending keys: for recovering stealth private keys
/// - Viewing keys: for scanning announcements (can be shared with a scanner)
#[derive(ZeroizeOnDrop)]
pub struct StealthAccount {
    keys: StealthKeys,
    #[zeroize(skip)]
    meta_address: MetaAddress,
    #[zeroize(skip)]
    scan_keys: ScanKeys,
}

impl StealthAccount {
    /// Creates an account from existing keys.
    ///
    /// # Errors
    /// Key errors if a private key is out of range or does not match its
    /// public half.
    pub fn from_keys(keys: StealthKeys) -> Result<Self> {
        for pair in [&keys.spending, &keys.viewing] {
            if keypair_from_private(&pair.private)?.public != pair.public {
                return Err(WraithError::KeyDerivationError(
                    "public key does not match private key".into(),
                ));
            }
        }

        let meta_address = MetaAddress::new(keys.spending.public, keys.viewing.public);
        let scan_keys = ScanKeys::from_stealth_keys(&keys)?;
        Ok(Self {
            keys,
            meta_address,
            scan_keys,
        })
    }

    /// Returns the meta-address for publishing.
    pub fn meta_address(&self) -> &MetaAddress {
        &self.meta_address
    }

    /// Returns the full key set.
    ///
    /// # Security
    /// Contains the spending key. Prefer [`StealthAccount::scan_keys`] for scanning.
    pub fn keys(&self) -> &StealthKeys {
        &self.keys
    }

    /// Returns the keys a scanner needs (no spending capability).
    pub fn scan_keys(&self) -> &ScanKeys {
        &self.scan_keys
    }

    /// Checks one announcement.
    pub fn check(&self, announcement: &Announcement) -> ScanResult {
        self.scan_keys.check(announcement)
    }

    /// Scans announcements in order.
    pub fn scan(&self, announcements: &[Announcement]) -> ScanReport {
        self.scan_keys.scan(announcements)
    }

    /// Recovers the private key for a matched record.
    pub fn recover(&self, record: &StealthAddressRecord) -> Result<StealthPrivateKey> {
        recover_with_keys(record, &self.keys)
    }
}

impl std::fmt::Debug for StealthAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthAccount")
            .field("meta_address", &self.meta_address.encode())
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wraith_core::types::CredentialAssertion;

    // ═══════════════════════════════════════════════════════════════════════════
    // TEST DOUBLES
    // ═══════════════════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct MapStore {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.values.lock().remove(key);
            Ok(())
        }
    }

    enum Behaviour {
        Answer,
        Hang,
        Fail(CredentialFailure),
        Broken,
    }

    struct FakeSigner {
        credential_id: Vec<u8>,
        sign: Behaviour,
        create: Behaviour,
        creates: AtomicUsize,
        signs: AtomicUsize,
        /// Written with this signer's credential when `create` runs, as when
        /// another session records the same authenticator concurrently.
        shared_store: Option<Arc<MapStore>>,
        allowed: Mutex<Vec<CredentialDescriptor>>,
    }

    impl FakeSigner {
        fn new(id: &[u8]) -> Self {
            Self {
                credential_id: id.to_vec(),
                sign: Behaviour::Answer,
                create: Behaviour::Answer,
                creates: AtomicUsize::new(0),
                signs: AtomicUsize::new(0),
                shared_store: None,
                allowed: Mutex::new(Vec::new()),
            }
        }

        async fn act(behaviour: &Behaviour) -> Result<()> {
            match behaviour {
                Behaviour::Answer => Ok(()),
                Behaviour::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
                Behaviour::Fail(failure) => Err(failure.clone().into()),
                Behaviour::Broken => Err(WraithError::InternalError("bridge closed".into())),
            }
        }
    }

    #[async_trait]
    impl CredentialSigner for FakeSigner {
        async fn create(&self) -> Result<CredentialDescriptor> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if let Some(store) = &self.shared_store {
                let recorded = vec![CredentialDescriptor::new(&self.credential_id)];
                store.set(CREDENTIAL_STORAGE_KEY, &serde_json::to_string(&recorded)?).await?;
            }
            Self::act(&self.create).await?;
            Ok(CredentialDescriptor::new(&self.credential_id))
        }

        async fn sign(
            &self,
            challenge: &[u8],
            allowed: &[CredentialDescriptor],
        ) -> Result<CredentialAssertion> {
            self.signs.fetch_add(1, Ordering::SeqCst);
            *self.allowed.lock() = allowed.to_vec();
            Self::act(&self.sign).await?;
            // Signature varies per call, as with real ECDSA authenticators.
            let mut signature = challenge.to_vec();
            signature.extend_from_slice(&self.signs.load(Ordering::SeqCst).to_be_bytes());
            Ok(CredentialAssertion::new(self.credential_id.clone(), signature))
        }
    }

    fn wallet(signer: Arc<FakeSigner>, store: Arc<MapStore>) -> StealthWallet {
        StealthWallet::new(signer, store)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TESTS
    // ═══════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_initialize_registers_once() {
        let signer = Arc::new(FakeSigner::new(b"credential-1"));
        let store = Arc::new(MapStore::default());
        let wallet = wallet(signer.clone(), store.clone());

        let first = wallet.initialize().await.unwrap();
        let second = wallet.initialize().await.unwrap();

        assert_eq!(signer.creates.load(Ordering::SeqCst), 1);
        assert_eq!(signer.signs.load(Ordering::SeqCst), 2);
        assert_eq!(first.meta_address(), second.meta_address());
        assert_eq!(wallet.known_credentials().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_derive_is_deterministic_across_signatures() {
        let signer = Arc::new(FakeSigner::new(b"credential-2"));
        let store = Arc::new(MapStore::default());
        let wallet = wallet(signer, store);
        wallet.register().await.unwrap();

        let a = wallet.derive().await.unwrap();
        let b = wallet.derive().await.unwrap();
        assert_eq!(a.meta_address(), b.meta_address());

        let expected = wraith_crypto::derive_stealth_keys(
            &wraith_crypto::sha256(b"credential-2"),
            DEFAULT_SIGNING_MESSAGE,
        )
        .unwrap();
        assert_eq!(a.meta_address().spending_pk, expected.spending.public);
        assert_eq!(a.meta_address().viewing_pk, expected.viewing.public);
    }

    #[tokio::test]
    async fn test_derive_without_credentials() {
        let wallet = wallet(
            Arc::new(FakeSigner::new(b"x")),
            Arc::new(MapStore::default()),
        );
        assert!(matches!(
            wallet.derive().await,
            Err(WraithError::CredentialError(CredentialFailure::NoCredential))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signer_timeout() {
        let mut signer = FakeSigner::new(b"slow");
        signer.sign = Behaviour::Hang;
        let wallet = StealthWallet::with_config(
            Arc::new(signer),
            Arc::new(MapStore::default()),
            WalletConfig::new().sign_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        wallet.register().await.unwrap();

        let err = wallet.derive().await.unwrap_err();
        assert!(matches!(
            err,
            WraithError::CredentialError(CredentialFailure::Timeout { seconds: 5 })
        ));
        assert!(err.is_recoverable());
        assert!(!err.is_crypto_error());
    }

    #[tokio::test]
    async fn test_user_cancel_propagates() {
        let mut signer = FakeSigner::new(b"cancel");
        signer.sign = Behaviour::Fail(CredentialFailure::UserCancelled);
        let wallet = wallet(Arc::new(signer), Arc::new(MapStore::default()));
        wallet.register().await.unwrap();

        assert!(matches!(
            wallet.derive().await,
            Err(WraithError::CredentialError(CredentialFailure::UserCancelled))
        ));
    }

    #[tokio::test]
    async fn test_foreign_signer_error_is_credential_error() {
        let mut signer = FakeSigner::new(b"broken");
        signer.sign = Behaviour::Broken;
        let wallet = wallet(Arc::new(signer), Arc::new(MapStore::default()));
        wallet.register().await.unwrap();

        let err = wallet.derive().await.unwrap_err();
        assert!(err.is_credential_error());
        assert!(err.to_string().contains("bridge closed"));
    }

    #[tokio::test]
    async fn test_existing_credentials_skip_registration() {
        let store = Arc::new(MapStore::default());
        let original = Arc::new(FakeSigner::new(b"existing"));
        wallet(original, store.clone()).register().await.unwrap();

        let mut refusing = FakeSigner::new(b"existing");
        refusing.create = Behaviour::Fail(CredentialFailure::AlreadyRegistered);
        let refusing = Arc::new(refusing);
        let wallet = wallet(refusing.clone(), store);

        assert!(wallet.initialize().await.is_ok());
        assert_eq!(refusing.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_already_registered_uses_recorded_credential() {
        let store = Arc::new(MapStore::default());
        let mut signer = FakeSigner::new(b"raced");
        signer.create = Behaviour::Fail(CredentialFailure::AlreadyRegistered);
        signer.shared_store = Some(store.clone());
        let signer = Arc::new(signer);
        let wallet = wallet(signer.clone(), store);
        assert!(!wallet.has_credentials().await.unwrap());

        let account = wallet.initialize().await.unwrap();

        assert_eq!(signer.creates.load(Ordering::SeqCst), 1);
        assert_eq!(signer.signs.load(Ordering::SeqCst), 1);
        let allowed = signer.allowed.lock().clone();
        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed[0].id, hex::encode(b"raced"));

        let expected = wraith_crypto::derive_stealth_keys(
            &wraith_crypto::sha256(b"raced"),
            DEFAULT_SIGNING_MESSAGE,
        )
        .unwrap();
        assert_eq!(account.meta_address().spending_pk, expected.spending.public);
    }

    #[tokio::test]
    async fn test_already_registered_with_empty_store() {
        let mut signer = FakeSigner::new(b"lost");
        signer.create = Behaviour::Fail(CredentialFailure::AlreadyRegistered);
        let wallet = wallet(Arc::new(signer), Arc::new(MapStore::default()));

        assert!(matches!(
            wallet.initialize().await,
            Err(WraithError::CredentialError(CredentialFailure::AlreadyRegistered))
        ));
    }

    #[tokio::test]
    async fn test_not_supported_on_create() {
        let mut signer = FakeSigner::new(b"none");
        signer.create = Behaviour::Fail(CredentialFailure::NotSupported);
        let wallet = wallet(Arc::new(signer), Arc::new(MapStore::default()));

        assert!(matches!(
            wallet.initialize().await,
            Err(WraithError::CredentialError(CredentialFailure::NotSupported))
        ));
        assert!(!wallet.has_credentials().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_credentials() {
        let wallet = wallet(
            Arc::new(FakeSigner::new(b"clear")),
            Arc::new(MapStore::default()),
        );
        wallet.register().await.unwrap();
        assert!(wallet.has_credentials().await.unwrap());

        wallet.clear_credentials().await.unwrap();
        assert!(!wallet.has_credentials().await.unwrap());
    }

    #[tokio::test]
    async fn test_message_changes_keys() {
        let store = Arc::new(MapStore::default());
        let signer = Arc::new(FakeSigner::new(b"msg"));
        let default = wallet(signer.clone(), store.clone());
        default.register().await.unwrap();

        let custom = StealthWallet::with_config(
            signer,
            store,
            WalletConfig::new().message("another-challenge"),
        )
        .unwrap();

        let a = default.derive().await.unwrap();
        let b = custom.derive().await.unwrap();
        assert_ne!(a.meta_address(), b.meta_address());
    }

    #[test]
    fn test_config_validation() {
        assert!(WalletConfig::new().validate().is_ok());
        assert!(WalletConfig::new().message("").validate().is_err());
        assert!(WalletConfig::new()
            .sign_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_account_roundtrip() {
        let keys = wraith_crypto::derive_stealth_keys(b"account", DEFAULT_SIGNING_MESSAGE).unwrap();
        let account = StealthAccount::from_keys(keys).unwrap();

        let generated = crate::payment::generate_for(account.meta_address()).unwrap();
        let report = account.scan(&[generated.to_announcement()]);
        assert_eq!(report.matches.len(), 1);

        let key = account.recover(&report.matches[0]).unwrap();
        assert_eq!(key.address(), generated.stealth_address);
    }

    #[test]
    fn test_account_rejects_mismatched_keys() {
        let a = wraith_crypto::derive_stealth_keys(b"a", DEFAULT_SIGNING_MESSAGE).unwrap();
        let b = wraith_crypto::derive_stealth_keys(b"b", DEFAULT_SIGNING_MESSAGE).unwrap();
        let mixed = StealthKeys::new(
            wraith_core::KeyPair::new(a.spending.public, b.spending.private.clone()),
            a.viewing.clone(),
        );
        assert!(StealthAccount::from_keys(mixed).is_err());
    }

    #[test]
    fn test_account_debug_redacts() {
        let keys = wraith_crypto::derive_stealth_keys(b"debug", DEFAULT_SIGNING_MESSAGE).unwrap();
        let spending_hex = keys.spending.private.to_hex();
        let account = StealthAccount::from_keys(keys).unwrap();

        let debug = format!("{:?}", account);
        assert!(debug.contains("st:eth:0x"));
        assert!(!debug.contains(&spending_hex[2..]));
    }
}
