//! Spending key recovery for matched stealth addresses.
//!
//! ```text
//! h          = Keccak256(x(viewing_sk · R)) as a scalar
//! stealth_sk = (spending_sk + h) mod n
//! ```
//!
//! The ephemeral key is parsed exactly as the scanner parses it, so any record
//! the scanner emits can be recovered from.

use wraith_core::error::{Result, WraithError};
use wraith_core::types::{EthAddress, PrivateKey, StealthAddressRecord, StealthKeys};
use wraith_crypto::derive::addresses_match;
use wraith_crypto::{
    eth_address, hash_to_scalar, parse_ephemeral_key, secret_key, shared_secret_hash,
    stealth_private_key, PublicKey, SecretKey,
};

/// The private key controlling one stealth address.
///
/// Zeroized on drop (by `k256`). `Debug` shows only the address.
#[derive(Clone)]
pub struct StealthPrivateKey {
    secret: SecretKey,
}

impl StealthPrivateKey {
    /// Returns the underlying secret key.
    pub fn as_secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Returns the key as 32 raw bytes.
    pub fn to_private_key(&self) -> PrivateKey {
        PrivateKey::from_array(self.secret.to_bytes().into())
    }

    /// Returns the key as `0x` followed by 64 hex digits, the form wallets import.
    pub fn to_hex(&self) -> String {
        self.to_private_key().to_hex()
    }

    /// Returns the stealth public key.
    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// Returns the address this key controls.
    pub fn address(&self) -> EthAddress {
        eth_address(&self.public_key())
    }
}

impl std::fmt::Debug for StealthPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthPrivateKey")
            .field("address", &self.address())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Recovers the stealth private key for an announced ephemeral key.
///
/// # Errors
/// - [`WraithError::AnnouncementParseError`] if the ephemeral key does not parse
/// - [`WraithError::StealthDerivationError`] for a degenerate scalar or a zero sum
pub fn recover_stealth_private_key(
    ephemeral_pub_key: &[u8],
    viewing_sk: &SecretKey,
    spending_sk: &SecretKey,
) -> Result<StealthPrivateKey> {
    let ephemeral = parse_ephemeral_key(ephemeral_pub_key)?;
    let hash = shared_secret_hash(viewing_sk, &ephemeral);
    let h = hash_to_scalar(&hash)?;
    let secret = stealth_private_key(spending_sk, &h)?;
    Ok(StealthPrivateKey { secret })
}

/// Recovers the key for a scan record and checks it controls the record's address.
///
/// # Errors
/// [`WraithError::InvalidStealthAddress`] if the recovered key belongs to a
/// different address, which means the record was not produced for these keys.
pub fn recover_for_record(
    record: &StealthAddressRecord,
    viewing_sk: &SecretKey,
    spending_sk: &SecretKey,
) -> Result<StealthPrivateKey> {
    let key = recover_stealth_private_key(&record.ephemeral_public_key, viewing_sk, spending_sk)?;
    if !addresses_match(&key.address(), &record.stealth_address) {
        return Err(WraithError::InvalidStealthAddress(format!(
            "recovered key does not control {}",
            record.stealth_address
        )));
    }
    Ok(key)
}

/// Recovers the key for a scan record from a full key set.
pub fn recover_with_keys(
    record: &StealthAddressRecord,
    keys: &StealthKeys,
) -> Result<StealthPrivateKey> {
    let viewing_sk = secret_key(&keys.viewing.private)?;
    let spending_sk = secret_key(&keys.spending.private)?;
    recover_for_record(record, &viewing_sk, &spending_sk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::scan_announcements;
    use crate::payment::{generate_stealth_address, generate_stealth_address_with_rng};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use wraith_crypto::point::uncompressed;

    fn keys(seed: u64) -> (SecretKey, SecretKey) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        (SecretKey::random(&mut rng), SecretKey::random(&mut rng))
    }

    #[test]
    fn test_recovered_key_controls_generated_address() {
        let (spending, viewing) = keys(1);
        let generated =
            generate_stealth_address(&spending.public_key(), &viewing.public_key()).unwrap();

        let key = recover_stealth_private_key(
            generated.ephemeral_public_key.as_bytes(),
            &viewing,
            &spending,
        )
        .unwrap();
        assert_eq!(key.address(), generated.stealth_address);
    }

    #[test]
    fn test_recovered_public_key_equals_stealth_public_key() {
        let (spending, viewing) = keys(8);
        let generated =
            generate_stealth_address(&spending.public_key(), &viewing.public_key()).unwrap();

        // Sender-side stealth public key for the same ephemeral key.
        let ephemeral = parse_ephemeral_key(generated.ephemeral_public_key.as_bytes()).unwrap();
        let hash = shared_secret_hash(&viewing, &ephemeral);
        let (stealth_pk, _) =
            wraith_crypto::derive_stealth_address(&spending.public_key(), &hash).unwrap();

        let key = recover_stealth_private_key(
            generated.ephemeral_public_key.as_bytes(),
            &viewing,
            &spending,
        )
        .unwrap();
        assert_eq!(key.public_key(), stealth_pk);
    }

    #[test]
    fn test_recover_for_record_checks_address() {
        let (spending, viewing) = keys(2);
        let generated =
            generate_stealth_address(&spending.public_key(), &viewing.public_key()).unwrap();
        let mut record = StealthAddressRecord::from_announcement(&generated.to_announcement());

        assert!(recover_for_record(&record, &viewing, &spending).is_ok());

        record.stealth_address = EthAddress::from_array([0x33; 20]);
        assert!(matches!(
            recover_for_record(&record, &viewing, &spending),
            Err(WraithError::InvalidStealthAddress(_))
        ));
    }

    #[test]
    fn test_wrong_spending_key_does_not_recover() {
        let (spending, viewing) = keys(3);
        let (other_spending, _) = keys(4);
        let generated =
            generate_stealth_address(&spending.public_key(), &viewing.public_key()).unwrap();
        let record = StealthAddressRecord::from_announcement(&generated.to_announcement());

        assert!(recover_for_record(&record, &viewing, &other_spending).is_err());
    }

    #[test]
    fn test_recover_from_uncompressed_ephemeral_key() {
        let (spending, viewing) = keys(5);
        let generated =
            generate_stealth_address(&spending.public_key(), &viewing.public_key()).unwrap();
        let point = parse_ephemeral_key(generated.ephemeral_public_key.as_bytes()).unwrap();

        let key = recover_stealth_private_key(&uncompressed(&point), &viewing, &spending).unwrap();
        assert_eq!(key.address(), generated.stealth_address);
    }

    #[test]
    fn test_recover_rejects_garbage() {
        let (spending, viewing) = keys(6);
        assert!(matches!(
            recover_stealth_private_key(&[0x05; 33], &viewing, &spending),
            Err(WraithError::AnnouncementParseError(_))
        ));
    }

    #[test]
    fn test_hex_and_debug() {
        let (spending, viewing) = keys(7);
        let generated =
            generate_stealth_address(&spending.public_key(), &viewing.public_key()).unwrap();
        let key = recover_stealth_private_key(
            generated.ephemeral_public_key.as_bytes(),
            &viewing,
            &spending,
        )
        .unwrap();

        let hex = key.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);

        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&hex[2..]));
    }

    #[test]
    fn test_recover_with_derived_keys() {
        let derived = wraith_crypto::derive_stealth_keys(b"recover", "cannes-love-poap").unwrap();
        let generated = crate::payment::generate_for(&wraith_core::MetaAddress::new(
            derived.spending.public,
            derived.viewing.public,
        ))
        .unwrap();
        let record = StealthAddressRecord::from_announcement(&generated.to_announcement());

        let key = recover_with_keys(&record, &derived).unwrap();
        assert_eq!(key.address(), generated.stealth_address);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Generator, scanner and recoverer agree on every address.
        #[test]
        fn prop_generate_scan_recover_agree(recipient in any::<u64>(), sender in any::<u64>()) {
            let (spending, viewing) = keys(recipient);
            let generated = generate_stealth_address_with_rng(
                &mut ChaCha20Rng::seed_from_u64(sender),
                &spending.public_key(),
                &viewing.public_key(),
            )
            .unwrap();

            let report = scan_announcements(
                &[generated.to_announcement()],
                &viewing,
                &spending.public_key(),
            );
            prop_assert_eq!(report.matches.len(), 1);
            prop_assert!(generated.matches_record(&report.matches[0]));

            let key = recover_for_record(&report.matches[0], &viewing, &spending).unwrap();
            prop_assert_eq!(key.address(), generated.stealth_address);
        }
    }
}
