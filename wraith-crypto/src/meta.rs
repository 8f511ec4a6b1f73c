//! Stealth meta-address text codec.
//!
//! ```text
//! st:eth:0x <66 hex: spending point> <66 hex: viewing point>
//! ```
//!
//! Decoding checks the format first (exact prefix, exactly 132 payload
//! characters) and only then decodes points. Hex is case-insensitive; nothing
//! is trimmed, padded or truncated.

use k256::PublicKey;

use wraith_core::constants::{META_ADDRESS_HEX_LEN, META_ADDRESS_PREFIX, POINT_HEX_LEN};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{CompressedPoint, MetaAddress};

use crate::point::{compress, decode_point};

/// Encodes two compressed public keys as a meta-address.
pub fn encode_meta_address(spending_pk: &CompressedPoint, viewing_pk: &CompressedPoint) -> String {
    MetaAddress::new(*spending_pk, *viewing_pk).encode()
}

/// Decodes and validates a meta-address.
///
/// # Errors
/// - [`WraithError::FormatError`] for a wrong prefix or payload length
/// - [`WraithError::PointDecodeError`] if either half is not hex or not a
///   compressed secp256k1 point
pub fn decode_meta_address(text: &str) -> Result<MetaAddress> {
    let (spending, viewing) = decode_meta_address_keys(text)?;
    Ok(MetaAddress::new(compress(&spending), compress(&viewing)))
}

/// Decodes a meta-address straight into curve points.
pub fn decode_meta_address_keys(text: &str) -> Result<(PublicKey, PublicKey)> {
    let payload = text.strip_prefix(META_ADDRESS_PREFIX).ok_or_else(|| {
        WraithError::FormatError(format!("must start with '{}'", META_ADDRESS_PREFIX))
    })?;

    if payload.len() != META_ADDRESS_HEX_LEN {
        return Err(WraithError::FormatError(format!(
            "expected {} hex characters after the prefix, got {}",
            META_ADDRESS_HEX_LEN,
            payload.len()
        )));
    }

    let bytes = payload.as_bytes();
    let spending = decode_half(&bytes[..POINT_HEX_LEN], "spending")?;
    let viewing = decode_half(&bytes[POINT_HEX_LEN..], "viewing")?;
    Ok((spending, viewing))
}

fn decode_half(hex_chars: &[u8], which: &str) -> Result<PublicKey> {
    let raw = hex::decode(hex_chars).map_err(|e| {
        WraithError::PointDecodeError(format!("{} key is not valid hex: {}", which, e))
    })?;
    CompressedPoint::from_bytes(&raw)
        .and_then(|point| decode_point(point.as_bytes()))
        .map_err(|_| {
            WraithError::PointDecodeError(format!(
                "{} key is not a compressed secp256k1 point",
                which
            ))
        })
}

/// Meta-address parsing that validates both points.
pub trait MetaAddressExt: Sized {
    /// Parses and validates a meta-address string.
    fn parse(text: &str) -> Result<Self>;
}

impl MetaAddressExt for MetaAddress {
    fn parse(text: &str) -> Result<Self> {
        decode_meta_address(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_keypair_with_rng;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use test_case::test_case;

    fn keys(seed: u64) -> (CompressedPoint, CompressedPoint) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let spending = generate_keypair_with_rng(&mut rng);
        let viewing = generate_keypair_with_rng(&mut rng);
        (spending.public, viewing.public)
    }

    #[test]
    fn test_encode_shape() {
        let (sp, vp) = keys(1);
        let encoded = encode_meta_address(&sp, &vp);
        assert!(encoded.starts_with("st:eth:0x"));
        assert_eq!(encoded.len(), 9 + 132);
        assert_eq!(&encoded[9..75], sp.to_hex());
        assert_eq!(&encoded[75..], vp.to_hex());
    }

    #[test]
    fn test_decode_accepts_uppercase_hex() {
        let (sp, vp) = keys(2);
        let encoded = encode_meta_address(&sp, &vp);
        let upper = format!("st:eth:0x{}", encoded[9..].to_uppercase());

        let decoded = decode_meta_address(&upper).unwrap();
        assert_eq!(decoded.spending_pk, sp);
        assert_eq!(decoded.viewing_pk, vp);
        assert_eq!(MetaAddress::parse(&upper).unwrap(), decoded);
    }

    #[test_case("" ; "empty")]
    #[test_case("st:eth:" ; "prefix without 0x")]
    #[test_case("st:btc:0x02" ; "wrong chain")]
    #[test_case("ST:ETH:0x02" ; "uppercase prefix")]
    #[test_case(" st:eth:0x02" ; "leading space")]
    fn test_decode_rejects_prefix(text: &str) {
        assert!(matches!(
            decode_meta_address(text),
            Err(WraithError::FormatError(_))
        ));
    }

    #[test_case(0 ; "no payload")]
    #[test_case(66 ; "one key")]
    #[test_case(131 ; "one short")]
    #[test_case(133 ; "one long")]
    #[test_case(264 ; "doubled")]
    fn test_decode_rejects_length(len: usize) {
        let text = format!("st:eth:0x{}", "0".repeat(len));
        assert!(matches!(
            decode_meta_address(&text),
            Err(WraithError::FormatError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_whitespace() {
        let (sp, vp) = keys(3);
        let text = format!("{}\n", encode_meta_address(&sp, &vp));
        assert!(matches!(
            decode_meta_address(&text),
            Err(WraithError::FormatError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_points() {
        let (sp, _) = keys(4);

        let not_hex = format!("st:eth:0x{}{}", sp.to_hex(), "zz".repeat(33));
        assert!(matches!(
            decode_meta_address(&not_hex),
            Err(WraithError::PointDecodeError(_))
        ));

        let uncompressed_prefix = format!("st:eth:0x04{}{}", &sp.to_hex()[2..], sp.to_hex());
        assert!(matches!(
            decode_meta_address(&uncompressed_prefix),
            Err(WraithError::PointDecodeError(_))
        ));

        // x = 5 is not on the curve.
        let off_curve = format!("st:eth:0x{}02{}{}", sp.to_hex(), "00".repeat(31), "05");
        assert!(matches!(
            decode_meta_address(&off_curve),
            Err(WraithError::PointDecodeError(_))
        ));
    }

    #[test]
    fn test_decode_non_ascii_payload_does_not_panic() {
        // 132 bytes, but not 132 hex digits.
        let text = format!("st:eth:0x{}", "é".repeat(66));
        assert!(decode_meta_address(&text).is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(seed in any::<u64>()) {
            let (sp, vp) = keys(seed);
            let decoded = decode_meta_address(&encode_meta_address(&sp, &vp)).unwrap();
            prop_assert_eq!(decoded.spending_pk, sp);
            prop_assert_eq!(decoded.viewing_pk, vp);
        }
    }
}
