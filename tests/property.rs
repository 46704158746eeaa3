use ethers_core::types::{Address, U256};
use proptest::prelude::*;
use safe_relay::safe::{AccountConfig, AddressDeriver, SafeSignature, SignatureAggregator, SignatureSet};
use safe_relay::utils::codec;
use safe_relay::{keccak256, to_checksum_address};

fn any_owner() -> impl Strategy<Value = Address> {
    prop::array::uniform20(any::<u8>())
        .prop_filter("non-zero owner", |bytes| bytes.iter().any(|&b| b != 0))
        .prop_map(Address::from)
}

fn any_signature() -> impl Strategy<Value = SafeSignature> {
    (any_owner(), prop::collection::vec(any::<u8>(), 64), prop::sample::select(vec![27u8, 28, 31, 32, 1]))
        .prop_map(|(signer, mut data, v)| {
            data.push(v);
            SafeSignature { signer, data }
        })
}

proptest! {
    #[test]
    fn checksum_addresses_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert!(checksummed.starts_with("0x"));

        let tail = checksummed.trim_start_matches("0x");
        let lower_expected = hex::encode(bytes);
        prop_assert_eq!(tail.to_ascii_lowercase(), lower_expected.clone());

        let hash = keccak256(lower_expected.as_bytes());
        let mut expected = String::from("0x");
        for (i, ch) in lower_expected.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_digit() || nibble < 8 {
                expected.push(ch);
            } else {
                expected.push(ch.to_ascii_uppercase());
            }
        }
        prop_assert_eq!(checksummed, expected);
    }

    #[test]
    fn decimal_to_hex_matches_u128(value in any::<u128>()) {
        let hex = codec::decimal_to_hex_string(&value.to_string()).unwrap();
        prop_assert_eq!(hex, format!("0x{:x}", value));
    }

    #[test]
    fn to_bytes_never_fails_and_hex_roundtrips(bytes in prop::collection::vec(any::<u8>(), 1..64)) {
        let hex = codec::bytes_to_hex(&bytes);
        prop_assert_eq!(codec::to_bytes(&hex), bytes.clone());
        prop_assert_eq!(codec::hex_to_bytes(&hex).unwrap(), bytes);
    }

    #[test]
    fn parse_u256_accepts_decimal_and_hex(value in any::<u128>()) {
        let expected = U256::from(value);
        prop_assert_eq!(codec::parse_u256(&value.to_string()).unwrap(), expected);
        prop_assert_eq!(codec::parse_u256(&format!("0x{:x}", value)).unwrap(), expected);
    }

    #[test]
    fn derived_address_ignores_owner_order(
        owners in prop::collection::hash_set(any_owner(), 1..6),
        salt in any::<u64>(),
    ) {
        let owners: Vec<Address> = owners.into_iter().collect();
        let mut reversed = owners.clone();
        reversed.reverse();

        let a = AddressDeriver::derive(&AccountConfig::new(owners.clone(), 1, U256::from(salt))).unwrap();
        let b = AddressDeriver::derive(&AccountConfig::new(reversed, 1, U256::from(salt))).unwrap();
        prop_assert_eq!(a, b);

        let c = AddressDeriver::derive(
            &AccountConfig::new(owners, 1, U256::from(salt) + U256::one()),
        ).unwrap();
        prop_assert_ne!(a, c);
    }

    #[test]
    fn normalization_is_idempotent(sig in any_signature()) {
        let once = SignatureAggregator::normalize(&sig.data).unwrap();
        let twice = SignatureAggregator::normalize(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert!(matches!(once[64], 1 | 31 | 32));
    }

    #[test]
    fn finalized_bundle_is_sorted_by_signer(
        sigs in prop::collection::vec(any_signature(), 1..8),
    ) {
        let mut set = SignatureSet::new();
        for sig in sigs {
            // random signers may collide; collisions are rejected, not merged
            let _ = set.insert(sig);
        }

        let bundle = set.finalize();
        prop_assert_eq!(bundle.as_bytes().len(), set.len() * 65);

        let signers: Vec<Address> = set.signatures().iter().map(|s| s.signer).collect();
        let mut sorted = signers.clone();
        sorted.sort();
        prop_assert_eq!(signers, sorted);

        prop_assert_eq!(set.finalize(), bundle);
    }
}
