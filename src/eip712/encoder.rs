//! EIP-712 Type Encoding
//!
//! `encodeType` and `encodeData` for flat structs. Dynamic members are
//! replaced by their keccak256; atomic members take one 32-byte word.

use super::types::*;
use crate::utils::codec::u256_to_bytes32;
use crate::utils::crypto::keccak256;

/// Encode a type string for a struct type
/// Format: "TypeName(type1 name1,type2 name2,...)"
pub fn encode_type(type_name: &str, fields: &[TypedDataField]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, members.join(","))
}

/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, fields: &[TypedDataField]) -> [u8; 32] {
    keccak256(encode_type(type_name, fields).as_bytes())
}

/// Encode one member value as a 32-byte word
pub fn encode_value(field: &TypedDataField, value: &Eip712Value) -> Result<[u8; 32], Eip712Error> {
    let type_name = field.type_name.as_str();

    match value {
        Eip712Value::Address(addr) if type_name == "address" => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_bytes());
            Ok(word)
        }
        Eip712Value::Uint(u) if type_name.starts_with("uint") && is_atomic_type(type_name) => {
            let bits: usize = type_name[4..].parse().unwrap_or(256);
            if bits < 256 && u.bits() > bits {
                return Err(Eip712Error::InvalidValue {
                    type_name: type_name.to_string(),
                    value: u.to_string(),
                });
            }
            Ok(u256_to_bytes32(u))
        }
        Eip712Value::FixedBytes(bytes) if type_name == "bytes32" => Ok(*bytes),
        Eip712Value::Bytes(bytes) if type_name == "bytes" => Ok(keccak256(bytes)),
        Eip712Value::String(s) if type_name == "string" => Ok(keccak256(s.as_bytes())),
        other => Err(Eip712Error::InvalidValue {
            type_name: type_name.to_string(),
            value: format!("{:?}", other),
        }),
    }
}

/// encodeData: typeHash followed by one word per member
pub fn encode_data(
    type_name: &str,
    fields: &[TypedDataField],
    values: &[Eip712Value],
) -> Result<Vec<u8>, Eip712Error> {
    if values.len() < fields.len() {
        let missing = &fields[values.len()];
        return Err(Eip712Error::MissingField(format!("{}.{}", type_name, missing.name)));
    }
    if values.len() > fields.len() {
        return Err(Eip712Error::InvalidType(format!(
            "{} has {} members, got {} values",
            type_name,
            fields.len(),
            values.len()
        )));
    }

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, fields));

    for (field, value) in fields.iter().zip(values) {
        encoded.extend_from_slice(&encode_value(field, value)?);
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::{Address, U256};

    fn mail_fields() -> Vec<TypedDataField> {
        vec![
            TypedDataField::new("contents", "string"),
            TypedDataField::new("amount", "uint8"),
        ]
    }

    #[test]
    fn test_encode_type() {
        assert_eq!(
            encode_type("Mail", &mail_fields()),
            "Mail(string contents,uint8 amount)"
        );
    }

    #[test]
    fn test_domain_type_hash() {
        let fields = Eip712Domain::for_contract(U256::one(), Address::zero()).fields();
        assert_eq!(
            hex::encode(type_hash("EIP712Domain", &fields)),
            "47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218"
        );
    }

    #[test]
    fn test_dynamic_members_are_hashed() {
        let field = TypedDataField::new("data", "bytes");
        let word = encode_value(&field, &Eip712Value::Bytes(vec![])).unwrap();
        assert_eq!(
            hex::encode(word),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_uint8_range_checked() {
        let field = TypedDataField::new("operation", "uint8");
        assert!(encode_value(&field, &Eip712Value::Uint(U256::from(1u64))).is_ok());
        assert!(encode_value(&field, &Eip712Value::Uint(U256::from(256u64))).is_err());
    }

    #[test]
    fn test_value_type_mismatch() {
        let field = TypedDataField::new("to", "address");
        let result = encode_value(&field, &Eip712Value::Uint(U256::one()));
        assert!(matches!(result, Err(Eip712Error::InvalidValue { .. })));
    }

    #[test]
    fn test_encode_data_missing_member() {
        let values = vec![Eip712Value::String("hi".to_string())];
        let result = encode_data("Mail", &mail_fields(), &values);
        assert_eq!(result, Err(Eip712Error::MissingField("Mail.amount".to_string())));
    }

    #[test]
    fn test_encode_data_layout() {
        let values = vec![
            Eip712Value::String("hi".to_string()),
            Eip712Value::Uint(U256::from(7u64)),
        ];
        let encoded = encode_data("Mail", &mail_fields(), &values).unwrap();

        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[..32], &type_hash("Mail", &mail_fields()));
        assert_eq!(&encoded[32..64], &keccak256(b"hi"));
        assert_eq!(encoded[95], 7);
    }
}
