//! # Contract Bindings
//!
//! This module is the binding layer between loosely typed request data
//! and the two deployed contracts. It knows each method's declared
//! parameters and outputs, turns a [`CallDescription`] into calldata,
//! and turns return data back into JSON.
//!
//! ## Flow
//!
//! ```text
//! CallDescription { "burn", ["0xabc...", "100"] }
//!              ↓  BoundContract::encode()
//! EncodedCall { to: 0xToken, calldata: 0x9dc29fac... }
//!              ↓  signing agent / eth_call
//! return data  ↓  BoundContract::decode_output()
//! CallOutput { "price": "1850000000" }
//! ```
//!
//! Nothing here touches the network. A call that cannot be encoded is
//! rejected before any RPC request is made.

pub mod abi;
pub mod call;

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{hex, Address, Bytes};
use serde_json::{Map, Value};
use thiserror::Error;

pub use abi::{OPTIONS_VAULT_ABI, OPTION_TOKEN_ABI};
pub use call::{CallArg, CallDescription};

/// Errors raised while mapping calls onto a contract interface.
#[derive(Debug, Error)]
pub enum AbiError {
    /// The interface definition itself failed to parse.
    #[error("Invalid interface for {contract}: {reason}")]
    InvalidInterface { contract: String, reason: String },

    /// The method is not part of the bound interface.
    #[error("Unknown method {method} on {contract}")]
    UnknownMethod { contract: String, method: String },

    /// Wrong number of arguments for the method.
    #[error("{method} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// An argument could not be coerced to its declared type.
    #[error("Invalid argument {index} for {method}: {reason}")]
    InvalidArgument {
        method: String,
        index: usize,
        reason: String,
    },

    /// Return data did not match the declared outputs.
    #[error("Failed to decode output of {method}: {reason}")]
    UndecodableOutput { method: String, reason: String },
}

/// A call ready to hand to the signing agent or `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    /// Contract being called.
    pub to: Address,

    /// Selector followed by ABI-encoded arguments.
    pub calldata: Bytes,

    /// Method name, kept for logging.
    pub method: String,
}

/// Decoded return values of a read-style call.
///
/// Keys are the ABI output names; unnamed outputs use their position.
/// Integers are rendered as decimal strings so no precision is lost in
/// JavaScript clients.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallOutput {
    pub fields: Map<String, Value>,
}

impl CallOutput {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }
}

/// A contract interface bound to a deployed address.
///
/// Constructed once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct BoundContract {
    name: String,
    address: Address,
    abi: JsonAbi,
}

impl BoundContract {
    /// Bind a set of human-readable signatures to `address`.
    pub fn new(name: &str, address: Address, signatures: &[&str]) -> Result<Self, AbiError> {
        let abi = JsonAbi::parse(signatures.iter().copied()).map_err(|e| {
            AbiError::InvalidInterface {
                contract: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            address,
            abi,
        })
    }

    /// The OptionToken interface at `address`.
    pub fn option_token(address: Address) -> Result<Self, AbiError> {
        Self::new("OptionToken", address, OPTION_TOKEN_ABI)
    }

    /// The OptionsVault interface at `address`.
    pub fn options_vault(address: Address) -> Result<Self, AbiError> {
        Self::new("OptionsVault", address, OPTIONS_VAULT_ABI)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Look up a method by name.
    ///
    /// The bound interfaces have no overloads, so the first match is
    /// the only one.
    pub fn function(&self, method: &str) -> Result<&Function, AbiError> {
        self.abi
            .function(method)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownMethod {
                contract: self.name.clone(),
                method: method.to_string(),
            })
    }

    /// Encode `call` into calldata for this contract.
    pub fn encode(&self, call: &CallDescription) -> Result<EncodedCall, AbiError> {
        let function = self.function(call.method())?;

        if function.inputs.len() != call.args().len() {
            return Err(AbiError::ArgumentCount {
                method: call.method().to_string(),
                expected: function.inputs.len(),
                actual: call.args().len(),
            });
        }

        let invalid = |index: usize, reason: String| AbiError::InvalidArgument {
            method: call.method().to_string(),
            index,
            reason,
        };

        let values = function
            .inputs
            .iter()
            .zip(call.args())
            .enumerate()
            .map(|(index, (param, arg))| {
                let ty: DynSolType = param.resolve().map_err(|e| invalid(index, e.to_string()))?;
                coerce_arg(&ty, arg).map_err(|reason| invalid(index, reason))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let calldata = function
            .abi_encode_input(&values)
            .map_err(|e| invalid(0, e.to_string()))?;

        Ok(EncodedCall {
            to: self.address,
            calldata: calldata.into(),
            method: call.method().to_string(),
        })
    }

    /// Decode the return data of `method` into named JSON fields.
    pub fn decode_output(&self, method: &str, data: &[u8]) -> Result<CallOutput, AbiError> {
        let function = self.function(method)?;

        let values = function
            .abi_decode_output(data)
            .map_err(|e| AbiError::UndecodableOutput {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        let fields = function
            .outputs
            .iter()
            .zip(values.iter())
            .enumerate()
            .map(|(i, (param, value))| {
                let key = if param.name.is_empty() {
                    i.to_string()
                } else {
                    param.name.clone()
                };
                (key, render_value(value))
            })
            .collect();

        Ok(CallOutput { fields })
    }
}

/// Coerce one request argument to a value of the declared type.
///
/// Tuples and arrays take a [`CallArg::List`]; `string` parameters take
/// the text verbatim; everything else goes through the type's own
/// string parser, so `"100"`, `100` and `"0x64"` all encode a `uint256`.
fn coerce_arg(ty: &DynSolType, arg: &CallArg) -> Result<DynSolValue, String> {
    match (ty, arg) {
        (DynSolType::String, CallArg::Text(text)) => Ok(DynSolValue::String(text.clone())),

        (DynSolType::Tuple(types), CallArg::List(items)) => {
            if types.len() != items.len() {
                return Err(format!(
                    "tuple expects {} components, got {}",
                    types.len(),
                    items.len()
                ));
            }
            types
                .iter()
                .zip(items)
                .map(|(ty, item)| coerce_arg(ty, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }

        (DynSolType::Array(inner), CallArg::List(items)) => items
            .iter()
            .map(|item| coerce_arg(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),

        (DynSolType::FixedArray(inner, len), CallArg::List(items)) => {
            if *len != items.len() {
                return Err(format!("array expects {} elements, got {}", len, items.len()));
            }
            items
                .iter()
                .map(|item| coerce_arg(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }

        (ty, CallArg::List(_)) => Err(format!("list given for scalar type {}", ty.sol_type_name())),

        (ty, scalar) => ty
            .coerce_str(&scalar.to_string())
            .map_err(|e| e.to_string()),
    }
}

/// Render a decoded value as JSON.
fn render_value(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Bytes(b) => Value::String(hex::encode_prefixed(b)),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(render_value).collect())
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000ab";

    fn token_address() -> Address {
        Address::repeat_byte(0x11)
    }

    fn token() -> BoundContract {
        BoundContract::option_token(token_address()).unwrap()
    }

    #[test]
    fn test_both_interfaces_parse() {
        let token = token();
        let vault = BoundContract::options_vault(Address::repeat_byte(0x22)).unwrap();

        for method in ["initialize", "adminTransfer", "burn", "terms", "getAsset1Price"] {
            assert!(token.function(method).is_ok(), "{method}");
        }
        for method in ["createOption", "buyOption", "claimTokens", "optionByAddress"] {
            assert!(vault.function(method).is_ok(), "{method}");
        }
    }

    #[test]
    fn test_encode_burn() {
        let call = CallDescription::new("burn", vec![ACCOUNT.into(), "100".into()]);
        let encoded = token().encode(&call).unwrap();
        let selector = token().function("burn").unwrap().selector();

        assert_eq!(encoded.to, token_address());
        assert_eq!(encoded.method, "burn");
        assert_eq!(encoded.calldata.len(), 4 + 64);
        assert_eq!(&encoded.calldata[..4], selector.as_slice());
        assert_eq!(encoded.calldata[4 + 31], 0xab);
        assert_eq!(
            U256::from_be_slice(&encoded.calldata[36..68]),
            U256::from(100u64)
        );
    }

    #[test]
    fn test_integer_and_text_amounts_encode_identically() {
        let as_text = CallDescription::new("burn", vec![ACCOUNT.into(), "100".into()]);
        let as_int = CallDescription::new("burn", vec![ACCOUNT.into(), CallArg::Integer(100)]);

        assert_eq!(
            token().encode(&as_text).unwrap().calldata,
            token().encode(&as_int).unwrap().calldata
        );
    }

    #[test]
    fn test_encode_tuple_argument() {
        let call = CallDescription::new(
            "initialize",
            vec![
                CallArg::List(vec!["2000".into(), "15".into(), 1_700_000_000i64.into(), true.into()]),
                "Call Option".into(),
                "COPT".into(),
                ACCOUNT.into(),
                "1000".into(),
                "2000".into(),
                ACCOUNT.into(),
            ],
        );

        assert!(token().encode(&call).is_ok());
    }

    #[test]
    fn test_unknown_method() {
        let call = CallDescription::no_args("selfDestruct");
        match token().encode(&call) {
            Err(AbiError::UnknownMethod { method, .. }) => assert_eq!(method, "selfDestruct"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_argument_count_mismatch() {
        let call = CallDescription::new("burn", vec![ACCOUNT.into()]);
        assert!(matches!(
            token().encode(&call),
            Err(AbiError::ArgumentCount { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_unencodable_argument() {
        let call = CallDescription::new("burn", vec!["not-an-address".into(), "100".into()]);
        assert!(matches!(
            token().encode(&call),
            Err(AbiError::InvalidArgument { index: 0, .. })
        ));

        let call = CallDescription::new("burn", vec![CallArg::List(vec![]), "100".into()]);
        assert!(matches!(
            token().encode(&call),
            Err(AbiError::InvalidArgument { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_named_outputs() {
        let data = DynSolValue::Tuple(vec![
            DynSolValue::Bool(true),
            DynSolValue::Uint(U256::from(42u64), 256),
        ])
        .abi_encode_params();

        let output = token().decode_output("calculateProfit", &data).unwrap();

        assert_eq!(output.get("profitable"), Some(&Value::Bool(true)));
        assert_eq!(output.get("profit"), Some(&Value::String("42".to_string())));
    }

    #[test]
    fn test_decode_address_output_is_checksummed() {
        let factory = Address::repeat_byte(0xcd);
        let data = DynSolValue::Tuple(vec![DynSolValue::Address(factory)]).abi_encode_params();

        let vault = BoundContract::options_vault(Address::ZERO).unwrap();
        let output = vault.decode_output("getUniswapV3Factory", &data).unwrap();

        assert_eq!(
            output.get("factoryAddress"),
            Some(&Value::String(factory.to_checksum(None)))
        );
    }

    #[test]
    fn test_decode_rejects_short_data() {
        assert!(matches!(
            token().decode_output("getAsset1Price", &[0u8; 4]),
            Err(AbiError::UndecodableOutput { .. })
        ));
    }
}
