/// A network participant: an address the engine dials and the public key
/// it signs round shares with (spec §3; grounds drand's node identity).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    pub address: String,
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
    pub tls_required: bool,
}

impl Identity {
    pub fn new(address: impl Into<String>, public_key: Vec<u8>, tls_required: bool) -> Self {
        Identity {
            address: address.into(),
            public_key,
            tls_required,
        }
    }
}
