//! `serde_with`-style helper for `Vec<[u8; 48]>` fields (VSS commitments),
//! shared by `share` and `dkg` since plain `hex::serde` only handles `Vec<u8>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(v: &[[u8; 48]], s: S) -> Result<S::Ok, S::Error> {
    let encoded: Vec<String> = v.iter().map(hex::encode).collect();
    encoded.serialize(s)
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<[u8; 48]>, D::Error> {
    let encoded: Vec<String> = Vec::deserialize(d)?;
    encoded
        .into_iter()
        .map(|s| {
            let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
            bytes
                .try_into()
                .map_err(|_| serde::de::Error::custom("expected 48-byte commitment"))
        })
        .collect()
}
