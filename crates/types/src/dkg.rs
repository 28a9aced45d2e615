/// Messages exchanged during a DKG or resharing run (spec §3, §4.3).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum DkgPacket {
    Deal(Deal),
    Response(Response),
    Justification(Justification),
}

/// A dealer's share of the secret, encrypted to one recipient, plus the
/// public commitments every recipient needs to verify it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Deal {
    pub dealer_index: u16,
    pub recipient_index: u16,
    #[serde(with = "crate::hex_commits")]
    pub commits: Vec<[u8; 48]>,
    #[serde(with = "hex::serde")]
    pub encrypted_share: Vec<u8>,
}

/// A recipient's verdict on a deal: accepted, or a complaint naming the
/// failure so the dealer can be held to a justification.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Response {
    pub dealer_index: u16,
    pub responder_index: u16,
    pub status: ResponseStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResponseStatus {
    Approval,
    Complaint,
}

/// A dealer's rebuttal to a complaint: the plaintext share, letting every
/// other participant verify it against the deal's public commitments.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Justification {
    pub dealer_index: u16,
    pub recipient_index: u16,
    #[serde(with = "hex::serde")]
    pub share: Vec<u8>,
}
