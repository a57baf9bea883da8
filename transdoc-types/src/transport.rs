//! Closed transport-domain enums and the document lifecycle.

use serde::{Deserialize, Serialize};

/// Medical reason a transport is prescribed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportReason {
    EmergencyTransport,
    FullPartStationary,
    PrePostStationary,
    AmbulantTaxi,
    OtherPermitFree,
    HighFrequent,
    HighFrequentAlike,
    ContinuousImpairment,
    OtherKtw,
}

/// Vehicle class used for the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportationType {
    Taxi,
    Ktw,
    Rtw,
    NawOrNef,
    Other,
}

/// How the patient has to be carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientCondition {
    CarryingChair,
    WheelChair,
    LyingDown,
}

/// Direction of a single transport leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportDirection {
    Outward,
    Return,
}

/// Lifecycle state of a transport document.
///
/// `Archived` is terminal and absorbing: no outgoing transitions, and any
/// further mutating command on an archived document is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    Draft,
    AssignedPatient,
    AssignedProvider,
    Signed,
    Archived,
}

impl DocumentStatus {
    /// Whether the state graph permits moving from `self` to `next`.
    ///
    /// Archive is special-cased by the dispatcher (any non-archived state
    /// may archive once eligibility holds); this function covers the
    /// forward edges of the graph.
    pub fn can_transition(self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Draft, AssignedPatient)
                | (AssignedPatient, AssignedProvider)
                | (AssignedProvider, Signed)
                | (Draft, Archived)
                | (AssignedPatient, Archived)
                | (AssignedProvider, Archived)
                | (Signed, Archived)
        )
    }

    pub fn is_archived(self) -> bool {
        matches!(self, DocumentStatus::Archived)
    }
}
