mod api;
mod ballot;
mod ids;
mod session;
mod signal;

pub use api::{
    BallotOutcome, BallotStatus, CastBallotRequest, ErrorBody, ErrorDetail, ReceiveResponse,
    RequestSessionRequest, RequestSessionResponse, SendSignalResponse, StopDisposition,
    StopSessionRequest, TerminationMeta,
};
pub use ballot::Ballot;
pub use ids::{EnvelopeId, ParticipantId, RoomId, SessionId};
pub use session::{Session, SessionKind, SessionState};
pub use signal::{NewSignal, SignalEnvelope, SignalKind};
