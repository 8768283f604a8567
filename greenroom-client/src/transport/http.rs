use crate::transport::{SignalTransport, TransportError};
use async_trait::async_trait;
use greenroom_core::{
    BallotOutcome, CastBallotRequest, ErrorBody, NewSignal, ParticipantId, ReceiveResponse,
    RequestSessionRequest, RequestSessionResponse, RoomId, Session, SessionId, SessionKind,
    SignalEnvelope, StopSessionRequest,
};

fn io_err(e: reqwest::Error) -> TransportError {
    TransportError::Io(e.to_string())
}

async fn api_err(response: reqwest::Response) -> TransportError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => TransportError::Api(greenroom_core::Error::from_parts(
            body.error.code,
            body.error.message,
        )),
        Err(e) => TransportError::Io(format!("http {status}: {e}")),
    }
}

fn kind_segment(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::ScreenShare => "screenShare",
        SessionKind::Recording => "recording",
    }
}

/// JSON-over-HTTP relay client for the greenroom server routes.
#[derive(Clone)]
pub struct HttpRelayTransport {
    base: String,
    client: reqwest::Client,
}

impl HttpRelayTransport {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SignalTransport for HttpRelayTransport {
    async fn send(&self, room: &RoomId, signal: NewSignal) -> Result<(), TransportError> {
        let url = format!("{}/rooms/{}/signals", self.base, room);
        let response = self
            .client
            .post(url)
            .json(&signal)
            .send()
            .await
            .map_err(io_err)?;
        if !response.status().is_success() {
            return Err(api_err(response).await);
        }
        Ok(())
    }

    async fn receive(
        &self,
        room: &RoomId,
        peer: &ParticipantId,
    ) -> Result<Vec<SignalEnvelope>, TransportError> {
        let url = format!("{}/rooms/{}/peers/{}/inbox", self.base, room, peer);
        let response = self.client.post(url).send().await.map_err(io_err)?;
        if !response.status().is_success() {
            return Err(api_err(response).await);
        }
        let body: ReceiveResponse = response.json().await.map_err(io_err)?;
        Ok(body.envelopes)
    }
}

/// Client for the consensus operations on the same server.
#[derive(Clone)]
pub struct SessionApi {
    base: String,
    client: reqwest::Client,
}

impl SessionApi {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn request_session(
        &self,
        req: &RequestSessionRequest,
    ) -> Result<RequestSessionResponse, TransportError> {
        let url = format!("{}/sessions", self.base);
        let response = self
            .client
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(io_err)?;
        if !response.status().is_success() {
            return Err(api_err(response).await);
        }
        response.json().await.map_err(io_err)
    }

    pub async fn cast_ballot(
        &self,
        session: &SessionId,
        req: &CastBallotRequest,
    ) -> Result<BallotOutcome, TransportError> {
        let url = format!("{}/sessions/{}/ballots", self.base, session);
        let response = self
            .client
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(io_err)?;
        if !response.status().is_success() {
            return Err(api_err(response).await);
        }
        response.json().await.map_err(io_err)
    }

    pub async fn stop_session(
        &self,
        session: &SessionId,
        req: &StopSessionRequest,
    ) -> Result<Session, TransportError> {
        let url = format!("{}/sessions/{}/stop", self.base, session);
        let response = self
            .client
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(io_err)?;
        if !response.status().is_success() {
            return Err(api_err(response).await);
        }
        response.json().await.map_err(io_err)
    }

    /// The in-progress session of this kind, if any; how late joiners catch
    /// up without having voted.
    pub async fn active_session(
        &self,
        room: &RoomId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TransportError> {
        let url = format!(
            "{}/rooms/{}/sessions/active/{}",
            self.base,
            room,
            kind_segment(kind)
        );
        let response = self.client.get(url).send().await.map_err(io_err)?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_err(response).await);
        }
        response.json().await.map(Some).map_err(io_err)
    }
}
