use crate::config::CallConfig;
use crate::error::CallError;
use crate::media::{MediaConstraints, MediaSource};
use crate::session::{CallRole, CallSession, CallState};
use crate::signal::SignalSink;
use crate::transport::{PeerConnector, TransportEvent, TransportState};
use crate::ui::CallUi;
use dialtone_core::{Envelope, IceCandidateInit, SessionDescription, UserId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};

/// Inputs to the controller's event loop: user intents and inbound envelopes.
#[derive(Debug)]
pub enum CallCommand {
    PlaceCall { target: UserId },
    HangUp,
    Signal(Envelope),
}

/// Cloneable surface of a running [`CallController`].
#[derive(Clone)]
pub struct CallHandle {
    commands: mpsc::Sender<CallCommand>,
    state: watch::Receiver<CallState>,
}

impl CallHandle {
    pub async fn place_call(&self, target: impl Into<UserId>) -> Result<(), CallError> {
        self.send(CallCommand::PlaceCall {
            target: target.into(),
        })
        .await
    }

    pub async fn hang_up(&self) -> Result<(), CallError> {
        self.send(CallCommand::HangUp).await
    }

    /// Feed an envelope received from the relay into the controller.
    pub async fn deliver(&self, envelope: Envelope) -> Result<(), CallError> {
        self.send(CallCommand::Signal(envelope)).await
    }

    pub fn state(&self) -> CallState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<CallState> {
        self.state.clone()
    }

    pub fn commands(&self) -> mpsc::Sender<CallCommand> {
        self.commands.clone()
    }

    async fn send(&self, command: CallCommand) -> Result<(), CallError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CallError::SignalingClosed)
    }
}

/// Per-client call controller. Owns at most one [`CallSession`] at a time and
/// drives it through the offer/answer/ICE exchange.
///
/// Scheduling is cooperative: each command or transport event runs its
/// transition to completion before the next one is processed, so no internal
/// locking is needed and call attempts arriving while a transition is
/// suspended (media acquisition, the accept prompt) queue up behind it and
/// then hit the busy guard.
pub struct CallController {
    local_user: UserId,
    constraints: MediaConstraints,
    connector: Arc<dyn PeerConnector>,
    media: Arc<dyn MediaSource>,
    ui: Arc<dyn CallUi>,
    signals: Arc<dyn SignalSink>,
    session: Option<CallSession>,
    command_rx: mpsc::Receiver<CallCommand>,
    // Replaced for every session: a sender handed to a released transport
    // points at a dropped receiver, so its late events are discarded.
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    state_tx: watch::Sender<CallState>,
}

impl CallController {
    pub fn new(
        config: CallConfig,
        connector: Arc<dyn PeerConnector>,
        media: Arc<dyn MediaSource>,
        ui: Arc<dyn CallUi>,
        signals: Arc<dyn SignalSink>,
    ) -> (Self, CallHandle) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (transport_tx, transport_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(CallState::Idle);

        let controller = Self {
            local_user: config.local_user,
            constraints: config.media,
            connector,
            media,
            ui,
            signals,
            session: None,
            command_rx,
            transport_rx,
            transport_tx,
            state_tx,
        };

        let handle = CallHandle {
            commands: command_tx,
            state: state_rx,
        };

        (controller, handle)
    }

    pub async fn run(mut self) {
        info!("call controller started for {}", self.local_user);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("command channel closed, shutting down controller");
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    if let Some(e) = evt {
                        self.handle_transport_event(e).await;
                    }
                }
            }
        }

        self.teardown().await;
        info!("call controller finished for {}", self.local_user);
    }

    async fn handle_command(&mut self, command: CallCommand) {
        match command {
            CallCommand::PlaceCall { target } => self.place_call(target).await,
            CallCommand::HangUp => self.hang_up().await,
            CallCommand::Signal(envelope) => self.handle_envelope(envelope).await,
        }
    }

    async fn place_call(&mut self, target: UserId) {
        if self.session.is_some() {
            warn!("cannot call {}: a call is already in progress", target);
            self.ui.call_failed(&CallError::Busy);
            return;
        }

        info!("placing call to {}", target);
        if let Err(e) = self.start_outgoing(target).await {
            error!("call placement failed: {e:#}");
            self.ui.call_failed(&e);
            self.teardown().await;
        }
    }

    async fn start_outgoing(&mut self, target: UserId) -> Result<(), CallError> {
        let events = self.fresh_transport_channel();
        let transport = self
            .connector
            .connect(events)
            .await
            .map_err(CallError::Negotiation)?;
        self.session = Some(CallSession::new(CallRole::Caller, target.clone(), transport));

        let local = self
            .media
            .acquire(&self.constraints)
            .await
            .map_err(CallError::MediaAcquisition)?;

        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.local_media = Some(local.clone());
        session
            .transport
            .attach_media(local.clone())
            .await
            .map_err(CallError::Negotiation)?;
        self.ui.render_local_stream(local);

        let offer = match self.session.as_ref() {
            Some(session) => session
                .transport
                .create_offer()
                .await
                .map_err(CallError::Negotiation)?,
            None => return Ok(()),
        };

        self.send_envelope(Envelope::Offer {
            sender: self.local_user.clone(),
            target,
            sdp: offer,
        })
        .await?;

        self.set_state(CallState::Offering);
        Ok(())
    }

    async fn hang_up(&mut self) {
        let Some(session) = self.session.as_ref() else {
            debug!("hang-up with no call in progress");
            return;
        };

        let remote = session.remote_user.clone();
        info!("hanging up call with {}", remote);
        self.teardown().await;
        self.send_hangup(Some(remote)).await;
    }

    async fn handle_envelope(&mut self, envelope: Envelope) {
        if !envelope.is_addressed_to(&self.local_user) {
            trace!(
                "ignoring envelope from {} addressed to {:?}",
                envelope.sender(),
                envelope.target()
            );
            return;
        }

        match envelope {
            Envelope::Offer { sender, sdp, .. } => self.handle_offer(sender, sdp).await,
            Envelope::Answer { sender, sdp, .. } => self.handle_answer(sender, sdp).await,
            Envelope::IceCandidate {
                sender, candidate, ..
            } => self.handle_candidate(sender, candidate).await,
            Envelope::Hangup { sender, .. } => self.handle_hangup(sender).await,
        }
    }

    async fn handle_offer(&mut self, caller: UserId, sdp: SessionDescription) {
        if self.session.is_some() {
            warn!("busy: rejecting incoming call from {}", caller);
            self.send_hangup(Some(caller)).await;
            return;
        }

        info!("incoming call from {}", caller);
        match self.start_incoming(caller.clone(), sdp).await {
            Ok(true) => {}
            Ok(false) => {
                info!("call from {} rejected", caller);
                self.teardown().await;
                self.send_hangup(Some(caller)).await;
            }
            Err(e) => {
                error!("failed to answer call from {}: {e:#}", caller);
                self.ui.call_failed(&e);
                self.teardown().await;
                self.send_hangup(Some(caller)).await;
            }
        }
    }

    /// Returns `Ok(false)` when the user declined the call.
    async fn start_incoming(
        &mut self,
        caller: UserId,
        sdp: SessionDescription,
    ) -> Result<bool, CallError> {
        let events = self.fresh_transport_channel();
        let transport = self
            .connector
            .connect(events)
            .await
            .map_err(CallError::Negotiation)?;
        self.session = Some(CallSession::new(CallRole::Callee, caller.clone(), transport));
        self.set_state(CallState::Ringing);

        // Suspension point: the loop sits here until the user decides, so no
        // conflicting transition can start underneath us.
        if !self.ui.prompt_accept(&caller).await {
            return Ok(false);
        }

        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        session
            .transport
            .set_remote_description(sdp)
            .await
            .map_err(CallError::Negotiation)?;

        let local = self
            .media
            .acquire(&self.constraints)
            .await
            .map_err(CallError::MediaAcquisition)?;

        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        session.local_media = Some(local.clone());
        session
            .transport
            .attach_media(local.clone())
            .await
            .map_err(CallError::Negotiation)?;
        self.ui.render_local_stream(local);

        let answer = match self.session.as_ref() {
            Some(session) => session
                .transport
                .create_answer()
                .await
                .map_err(CallError::Negotiation)?,
            None => return Ok(false),
        };

        self.send_envelope(Envelope::Answer {
            sender: self.local_user.clone(),
            target: caller,
            sdp: answer,
        })
        .await?;

        self.set_state(CallState::Connecting);
        Ok(true)
    }

    async fn handle_answer(&mut self, sender: UserId, sdp: SessionDescription) {
        let in_offering = self
            .session
            .as_ref()
            .is_some_and(|s| s.state == CallState::Offering && s.remote_user == sender);
        if !in_offering {
            warn!("dropping unexpected answer from {}", sender);
            return;
        }

        let result = match self.session.as_ref() {
            Some(session) => session.transport.set_remote_description(sdp).await,
            None => return,
        };

        match result {
            Ok(()) => self.set_state(CallState::Connecting),
            Err(e) => {
                error!("failed to apply answer from {}: {e:#}", sender);
                self.ui.call_failed(&CallError::Negotiation(e));
                self.teardown().await;
            }
        }
    }

    async fn handle_candidate(&mut self, sender: UserId, candidate: IceCandidateInit) {
        let Some(session) = self.session.as_ref() else {
            debug!("dropping candidate from {}: no call in progress", sender);
            return;
        };
        if session.remote_user != sender {
            debug!("dropping candidate from {}: not the call peer", sender);
            return;
        }

        if let Err(e) = session.transport.add_ice_candidate(candidate).await {
            error!("failed to apply candidate from {}: {e:#}", sender);
            self.ui.call_failed(&CallError::Negotiation(e));
            self.teardown().await;
        }
    }

    async fn handle_hangup(&mut self, sender: UserId) {
        if self.session.is_none() {
            debug!("hang-up from {} with no call in progress", sender);
            return;
        }

        info!("call ended by {}", sender);
        self.teardown().await;
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                let Some(session) = self.session.as_ref() else {
                    return;
                };
                let envelope = Envelope::IceCandidate {
                    sender: self.local_user.clone(),
                    target: session.remote_user.clone(),
                    candidate,
                };
                if let Err(e) = self.signals.send(envelope).await {
                    warn!("failed to relay local candidate: {e:#}");
                }
            }

            TransportEvent::RemoteStream(stream) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                session.remote_media = Some(stream.clone());
                self.ui.render_remote_stream(stream);
            }

            TransportEvent::StateChanged(state) => {
                if state.is_terminal() {
                    if self.session.is_some() {
                        info!("transport reported {state:?}, ending call");
                        self.teardown().await;
                    }
                    return;
                }

                if state == TransportState::Connected {
                    let connecting = self
                        .session
                        .as_ref()
                        .is_some_and(|s| s.state == CallState::Connecting);
                    if connecting {
                        info!("call is active");
                        self.set_state(CallState::Active);
                    }
                }
            }
        }
    }

    /// Full teardown: stop media, release the transport, clear the session.
    /// Safe to invoke with no session and safe to invoke twice.
    async fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        debug!("tearing down call with {}", session.remote_user);

        if let Some(local) = session.local_media.take() {
            local.stop();
        }
        if let Some(remote) = session.remote_media.take() {
            remote.stop();
        }
        if let Err(e) = session.transport.close().await {
            debug!("transport close reported: {e:#}");
        }
        // Detach: whatever the released transport still fires must never be
        // attributed to a later session.
        self.fresh_transport_channel();

        self.state_tx.send_replace(CallState::Closed);
        self.ui.call_closed();
    }

    async fn send_hangup(&self, target: Option<UserId>) {
        let envelope = Envelope::Hangup {
            sender: self.local_user.clone(),
            target,
        };
        if let Err(e) = self.signals.send(envelope).await {
            warn!("failed to send hang-up: {e:#}");
        }
    }

    async fn send_envelope(&self, envelope: Envelope) -> Result<(), CallError> {
        self.signals
            .send(envelope)
            .await
            .map_err(|_| CallError::SignalingClosed)
    }

    /// Swap in a fresh transport-event channel and return its sender. The
    /// previous receiver is dropped, closing the channel under any sender
    /// still held by an earlier session's transport.
    fn fresh_transport_channel(&mut self) -> mpsc::Sender<TransportEvent> {
        let (tx, rx) = mpsc::channel(64);
        self.transport_tx = tx.clone();
        self.transport_rx = rx;
        tx
    }

    fn set_state(&mut self, state: CallState) {
        if let Some(session) = self.session.as_mut() {
            session.state = state;
        }
        self.state_tx.send_replace(state);
    }
}
