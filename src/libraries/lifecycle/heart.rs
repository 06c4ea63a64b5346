use futures::{
    channel::mpsc::{channel, Receiver, Sender},
    pin_mut,
    prelude::*,
    select,
};
use log::{debug, error};
use std::{
    fmt,
    fmt::{Error as FmtError, Formatter},
};
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};

/// Reason why a [`Heart`] stopped beating
#[derive(Debug, Clone)]
pub enum DeathReason {
    /// A [`HeartStone`] requested termination
    Killed(String),
    /// The process received an external termination signal
    Terminated,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, w: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            DeathReason::Killed(reason) => write!(w, "Killed ({})", reason),
            DeathReason::Terminated => write!(w, "Terminated due to external signal"),
        }
    }
}

/// Process lifetime primitive
///
/// A service holds on to its heart and awaits its [`death`](Heart::death), which arrives either
/// through an external termination signal (SIGTERM / Ctrl+C) or through the paired [`HeartStone`].
pub struct Heart {
    rx: Receiver<String>,
}

impl Heart {
    /// Creates a new heart and the stone that can stop it remotely
    pub fn new() -> (Self, HeartStone) {
        let (tx, rx) = channel(2);

        (Self { rx }, HeartStone::new(tx))
    }

    /// Resolves once the process is supposed to shut down
    ///
    /// Dropping every [`HeartStone`] does not stop the heart; it merely means no kill request
    /// can arrive anymore and only an external signal remains.
    pub async fn death(&mut self) -> DeathReason {
        debug!("Heart starts beating");

        let rx = &mut self.rx;
        let kill = async move {
            match rx.next().await {
                Some(reason) => reason,
                // Channel closed, all stones are gone
                None => future::pending().await,
            }
        }
        .fuse();
        let signal = Heart::termination_signal().fuse();

        pin_mut!(kill, signal);

        select! {
            reason = kill => DeathReason::Killed(reason),
            () = signal => DeathReason::Terminated,
        }
    }

    async fn termination_signal() {
        let mut sigterm_stream = signal(SignalKind::terminate()).unwrap();
        let sigterm = sigterm_stream.recv().fuse();
        let ctrl_c = ctrl_c().fuse();

        pin_mut!(sigterm, ctrl_c);

        select! {
            _ = sigterm => (),
            _ = ctrl_c => (),
        };
    }
}

/// Remote control to stop a [`Heart`]
#[derive(Clone)]
pub struct HeartStone {
    remote: Sender<String>,
}

impl HeartStone {
    fn new(remote: Sender<String>) -> Self {
        Self { remote }
    }

    /// Kills the associated heart
    pub async fn kill(&mut self, reason: String) {
        if let Err(e) = self.remote.send(reason).await {
            error!("Failed to interact with Heart: {}", e);
        }
    }
}
