//! Request lifecycle controller.
//!
//! Owns the single in-flight service call and emits events for presentation layers.

use crate::model::{ServiceRequest, YamlResponse};
use crate::service::{ServiceError, YamlService};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Dispatch(ServiceRequest),
    Quit,
}

/// Events sent back to UI layers.
#[derive(Debug)]
pub(crate) enum ControllerEvent {
    Resolved(Result<YamlResponse, ServiceError>),
}

type CallHandle = tokio::task::JoinHandle<Result<YamlResponse, ServiceError>>;

fn start_call(service: &Arc<dyn YamlService>, request: ServiceRequest) -> CallHandle {
    let service = service.clone();
    tokio::spawn(async move { service.call(&request).await })
}

/// Run service calls on behalf of the UI, at most one at a time.
pub(crate) async fn run_controller(
    service: Arc<dyn YamlService>,
    event_tx: UnboundedSender<ControllerEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: Option<CallHandle> = None;
    let mut quit_pending = false;

    loop {
        tokio::select! {
            // Commands first so a queued Dispatch is seen (and dropped) while a call is in flight.
            biased;
            cmd = cmd_rx.recv(), if !quit_pending => {
                match cmd {
                    Some(UiCommand::Dispatch(request)) => {
                        if in_flight.is_some() {
                            tracing::warn!("dispatch ignored: a request is already in flight");
                        } else {
                            in_flight = Some(start_call(&service, request));
                        }
                    }
                    // Quit waits for the current call so its outcome is not lost mid-write.
                    Some(UiCommand::Quit) | None => {
                        quit_pending = true;
                        if in_flight.is_none() {
                            break;
                        }
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            join_res = async {
                match in_flight.as_mut() {
                    Some(h) => h.await,
                    None => futures::future::pending().await,
                }
            } => {
                in_flight = None;
                let result = match join_res {
                    Ok(r) => r,
                    Err(e) => Err(ServiceError::Network(format!("request task failed: {e}"))),
                };
                let _ = event_tx.send(ControllerEvent::Resolved(result));
                if quit_pending {
                    break;
                }
            }
        }
    }

    Ok(())
}
