#![allow(dead_code)]

//! Simulated tracking feed for in-transit shipments.
//!
//! Without a real GPS feed, shipments in transit creep toward delivery on a
//! fixed interval. The simulator never touches the caller's fleet: it keeps
//! its own copy and emits [`ShipmentUpdate`] events for the caller to apply.
//! Status changes and new shipments reach that copy through the
//! [`SimulatorHandle`], ahead of the next tick.

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::domain::{advance, Fleet, Shipment, ShipmentStatus, ShipmentUpdate};

/// Largest progress step per tick, in percentage points.
pub const MAX_STEP: f64 = 5.0;

const UPDATE_BUFFER: usize = 64;
const COMMAND_BUFFER: usize = 16;

/// Caller-side fleet changes forwarded to the running simulator.
#[derive(Debug)]
enum FleetCommand {
    SetStatus { id: String, status: ShipmentStatus },
    Track(Shipment),
}

pub struct RefreshSimulator {
    interval: Duration,
    rng: StdRng,
}

impl RefreshSimulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with a specific seed for reproducible runs.
    pub fn with_seed(interval: Duration, seed: u64) -> Self {
        Self {
            interval,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Compute one tick: every in-transit shipment below 100 moves by a
    /// uniform step in `[0, MAX_STEP]`. Everything else is left alone.
    pub fn tick(&mut self, shipments: &[Shipment]) -> Vec<ShipmentUpdate> {
        shipments
            .iter()
            .filter(|shipment| shipment.is_moving())
            .filter_map(|shipment| {
                let step = self.rng.gen_range(0.0..=MAX_STEP);
                advance(shipment, step)
            })
            .collect()
    }

    /// Run on the tokio runtime until stopped. The first tick fires one full
    /// interval after spawning.
    pub fn spawn(self, fleet: Fleet) -> (SimulatorHandle, mpsc::Receiver<ShipmentUpdate>) {
        let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(fleet, update_tx, command_rx, stop_rx));
        (
            SimulatorHandle {
                commands: command_tx,
                stop: Some(stop_tx),
                task,
            },
            update_rx,
        )
    }

    async fn run(
        mut self,
        mut fleet: Fleet,
        updates: mpsc::Sender<ShipmentUpdate>,
        mut commands: mpsc::Receiver<FleetCommand>,
        mut stop: oneshot::Receiver<()>,
    ) {
        let start = time::Instant::now() + self.interval;
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::debug!(
            "[simulator] started with {} shipment(s), interval {:?}",
            fleet.shipments().len(),
            self.interval
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                Some(command) = commands.recv() => match command {
                    FleetCommand::SetStatus { id, status } => {
                        if !fleet.set_status(&id, status) {
                            log::debug!("[simulator] refused {status:?} for {id}");
                        }
                    }
                    FleetCommand::Track(shipment) => {
                        let id = shipment.id.clone();
                        if !fleet.track(shipment) {
                            log::debug!("[simulator] {id} already tracked");
                        }
                    }
                },
                _ = ticker.tick() => {
                    let batch = self.tick(fleet.shipments());
                    for update in batch {
                        fleet.apply(&update);
                        if updates.send(update).await.is_err() {
                            log::debug!("[simulator] subscriber gone; stopping");
                            return;
                        }
                    }
                }
            }
        }
        log::debug!("[simulator] stopped");
    }
}

/// Owner's handle on a running simulator. Dropping it also stops the task.
pub struct SimulatorHandle {
    commands: mpsc::Sender<FleetCommand>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Forward a status change the caller made on its own fleet, e.g.
    /// dispatching a pending pickup. Returns false once the task has ended.
    pub async fn set_status(&self, id: &str, status: ShipmentStatus) -> bool {
        let command = FleetCommand::SetStatus {
            id: id.to_string(),
            status,
        };
        self.commands.send(command).await.is_ok()
    }

    /// Start simulating a shipment added after spawn.
    pub async fn track(&self, shipment: Shipment) -> bool {
        self.commands.send(FleetCommand::Track(shipment)).await.is_ok()
    }

    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(err) = (&mut self.task).await {
            log::warn!("[simulator] task ended abnormally: {err}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
