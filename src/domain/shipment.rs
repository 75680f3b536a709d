#![allow(dead_code)]

//! Shipments tracked by the logistics panel and the updates that move them.

use serde::{Deserialize, Serialize};

use crate::util::next_id;

pub const PROGRESS_MIN: f64 = 0.0;
pub const PROGRESS_MAX: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentKind {
    Delivery,
    Pickup,
}

/// `Pending -> InTransit -> Delivered`, driven by progress. `Delayed` is only
/// ever assigned from outside the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Delayed,
}

impl ShipmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "PENDING",
            ShipmentStatus::InTransit => "IN TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Delayed => "DELAYED",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub kind: ShipmentKind,
    pub item: String,
    pub quantity: String,
    pub origin: String,
    pub destination: String,
    pub driver: String,
    pub phone: String,
    pub status: ShipmentStatus,
    pub progress: f64,
    pub estimated_time: String,
    pub tracking_code: String,
}

impl Shipment {
    /// True when the simulator is allowed to move this shipment.
    pub fn is_moving(&self) -> bool {
        self.status == ShipmentStatus::InTransit && self.progress < PROGRESS_MAX
    }

    /// Bring caller-supplied state in line with the status machine: progress
    /// within `0..=100`, and delivered exactly when progress is 100.
    pub fn normalized(mut self) -> Self {
        let progress = if self.progress.is_nan() {
            PROGRESS_MIN
        } else {
            self.progress.clamp(PROGRESS_MIN, PROGRESS_MAX)
        };
        if self.status == ShipmentStatus::Delivered || progress >= PROGRESS_MAX {
            self.mark_delivered();
        } else {
            self.progress = progress;
        }
        self
    }

    /// Whether `status` may be assigned from outside the simulator.
    ///
    /// Delivery only happens through progress, a delivered shipment is final,
    /// and a shipment that has left cannot go back to pending.
    pub fn accepts(&self, status: ShipmentStatus) -> bool {
        match (self.status, status) {
            (ShipmentStatus::Delivered, _) | (_, ShipmentStatus::Delivered) => false,
            (_, ShipmentStatus::Pending) => self.progress <= PROGRESS_MIN,
            _ => true,
        }
    }

    fn mark_delivered(&mut self) {
        self.progress = PROGRESS_MAX;
        self.status = ShipmentStatus::Delivered;
        self.estimated_time = "Completed".to_string();
    }
}

/// New state for one shipment, emitted by the refresh simulator.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipmentUpdate {
    pub id: String,
    pub progress: f64,
    pub status: ShipmentStatus,
}

/// Advance a single shipment by `increment` percentage points.
///
/// Returns `None` for shipments that are not in transit. Progress is clamped
/// to `0..=100` and the status flips to delivered in the same step that
/// reaches 100.
pub fn advance(shipment: &Shipment, increment: f64) -> Option<ShipmentUpdate> {
    if !shipment.is_moving() {
        return None;
    }

    let step = if increment.is_finite() {
        increment.max(0.0)
    } else {
        0.0
    };
    let progress = (shipment.progress + step).clamp(PROGRESS_MIN, PROGRESS_MAX);
    let status = if progress >= PROGRESS_MAX {
        ShipmentStatus::Delivered
    } else {
        ShipmentStatus::InTransit
    };

    Some(ShipmentUpdate {
        id: shipment.id.clone(),
        progress,
        status,
    })
}

/// Shipment list owned by the dashboard session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fleet {
    shipments: Vec<Shipment>,
}

impl Fleet {
    pub fn new(shipments: Vec<Shipment>) -> Self {
        Self {
            shipments: shipments.into_iter().map(Shipment::normalized).collect(),
        }
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    pub fn get(&self, id: &str) -> Option<&Shipment> {
        self.shipments.iter().find(|shipment| shipment.id == id)
    }

    pub fn in_transit(&self) -> impl Iterator<Item = &Shipment> {
        self.shipments.iter().filter(|shipment| shipment.is_moving())
    }

    pub fn has_moving(&self) -> bool {
        self.shipments.iter().any(Shipment::is_moving)
    }

    /// Apply a simulator update. Updates for unknown shipments, or for
    /// shipments no longer in transit, are ignored. Returns whether the fleet
    /// changed.
    pub fn apply(&mut self, update: &ShipmentUpdate) -> bool {
        let Some(shipment) = self
            .shipments
            .iter_mut()
            .find(|shipment| shipment.id == update.id)
        else {
            return false;
        };
        if shipment.status != ShipmentStatus::InTransit {
            return false;
        }

        let progress = update
            .progress
            .clamp(PROGRESS_MIN, PROGRESS_MAX)
            .max(shipment.progress);
        if progress >= PROGRESS_MAX {
            shipment.mark_delivered();
        } else {
            shipment.progress = progress;
        }
        true
    }

    /// External status assignment, e.g. a carrier reporting a delay or a
    /// pending pickup being dispatched. Refused when [`Shipment::accepts`]
    /// says no.
    pub fn set_status(&mut self, id: &str, status: ShipmentStatus) -> bool {
        match self.shipments.iter_mut().find(|shipment| shipment.id == id) {
            Some(shipment) if shipment.accepts(status) => {
                shipment.status = status;
                true
            }
            _ => false,
        }
    }

    /// Add a shipment, normalised. Refused when the id is already tracked.
    pub fn track(&mut self, shipment: Shipment) -> bool {
        if self.get(&shipment.id).is_some() {
            return false;
        }
        self.shipments.push(shipment.normalized());
        true
    }
}

/// The three shipments the logistics panel opens with.
pub fn sample_fleet() -> Fleet {
    Fleet::new(vec![
        Shipment {
            id: next_id("SHP"),
            kind: ShipmentKind::Delivery,
            item: "Fertilizer (Urea)".to_string(),
            quantity: "10 bags".to_string(),
            origin: "Delhi Warehouse".to_string(),
            destination: "Your Farm, Punjab".to_string(),
            driver: "Rajesh Kumar".to_string(),
            phone: "+91-98765-43210".to_string(),
            status: ShipmentStatus::InTransit,
            progress: 65.0,
            estimated_time: "2 hours".to_string(),
            tracking_code: "TRK001234".to_string(),
        },
        Shipment {
            id: next_id("SHP"),
            kind: ShipmentKind::Pickup,
            item: "Wheat Produce".to_string(),
            quantity: "50 quintals".to_string(),
            origin: "Your Farm, Punjab".to_string(),
            destination: "Delhi Mandi".to_string(),
            driver: "Suresh Singh".to_string(),
            phone: "+91-87654-32109".to_string(),
            status: ShipmentStatus::Pending,
            progress: 0.0,
            estimated_time: "Tomorrow 9 AM".to_string(),
            tracking_code: "TRK001235".to_string(),
        },
        Shipment {
            id: next_id("SHP"),
            kind: ShipmentKind::Delivery,
            item: "Seeds (Hybrid)".to_string(),
            quantity: "25 kg".to_string(),
            origin: "Haryana Depot".to_string(),
            destination: "Your Farm, Punjab".to_string(),
            driver: "Vikram Yadav".to_string(),
            phone: "+91-76543-21098".to_string(),
            status: ShipmentStatus::Delivered,
            progress: 100.0,
            estimated_time: "Completed".to_string(),
            tracking_code: "TRK001236".to_string(),
        },
    ])
}

#[cfg(test)]
pub(crate) fn shipment(status: ShipmentStatus, progress: f64) -> Shipment {
    Shipment {
        id: next_id("TEST"),
        kind: ShipmentKind::Delivery,
        item: "Urea".to_string(),
        quantity: "1 bag".to_string(),
        origin: "Depot".to_string(),
        destination: "Farm".to_string(),
        driver: "Driver".to_string(),
        phone: "+91-00000-00000".to_string(),
        status,
        progress,
        estimated_time: "1 hour".to_string(),
        tracking_code: "TRK000000".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_shipment_does_not_move() {
        let pending = shipment(ShipmentStatus::Pending, 0.0);
        assert_eq!(advance(&pending, 4.0), None);
    }

    #[test]
    fn crossing_one_hundred_delivers() {
        let nearly = shipment(ShipmentStatus::InTransit, 97.0);
        let update = advance(&nearly, 3.5).expect("in-transit shipment moves");
        assert_eq!(update.progress, 100.0);
        assert_eq!(update.status, ShipmentStatus::Delivered);
    }

    #[test]
    fn small_step_stays_in_transit() {
        let moving = shipment(ShipmentStatus::InTransit, 40.0);
        let update = advance(&moving, 2.0).expect("in-transit shipment moves");
        assert_eq!(update.progress, 42.0);
        assert_eq!(update.status, ShipmentStatus::InTransit);
    }

    #[test]
    fn negative_or_nan_increment_never_moves_backwards() {
        let moving = shipment(ShipmentStatus::InTransit, 40.0);
        assert_eq!(advance(&moving, -3.0).map(|u| u.progress), Some(40.0));
        assert_eq!(advance(&moving, f64::NAN).map(|u| u.progress), Some(40.0));
    }

    #[test]
    fn apply_delivers_and_freezes() {
        let moving = shipment(ShipmentStatus::InTransit, 98.0);
        let id = moving.id.clone();
        let mut fleet = Fleet::new(vec![moving]);

        assert!(fleet.apply(&ShipmentUpdate {
            id: id.clone(),
            progress: 100.0,
            status: ShipmentStatus::Delivered,
        }));
        let delivered = fleet.get(&id).expect("shipment present");
        assert_eq!(delivered.status, ShipmentStatus::Delivered);
        assert_eq!(delivered.progress, 100.0);

        assert!(!fleet.apply(&ShipmentUpdate {
            id: id.clone(),
            progress: 50.0,
            status: ShipmentStatus::InTransit,
        }));
        assert_eq!(fleet.get(&id).map(|s| s.progress), Some(100.0));
        assert!(!fleet.set_status(&id, ShipmentStatus::Delayed));
    }

    #[test]
    fn apply_ignores_unknown_ids() {
        let mut fleet = Fleet::new(vec![shipment(ShipmentStatus::InTransit, 10.0)]);
        let before = fleet.clone();
        assert!(!fleet.apply(&ShipmentUpdate {
            id: "missing".to_string(),
            progress: 20.0,
            status: ShipmentStatus::InTransit,
        }));
        assert_eq!(fleet, before);
    }

    #[test]
    fn delayed_is_external_only() {
        let moving = shipment(ShipmentStatus::InTransit, 10.0);
        let id = moving.id.clone();
        let mut fleet = Fleet::new(vec![moving]);
        assert!(fleet.set_status(&id, ShipmentStatus::Delayed));
        assert!(!fleet.has_moving());
    }

    #[test]
    fn delivered_cannot_be_assigned() {
        let moving = shipment(ShipmentStatus::InTransit, 10.0);
        let id = moving.id.clone();
        let mut fleet = Fleet::new(vec![moving]);

        assert!(!fleet.set_status(&id, ShipmentStatus::Delivered));
        let unchanged = fleet.get(&id).expect("shipment present");
        assert_eq!(unchanged.status, ShipmentStatus::InTransit);
        assert_eq!(unchanged.progress, 10.0);
    }

    #[test]
    fn pending_only_before_departure() {
        let departed = shipment(ShipmentStatus::InTransit, 10.0);
        let waiting = shipment(ShipmentStatus::Delayed, 0.0);
        let (departed_id, waiting_id) = (departed.id.clone(), waiting.id.clone());
        let mut fleet = Fleet::new(vec![departed, waiting]);

        assert!(!fleet.set_status(&departed_id, ShipmentStatus::Pending));
        assert!(fleet.set_status(&waiting_id, ShipmentStatus::Pending));
        assert!(fleet.set_status(&waiting_id, ShipmentStatus::InTransit));
        assert!(fleet.set_status(&departed_id, ShipmentStatus::Delayed));
        assert!(fleet.set_status(&departed_id, ShipmentStatus::InTransit));
    }

    #[test]
    fn new_fleet_normalises_progress_and_delivery() {
        let fleet = Fleet::new(vec![
            shipment(ShipmentStatus::InTransit, 150.0),
            shipment(ShipmentStatus::Delivered, 40.0),
            shipment(ShipmentStatus::Pending, -5.0),
            shipment(ShipmentStatus::InTransit, f64::NAN),
        ]);
        let state: Vec<_> = fleet
            .shipments()
            .iter()
            .map(|s| (s.status, s.progress))
            .collect();
        assert_eq!(
            state,
            vec![
                (ShipmentStatus::Delivered, 100.0),
                (ShipmentStatus::Delivered, 100.0),
                (ShipmentStatus::Pending, 0.0),
                (ShipmentStatus::InTransit, 0.0),
            ]
        );
        assert_eq!(fleet.shipments()[1].estimated_time, "Completed");
    }

    #[test]
    fn track_adds_once() {
        let mut fleet = Fleet::default();
        let extra = shipment(ShipmentStatus::InTransit, 120.0);
        assert!(fleet.track(extra.clone()));
        assert!(!fleet.track(extra));
        assert_eq!(fleet.shipments().len(), 1);
        assert_eq!(fleet.shipments()[0].status, ShipmentStatus::Delivered);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ShipmentStatus::InTransit).expect("serialize");
        assert_eq!(json, "\"in-transit\"");
    }

    #[test]
    fn sample_fleet_has_one_moving_shipment() {
        let fleet = sample_fleet();
        assert_eq!(fleet.shipments().len(), 3);
        assert_eq!(fleet.in_transit().count(), 1);
    }
}
