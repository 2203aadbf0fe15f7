//! Response shapes for the Live Departure Boards operations.
//!
//! Field names follow the LDBWS schema; rule order is output order.
//! Collections of the top-level documents are always emitted, collections
//! nested inside services and calling points only when the source has them.
//!
//! ```text
//! StationBoard
//!     ├── trainServices / busServices / ferryServices: [ServiceItem]
//!     │       └── origin / destination: [ServiceLocation]
//!     └── nrccMessages: [text]
//!
//! ServiceDetails
//!     └── previousCallingPoints / subsequentCallingPoints: [[CallingPoint]]
//! ```

use std::sync::Arc;

use crate::projection::{ObjectShape, Projector, Rule};

/// All response shapes, built once at startup.
#[derive(Debug, Clone)]
pub struct Shapes {
    pub service_location: Arc<ObjectShape>,
    pub service_item: Arc<ObjectShape>,
    pub station_board: Arc<ObjectShape>,
    pub calling_point: Arc<ObjectShape>,
    pub service_details: Arc<ObjectShape>,
}

impl Shapes {
    pub fn new() -> Self {
        let service_location = Arc::new(service_location());
        let service_item = Arc::new(service_item(&service_location));
        let station_board = Arc::new(station_board(&service_item));
        let calling_point = Arc::new(calling_point());
        let service_details = Arc::new(service_details(&calling_point));

        Self {
            service_location,
            service_item,
            station_board,
            calling_point,
            service_details,
        }
    }
}

impl Default for Shapes {
    fn default() -> Self {
        Self::new()
    }
}

fn adhoc_alerts() -> Rule {
    Rule::list("adhocAlerts", Projector::text())
}

fn nested_adhoc_alerts() -> Rule {
    Rule::optional_list("adhocAlerts", Projector::text())
}

pub fn service_location() -> ObjectShape {
    ObjectShape::new(
        "service_location",
        vec![
            Rule::text("futureChangeTo"),
            Rule::text("via"),
            Rule::text("crs"),
            Rule::text("locationName"),
            Rule::text("assocIsCancelled"),
        ],
    )
}

pub fn service_item(location: &Arc<ObjectShape>) -> ObjectShape {
    ObjectShape::new(
        "service_item",
        vec![
            Rule::text("sta"),
            Rule::text("eta"),
            Rule::text("std"),
            Rule::text("etd"),
            Rule::text("platform"),
            Rule::text("operator"),
            Rule::text("operatorCode"),
            Rule::text("isCircularRoute"),
            Rule::text("serviceID"),
            Rule::optional_list("origin", Projector::object(location)),
            Rule::optional_list("destination", Projector::object(location)),
            nested_adhoc_alerts(),
        ],
    )
}

pub fn station_board(service: &Arc<ObjectShape>) -> ObjectShape {
    ObjectShape::new(
        "station_board",
        vec![
            Rule::timestamp("generatedAt"),
            Rule::text("locationName"),
            Rule::text("crs"),
            Rule::text("filterLocationName"),
            Rule::text("filtercrs"),
            Rule::text("filterType"),
            Rule::text("platformAvailable"),
            Rule::text("areServicesAvailable"),
            Rule::list("trainServices", Projector::object(service)),
            Rule::list("busServices", Projector::object(service)),
            Rule::list("ferryServices", Projector::object(service)),
            Rule::list("nrccMessages", Projector::text()),
        ],
    )
}

pub fn calling_point() -> ObjectShape {
    ObjectShape::new(
        "calling_point",
        vec![
            Rule::text("locationName"),
            Rule::text("crs"),
            Rule::text("st"),
            Rule::text("et"),
            Rule::text("at"),
            nested_adhoc_alerts(),
        ],
    )
}

pub fn service_details(calling_point: &Arc<ObjectShape>) -> ObjectShape {
    // Each calling-point list is itself a sequence of calling points.
    let calling_point_lists = || Projector::list(Projector::object(calling_point));

    ObjectShape::new(
        "service_details",
        vec![
            Rule::timestamp("generatedAt"),
            Rule::text("serviceType"),
            Rule::text("locationName"),
            Rule::text("crs"),
            Rule::text("operator"),
            Rule::text("operatorCode"),
            Rule::text("isCancelled"),
            Rule::text("disruptionReason"),
            Rule::text("overdueMessage"),
            Rule::text("platform"),
            Rule::text("sta"),
            Rule::text("eta"),
            Rule::text("ata"),
            Rule::text("std"),
            Rule::text("etd"),
            Rule::text("atd"),
            adhoc_alerts(),
            Rule::list("previousCallingPoints", calling_point_lists()),
            Rule::list("subsequentCallingPoints", calling_point_lists()),
        ],
    )
}
