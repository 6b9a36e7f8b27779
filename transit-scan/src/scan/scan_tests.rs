//! Scenario tests across the three scans.

use super::*;
use crate::domain::{Connection, ConnectionMode, StopId, Time, TripId};
use crate::journey::{Journey, ParetoComparator, ProfileComparator, Step, TransferMetric, TravelTime};
use crate::store::{ConnectionStore, Timetable};
use crate::transfer::{FootpathTable, FootpathTableBuilder, InternalTransferGenerator, TransferGenerator};

const A: StopId = StopId(0);
const B: StopId = StopId(1);
const C: StopId = StopId(2);
const D: StopId = StopId(3);
const E: StopId = StopId(4);

fn conn(id: &str, from: StopId, to: StopId, dep: Time, arr: Time, trip: u32) -> Connection {
    Connection::between(id, from, to, dep, arr, Some(TripId(trip))).unwrap()
}

fn store(connections: Vec<Connection>) -> ConnectionStore {
    let mut store = ConnectionStore::new("test");
    store.extend(connections).unwrap();
    store.seal();
    store
}

fn no_change() -> InternalTransferGenerator {
    InternalTransferGenerator::new(0)
}

fn earliest<T: TransferGenerator>(
    timetable: &Timetable<'_>,
    transfers: T,
    settings: ScanSettings,
) -> Result<Journey<TransferMetric>, ScanError> {
    EarliestConnectionScan::<_, TransferMetric>::new(timetable, transfers, &ScanConfig::default(), settings)?
        .calculate_journey()
}

fn latest<T: TransferGenerator>(
    timetable: &Timetable<'_>,
    transfers: T,
    settings: ScanSettings,
) -> Result<Journey<TransferMetric>, ScanError> {
    LatestConnectionScan::<_, TransferMetric>::new(timetable, transfers, &ScanConfig::default(), settings)?
        .calculate_journey()
}

fn profile<T: TransferGenerator>(
    timetable: &Timetable<'_>,
    transfers: T,
    config: &ScanConfig,
    settings: ScanSettings,
) -> Result<std::collections::HashMap<StopId, Vec<Journey<TransferMetric>>>, ScanError> {
    ProfiledConnectionScan::<_, TransferMetric, _, _>::new(
        timetable,
        transfers,
        config,
        settings,
        ProfileComparator,
        ParetoComparator,
    )?
    .calculate_journeys()
}

fn ride_ids(journey: &Journey<TransferMetric>) -> Vec<String> {
    journey.connections().map(|c| c.global_id().to_string()).collect()
}

// ============================================================================
// Earliest arrival
// ============================================================================

#[test]
fn two_trips_with_enough_layover() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 200, 260, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();

    assert_eq!(journey.arrival_time(), 260);
    assert_eq!(journey.departure_time(), 100);
    assert_eq!(journey.metric().transfers(), 1);
    assert_eq!(ride_ids(&journey), vec!["ab", "bc"]);
    assert_eq!(journey.departure_stop(), A);
    assert_eq!(journey.arrival_stop(), C);
}

#[test]
fn departure_before_arrival_is_missed() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 159, 219, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let result = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);
}

#[test]
fn missed_connection_falls_back_to_later_one() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1),
        conn("bc-early", B, C, 159, 219, 2),
        conn("bc-late", B, C, 250, 290, 3),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();
    assert_eq!(journey.arrival_time(), 290);
    assert_eq!(ride_ids(&journey), vec!["ab", "bc-late"]);
}

#[test]
fn zero_dwell_trip_is_followed_after_seal() {
    // Inserted out of trip order at the same timestamp.
    let store = store(vec![
        conn("bd", B, D, 100, 200, 7),
        conn("ec", E, C, 100, 150, 8),
        conn("ab", A, B, 100, 100, 7),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, D, 0, 300)).unwrap();
    assert_eq!(journey.arrival_time(), 200);
    assert_eq!(journey.metric().transfers(), 0);
    assert_eq!(ride_ids(&journey), vec!["ab", "bd"]);
}

#[test]
fn minimum_change_time_applies_between_trips() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1),
        conn("bc-tight", B, C, 170, 230, 2),
        conn("bc", B, C, 200, 260, 3),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(
        &timetable,
        InternalTransferGenerator::new(30),
        ScanSettings::new(A, C, 0, 300),
    )
    .unwrap();
    assert_eq!(ride_ids(&journey), vec!["ab", "bc"]);

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();
    assert_eq!(ride_ids(&journey), vec!["ab", "bc-tight"]);
}

#[test]
fn staying_seated_needs_no_change_time() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 160, 220, 1)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(
        &timetable,
        InternalTransferGenerator::new(600),
        ScanSettings::new(A, C, 0, 300),
    )
    .unwrap();
    assert_eq!(journey.arrival_time(), 220);
    assert_eq!(journey.metric().transfers(), 0);
}

#[test]
fn footpath_between_trips() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("ec", E, C, 230, 300, 2)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(B, E, 60).build();

    let journey = earliest(&timetable, &footpaths, ScanSettings::new(A, C, 0, 400)).unwrap();
    assert_eq!(journey.arrival_time(), 300);
    assert_eq!(journey.metric().walking_secs(), 60);
    assert!(journey.steps().iter().any(|s| matches!(s, Step::Transfer(t) if t.from == B && t.to == E)));

    // Nothing connects B and E without the footpath.
    let result = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 400));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);
}

#[test]
fn walking_connections_need_no_trip() {
    let walk = Connection::between("walk", B, E, 160, 220, None).unwrap();
    let store = store(vec![conn("ab", A, B, 100, 160, 1), walk, conn("ec", E, C, 230, 300, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(&timetable, InternalTransferGenerator::new(120), ScanSettings::new(A, C, 0, 400))
        .unwrap();
    assert_eq!(journey.arrival_time(), 300);
    assert_eq!(journey.metric().vehicles(), 2);
    assert_eq!(journey.metric().walking_secs(), 60);
}

#[test]
fn multiple_targets_return_the_earliest() {
    let store = store(vec![conn("ab", A, B, 100, 200, 1), conn("ac", A, C, 100, 150, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let settings = ScanSettings::new(A, B, 0, 300).with_target_stop(C);
    let journey = earliest(&timetable, no_change(), settings).unwrap();
    assert_eq!(journey.arrival_stop(), C);
    assert_eq!(journey.arrival_time(), 150);
}

#[test]
fn multiple_departure_stops() {
    let store = store(vec![conn("ac", A, C, 100, 300, 1), conn("bc", B, C, 150, 200, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let settings = ScanSettings::new(A, C, 0, 400).with_departure_stop(B);
    let journey = earliest(&timetable, no_change(), settings).unwrap();
    assert_eq!(journey.departure_stop(), B);
    assert_eq!(journey.arrival_time(), 200);
}

#[test]
fn travel_time_metric() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 200, 260, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = EarliestConnectionScan::<_, TravelTime>::new(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, C, 0, 300),
    )
    .unwrap()
    .calculate_journey()
    .unwrap();
    assert_eq!(journey.metric().travel_time(), 160);
}

#[test]
fn earliest_isochrone() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1),
        conn("bc", B, C, 200, 260, 2),
        conn("cd", C, D, 400, 500, 3),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let reached = EarliestConnectionScan::<_, TransferMetric>::new(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, B, 0, 300),
    )
    .unwrap()
    .isochrone()
    .unwrap();

    // Targets do not stop the scan, the window does.
    assert_eq!(reached[&B].arrival_time(), 160);
    assert_eq!(reached[&C].arrival_time(), 260);
    assert_eq!(reached[&A].legs().count(), 0);
    assert!(!reached.contains_key(&D));
}

// ============================================================================
// Connection modes
// ============================================================================

#[test]
fn cancelled_connections_are_ignored() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1).with_mode(ConnectionMode::CANCELLED),
        conn("ab-late", A, B, 200, 260, 2),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, B, 0, 300)).unwrap();
    assert_eq!(ride_ids(&journey), vec!["ab-late"]);

    let journey = latest(&timetable, no_change(), ScanSettings::new(A, B, 0, 300)).unwrap();
    assert_eq!(ride_ids(&journey), vec!["ab-late"]);
}

#[test]
fn no_boarding_allows_staying_seated() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1),
        conn("bc", B, C, 160, 220, 1).with_mode(ConnectionMode::NO_BOARDING),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();
    assert_eq!(journey.arrival_time(), 220);

    let result = earliest(&timetable, no_change(), ScanSettings::new(B, C, 0, 300));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);

    let result = latest(&timetable, no_change(), ScanSettings::new(B, C, 0, 300));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);
}

#[test]
fn no_alighting_keeps_traveller_on_board() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1).with_mode(ConnectionMode::NO_ALIGHTING),
        conn("bc", B, C, 160, 220, 1),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let result = earliest(&timetable, no_change(), ScanSettings::new(A, B, 0, 300));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();
    assert_eq!(journey.arrival_time(), 220);

    let journey = latest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();
    assert_eq!(journey.departure_time(), 100);
}

// ============================================================================
// Latest departure
// ============================================================================

#[test]
fn latest_departure_picks_last_option() {
    let store = store(vec![conn("ab-1", A, B, 100, 200, 1), conn("ab-2", A, B, 300, 400, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = latest(&timetable, no_change(), ScanSettings::new(A, B, 0, 500)).unwrap();
    assert_eq!(journey.departure_time(), 300);
    assert_eq!(journey.arrival_time(), 400);

    let journey = earliest(&timetable, no_change(), ScanSettings::new(A, B, 0, 500)).unwrap();
    assert_eq!(journey.arrival_time(), 200);
}

#[test]
fn latest_respects_deadline() {
    let store = store(vec![conn("ab-1", A, B, 100, 200, 1), conn("ab-2", A, B, 300, 400, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = latest(&timetable, no_change(), ScanSettings::new(A, B, 0, 399)).unwrap();
    assert_eq!(journey.departure_time(), 100);
}

#[test]
fn latest_two_trips_in_travel_order() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 200, 260, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let journey = latest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300)).unwrap();
    assert_eq!(ride_ids(&journey), vec!["ab", "bc"]);
    assert_eq!(journey.metric().transfers(), 1);
    assert_eq!(journey.arrival_time(), 260);

    let result = latest(
        &timetable,
        InternalTransferGenerator::new(41),
        ScanSettings::new(A, C, 0, 300),
    );
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);
}

#[test]
fn latest_with_footpath() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("ec", E, C, 230, 300, 2)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(B, E, 60).build();

    let journey = latest(&timetable, &footpaths, ScanSettings::new(A, C, 0, 400)).unwrap();
    assert_eq!(journey.departure_time(), 100);
    assert_eq!(journey.arrival_time(), 300);
    assert_eq!(journey.metric().walking_secs(), 60);
}

#[test]
fn earliest_and_latest_agree_on_direct_network() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1),
        conn("bc", B, C, 160, 220, 1),
        conn("cd", C, D, 300, 380, 2),
    ]);
    let timetable = Timetable::single(&store).unwrap();
    let settings = ScanSettings::new(A, D, 0, 1_000);

    let forward = earliest(&timetable, no_change(), settings.clone()).unwrap();
    let backward = latest(&timetable, no_change(), settings).unwrap();

    assert_eq!(forward.arrival_time(), backward.arrival_time());
    assert_eq!(forward.departure_time(), backward.departure_time());
    assert_eq!(forward.metric(), backward.metric());
    assert_eq!(ride_ids(&forward), ride_ids(&backward));
}

#[test]
fn latest_isochrone() {
    let store = store(vec![
        conn("ab", A, B, 100, 160, 1),
        conn("bc", B, C, 200, 260, 2),
        conn("dc", D, C, 280, 400, 3),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let reached = LatestConnectionScan::<_, TransferMetric>::new(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, C, 0, 300),
    )
    .unwrap()
    .isochrone()
    .unwrap();

    assert_eq!(reached[&B].departure_time(), 200);
    assert_eq!(reached[&A].departure_time(), 100);
    assert!(!reached.contains_key(&D));
}

// ============================================================================
// Profiles
// ============================================================================

fn three_options() -> ConnectionStore {
    store(vec![
        // fast with one change
        conn("ab", A, B, 100, 200, 1),
        conn("bd", B, D, 210, 300, 2),
        // slow and direct
        conn("ad", A, D, 100, 400, 3),
        // slower than both and a change
        conn("ac", A, C, 100, 250, 4),
        conn("cd", C, D, 260, 450, 5),
    ])
}

#[test]
fn profile_keeps_incomparable_options() {
    let store = three_options();
    let timetable = Timetable::single(&store).unwrap();

    let profiles = profile(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, D, 0, 1_000),
    )
    .unwrap();

    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 2);
    assert_eq!(ride_ids(&journeys[0]), vec!["ab", "bd"]);
    assert_eq!(journeys[0].metric().transfers(), 1);
    assert_eq!(journeys[0].arrival_time(), 300);
    assert_eq!(ride_ids(&journeys[1]), vec!["ad"]);
    assert_eq!(journeys[1].metric().transfers(), 0);
    assert!(journeys.iter().all(|j| j.arrival_time() != 450));
}

#[test]
fn profile_without_earliest_arrival_pruning() {
    let store = three_options();
    let timetable = Timetable::single(&store).unwrap();
    let config = ScanConfig::new(500.0, None, 86_400, false);

    let profiles = profile(&timetable, no_change(), &config, ScanSettings::new(A, D, 0, 1_000)).unwrap();
    assert_eq!(profiles[&A].len(), 2);
}

#[test]
fn profile_over_departure_times() {
    let store = store(vec![conn("ab-1", A, B, 100, 200, 1), conn("ab-2", A, B, 300, 400, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let profiles = ProfiledConnectionScan::<_, TransferMetric, _, _>::new(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, B, 0, 500),
        ProfileComparator,
        ProfileComparator,
    )
    .unwrap()
    .calculate_journeys()
    .unwrap();

    let departures: Vec<Time> = profiles[&A].iter().map(|j| j.departure_time()).collect();
    assert_eq!(departures, vec![100, 300]);

    // The final travel-time filter sees the two as equal and keeps one.
    let profiles = profile(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, B, 0, 500),
    )
    .unwrap();
    assert_eq!(profiles[&A].len(), 1);
}

#[test]
fn profile_respects_change_time() {
    let store = three_options();
    let timetable = Timetable::single(&store).unwrap();

    let profiles = profile(
        &timetable,
        InternalTransferGenerator::new(15),
        &ScanConfig::default(),
        ScanSettings::new(A, D, 0, 1_000),
    )
    .unwrap();

    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 1);
    assert_eq!(ride_ids(&journeys[0]), vec!["ad"]);
}

#[test]
fn profile_stays_seated_through_trip() {
    let store = store(vec![
        conn("ab", A, B, 100, 150, 1),
        conn("bc", B, C, 150, 200, 1),
        conn("cd", C, D, 200, 250, 1),
    ]);
    let timetable = Timetable::single(&store).unwrap();

    let profiles = profile(
        &timetable,
        InternalTransferGenerator::new(600),
        &ScanConfig::default(),
        ScanSettings::new(A, D, 0, 1_000),
    )
    .unwrap();

    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 1);
    assert_eq!(ride_ids(&journeys[0]), vec!["ab", "bc", "cd"]);
    assert_eq!(journeys[0].metric().transfers(), 0);
}

#[test]
fn profile_terminal_footpath() {
    let store = store(vec![conn("ab", A, B, 100, 200, 1), conn("ed", E, D, 900, 950, 9)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(B, E, 60).build();

    let profiles = profile(&timetable, &footpaths, &ScanConfig::default(), ScanSettings::new(A, E, 0, 1_000))
        .unwrap();

    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 1);
    assert_eq!(journeys[0].arrival_time(), 260);
    assert_eq!(journeys[0].arrival_stop(), E);
    assert_eq!(journeys[0].metric().walking_secs(), 60);
}

#[test]
fn profile_walk_to_first_stop() {
    let store = store(vec![conn("ab", A, B, 100, 200, 1), conn("ed", E, D, 900, 950, 9)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths: FootpathTable = FootpathTableBuilder::new().add(E, A, 60).build();

    let profiles = profile(&timetable, &footpaths, &ScanConfig::default(), ScanSettings::new(E, B, 0, 1_000))
        .unwrap();

    let journeys = &profiles[&E];
    assert_eq!(journeys.len(), 1);
    let first = &journeys[0].steps()[0];
    assert!(matches!(first, Step::Transfer(t) if t.from == E && t.to == A && t.departure_time == 40));
    assert_eq!(journeys[0].departure_time(), 40);
    assert_eq!(journeys[0].arrival_time(), 200);
}

#[test]
fn profile_transfer_via_footpath() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("ec", E, C, 230, 300, 2)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(B, E, 60).build();

    let profiles = profile(&timetable, &footpaths, &ScanConfig::default(), ScanSettings::new(A, C, 0, 400))
        .unwrap();

    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 1);
    assert_eq!(ride_ids(&journeys[0]), vec!["ab", "ec"]);
    assert_eq!(journeys[0].metric().walking_secs(), 60);
}

#[test]
fn unreachable_profile_is_empty() {
    let store = store(vec![conn("ab", A, B, 100, 200, 1), conn("cd", C, D, 100, 200, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    for prune in [true, false] {
        let config = ScanConfig::new(500.0, None, 86_400, prune);
        let profiles = profile(&timetable, no_change(), &config, ScanSettings::new(A, D, 0, 1_000)).unwrap();
        assert!(profiles[&A].is_empty(), "prune = {prune}");
    }
}

#[test]
fn profile_journeys_read_departure_to_arrival() {
    let store = three_options();
    let timetable = Timetable::single(&store).unwrap();

    let profiles = profile(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, D, 0, 1_000),
    )
    .unwrap();

    for journey in &profiles[&A] {
        let steps = journey.steps();
        for pair in steps.windows(2) {
            assert_eq!(pair[0].arrival_stop(), pair[1].departure_stop());
            assert!(pair[0].arrival_time() <= pair[1].departure_time());
        }
    }
}

// ============================================================================
// Footpath chains
// ============================================================================

fn profile_with_final<T: TransferGenerator>(
    timetable: &Timetable<'_>,
    transfers: T,
    settings: ScanSettings,
) -> Vec<Journey<TransferMetric>> {
    let departure = settings.departure_stops[0];
    let mut profiles = ProfiledConnectionScan::<_, TransferMetric, _, _>::new(
        timetable,
        transfers,
        &ScanConfig::default(),
        settings,
        ProfileComparator,
        ProfileComparator,
    )
    .unwrap()
    .calculate_journeys()
    .unwrap();
    profiles.remove(&departure).unwrap()
}

fn span(journey: &Journey<TransferMetric>) -> (Time, Time) {
    (journey.departure_time(), journey.arrival_time())
}

#[test]
fn stop_reached_on_foot_keeps_walking() {
    // A walk reaches B long before the vehicle does.
    let store = store(vec![conn("ab", A, B, 100, 150, 1), conn("de", D, E, 900, 950, 9)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(A, B, 10).add(B, D, 10).build();
    let settings = ScanSettings::new(A, D, 0, 400);

    let journey = earliest(&timetable, &footpaths, settings.clone()).unwrap();
    assert_eq!(span(&journey), (0, 20));
    assert_eq!(journey.metric().vehicles(), 0);
    assert_eq!(journey.metric().walking_secs(), 20);
    assert_eq!(journey.legs().count(), 2);

    let journey = latest(&timetable, &footpaths, settings.clone()).unwrap();
    assert_eq!(span(&journey), (380, 400));
    assert_eq!(journey.connections().count(), 0);

    // Pruning with the earliest arrival scan must not hide the profile.
    let profiles = profile(&timetable, &footpaths, &ScanConfig::default(), settings.clone()).unwrap();
    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 1);
    assert_eq!(span(&journeys[0]), (380, 400));
    assert_eq!(journeys[0].metric().walking_secs(), 20);

    // Under the profile order the ride is kept next to the walk.
    let journeys = profile_with_final(&timetable, &footpaths, settings);
    let spans: Vec<_> = journeys.iter().map(span).collect();
    assert_eq!(spans, vec![(100, 160), (380, 400)]);
    assert_eq!(ride_ids(&journeys[0]), vec!["ab"]);
    assert!(matches!(
        journeys[0].legs().last(),
        Some(Step::Transfer(t)) if t.from == B && t.to == D && t.departure_time == 150
    ));
}

#[test]
fn final_walk_arrives_right_after_the_ride() {
    let store = store(vec![conn("ab", A, B, 100, 150, 1), conn("de", D, E, 900, 950, 9)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(B, D, 10).build();
    let settings = ScanSettings::new(A, D, 0, 400);

    let forward = earliest(&timetable, &footpaths, settings.clone()).unwrap();
    let backward = latest(&timetable, &footpaths, settings.clone()).unwrap();

    assert_eq!(span(&forward), (100, 160));
    assert_eq!(span(&backward), (100, 160));
    assert_eq!(forward.metric(), backward.metric());
    assert!(matches!(
        backward.steps().last(),
        Some(Step::Genesis { stop, time: 160 }) if *stop == D
    ));

    let profiles = profile(&timetable, &footpaths, &ScanConfig::default(), settings).unwrap();
    assert_eq!(profiles[&A].iter().map(span).collect::<Vec<_>>(), vec![(100, 160)]);
}

#[test]
fn first_walk_leaves_just_in_time() {
    let store = store(vec![conn("bd", B, D, 100, 150, 1), conn("ea", E, A, 900, 950, 9)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(A, B, 10).build();
    let settings = ScanSettings::new(A, D, 0, 400);

    let forward = earliest(&timetable, &footpaths, settings.clone()).unwrap();
    let backward = latest(&timetable, &footpaths, settings).unwrap();

    assert_eq!(span(&forward), (90, 150));
    assert_eq!(span(&backward), (90, 150));
    assert!(matches!(
        forward.legs().next(),
        Some(Step::Transfer(t)) if t.from == A && t.departure_time == 90 && t.arrival_time == 100
    ));
    assert_eq!(forward.metric(), backward.metric());
}

#[test]
fn profile_includes_walk_only_journey() {
    let store = store(vec![conn("ad", A, D, 100, 176, 1)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new().add(A, D, 10).build();
    let settings = ScanSettings::new(A, D, 0, 400);

    let journey = earliest(&timetable, &footpaths, settings.clone()).unwrap();
    assert_eq!(journey.arrival_time(), 10);

    // Shorter and without a change, the walk beats the ride.
    let profiles = profile(&timetable, &footpaths, &ScanConfig::default(), settings.clone()).unwrap();
    let journeys = &profiles[&A];
    assert_eq!(journeys.len(), 1);
    assert_eq!(span(&journeys[0]), (390, 400));
    assert_eq!(journeys[0].connections().count(), 0);

    let journeys = profile_with_final(&timetable, &footpaths, settings);
    let spans: Vec<_> = journeys.iter().map(span).collect();
    assert_eq!(spans, vec![(100, 176), (390, 400)]);
}

#[test]
fn profile_walks_several_hops_to_target() {
    let store = store(vec![conn("ab", A, B, 100, 150, 1), conn("ed", E, D, 2_000, 2_050, 9)]);
    let timetable = Timetable::single(&store).unwrap();
    let footpaths = FootpathTableBuilder::new()
        .add(B, C, 20)
        .add(C, E, 20)
        .add(B, E, 100)
        .build();

    let journeys = profile_with_final(&timetable, &footpaths, ScanSettings::new(A, E, 0, 1_000));
    assert_eq!(journeys.len(), 1);
    assert_eq!(span(&journeys[0]), (100, 190));
    assert_eq!(journeys[0].metric().walking_secs(), 40);

    let walked: Vec<_> = journeys[0]
        .legs()
        .filter_map(|s| match s {
            Step::Transfer(t) => Some((t.from, t.to)),
            _ => None,
        })
        .collect();
    assert_eq!(walked, vec![(B, C), (C, E)]);
}

// ============================================================================
// Several stores
// ============================================================================

#[test]
fn empty_store_contributes_nothing() {
    let empty = store(Vec::new());
    let first = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 200, 260, 2)]);
    let second = store(vec![conn("bc-fast", B, C, 170, 190, 3), conn("cd", C, D, 300, 400, 4)]);

    let with_empty = Timetable::new(vec![&empty, &first, &second]).unwrap();
    let without = Timetable::new(vec![&first, &second]).unwrap();

    let a = earliest(&with_empty, no_change(), ScanSettings::new(A, D, 0, 500)).unwrap();
    let b = earliest(&without, no_change(), ScanSettings::new(A, D, 0, 500)).unwrap();
    assert_eq!(a, b);
    assert_eq!(ride_ids(&a), vec!["ab", "bc-fast", "cd"]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unknown_stop_fails_at_construction() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1)]);
    let timetable = Timetable::single(&store).unwrap();

    let result = EarliestConnectionScan::<_, TransferMetric>::new(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, E, 0, 300),
    );
    assert!(matches!(result, Err(ScanError::NotFound { stop }) if stop == E));
}

#[test]
fn empty_window_fails_at_construction() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1)]);
    let timetable = Timetable::single(&store).unwrap();

    let result = LatestConnectionScan::<_, TransferMetric>::new(
        &timetable,
        no_change(),
        &ScanConfig::default(),
        ScanSettings::new(A, B, 300, 100),
    );
    assert!(matches!(result, Err(ScanError::InvalidArgument(_))));
}

#[test]
fn expired_deadline_times_out() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("bc", B, C, 200, 260, 2)]);
    let timetable = Timetable::single(&store).unwrap();
    let config = ScanConfig::new(500.0, Some(0), 86_400, true);
    let settings = ScanSettings::new(A, C, 0, 300);

    let result = EarliestConnectionScan::<_, TransferMetric>::new(&timetable, no_change(), &config, settings.clone())
        .unwrap()
        .calculate_journey();
    assert_eq!(result.unwrap_err(), ScanError::TimedOut);

    let result = LatestConnectionScan::<_, TransferMetric>::new(&timetable, no_change(), &config, settings.clone())
        .unwrap()
        .calculate_journey();
    assert_eq!(result.unwrap_err(), ScanError::TimedOut);

    let result = profile(&timetable, no_change(), &config, settings.clone());
    assert_eq!(result.unwrap_err(), ScanError::TimedOut);

    let config = ScanConfig::new(500.0, Some(0), 86_400, false);
    let result = profile(&timetable, no_change(), &config, settings);
    assert_eq!(result.unwrap_err(), ScanError::TimedOut);
}

#[test]
fn unreachable_is_not_timed_out() {
    let store = store(vec![conn("ab", A, B, 100, 160, 1), conn("cb", C, B, 100, 160, 2)]);
    let timetable = Timetable::single(&store).unwrap();

    let result = earliest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);
    let result = latest(&timetable, no_change(), ScanSettings::new(A, C, 0, 300));
    assert_eq!(result.unwrap_err(), ScanError::Unreachable);
}
