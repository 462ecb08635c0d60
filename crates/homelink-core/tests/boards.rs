mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockBoard, WireEvent};
use homelink_core::prelude::*;
use homelink_core::protocol::ProtocolError;
use pretty_assertions::assert_eq;

fn session_with(board: &MockBoard) -> Arc<Session> {
    let session = Arc::new(Session::new(SessionConfig {
        exchange_timeout: Duration::from_millis(25),
        settle_delay: Duration::from_millis(20),
        ..SessionConfig::default()
    }));
    session.attach(board.channel()).unwrap();
    session
}

#[test]
fn test_air_refresh_decodes_all_fields() {
    let board = MockBoard::new();
    // Replies in wire order: desired int/frac, ambient int/frac, fan count.
    board.script(&[23, 7, 21, 4, 120]);
    let ac = AirConditioner::new(session_with(&board));

    ac.refresh().unwrap();

    let reading = ac.reading();
    assert_eq!(reading.desired_temperature, 23.7);
    assert_eq!(reading.ambient_temperature, 21.4);
    assert_eq!(reading.fan_speed, 120);
    assert_eq!(board.written_bytes(), vec![0x02, 0x01, 0x04, 0x03, 0x05]);
}

#[test]
fn test_curtain_refresh_decodes_all_fields() {
    let board = MockBoard::new();
    // curtain int/frac, temperature int/frac, pressure int/frac, light
    // int/frac.
    board.script(&[50, 0, 20, 5, 245, 3, 80, 2]);
    let curtain = Curtain::new(session_with(&board));

    curtain.refresh().unwrap();

    let reading = curtain.reading();
    assert_eq!(reading.curtain_status, 50.0);
    assert_eq!(reading.outdoor_temperature, 20.5);
    // Low pressure byte recentered by the fixed +768 offset: 245 -> 1013.3.
    assert_eq!(reading.outdoor_pressure, 1013.3);
    assert_eq!(reading.light_intensity, 80.2);
    assert_eq!(
        board.written_bytes(),
        vec![0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]
    );
}

#[test]
fn test_refresh_while_disconnected_is_a_noop() {
    let session = Arc::new(Session::new(SessionConfig::default()));
    let ac = AirConditioner::new(session);
    let rx = ac.subscribe();

    ac.refresh().unwrap();

    assert_eq!(ac.reading(), AirReading::default());
    assert!(!rx.has_changed().unwrap(), "no cycle ran, no notification");
}

#[test]
fn test_partial_refresh_applies_surviving_fields() {
    let board = MockBoard::new();
    // Board dies after three replies: ambient loses its fractional byte and
    // the fan count never arrives.
    board.script(&[23, 7, 21]);
    let ac = AirConditioner::new(session_with(&board));
    let rx = ac.subscribe();

    let result = ac.refresh();

    match result {
        Err(ProtocolError::PartialRefresh { failed, attempted }) => {
            assert_eq!(failed, 2);
            assert_eq!(attempted, 3);
        }
        other => panic!("expected partial refresh, got {other:?}"),
    }
    let reading = ac.reading();
    assert_eq!(reading.desired_temperature, 23.7);
    assert_eq!(reading.ambient_temperature, 0.0);
    assert_eq!(reading.fan_speed, 0);
    // The cycle still ended in its one notification.
    assert!(rx.has_changed().unwrap());
}

#[test]
fn test_notification_fires_once_per_cycle() {
    let board = MockBoard::new();
    board.script(&[23, 7, 21, 4, 120, 24, 0, 21, 5, 118]);
    let ac = AirConditioner::new(session_with(&board));
    let mut rx = ac.subscribe();

    ac.refresh().unwrap();
    assert!(rx.has_changed().unwrap());
    let first = *rx.borrow_and_update();
    assert_eq!(first.desired_temperature, 23.7);
    assert!(!rx.has_changed().unwrap(), "one cycle, one notification");

    ac.refresh().unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().desired_temperature, 24.0);
}

#[test]
fn test_set_out_of_range_writes_nothing() {
    let board = MockBoard::new();
    let ac = AirConditioner::new(session_with(&board));

    for bad in [9.0, 51.0] {
        let result = ac.set_desired_temperature(bad);
        assert!(
            matches!(result, Err(ProtocolError::OutOfRange { .. })),
            "{bad} should be rejected"
        );
    }

    assert!(board.events().is_empty(), "validation must precede the wire");
}

#[test]
fn test_set_desired_temperature_wire_bytes() {
    let board = MockBoard::new();
    let ac = AirConditioner::new(session_with(&board));

    ac.set_desired_temperature(23.7).unwrap();

    assert_eq!(
        board.events(),
        vec![WireEvent::Write(0xC0 | 23), WireEvent::Write(0x80 | 7)]
    );
    let events = board.timed_events();
    let gap = events[1].0.duration_since(events[0].0);
    assert!(gap >= Duration::from_millis(20), "settle gap was {gap:?}");
}

#[test]
fn test_set_does_not_update_cache_optimistically() {
    let board = MockBoard::new();
    let ac = AirConditioner::new(session_with(&board));

    ac.set_desired_temperature(30.0).unwrap();

    // The next poll confirms the value; until then the cache is untouched.
    assert_eq!(ac.desired_temperature(), 0.0);
}

#[test]
fn test_curtain_set_bounds() {
    let board = MockBoard::new();
    let curtain = Curtain::new(session_with(&board));

    assert!(matches!(
        curtain.set_curtain_status(-0.1),
        Err(ProtocolError::OutOfRange { .. })
    ));
    assert!(matches!(
        curtain.set_curtain_status(100.1),
        Err(ProtocolError::OutOfRange { .. })
    ));
    assert!(board.events().is_empty());

    curtain.set_curtain_status(75.5).unwrap();
    assert_eq!(
        board.events(),
        vec![WireEvent::Write(0xC0 | 75 & 0x3F), WireEvent::Write(0x80 | 5)]
    );
}

#[test]
fn test_set_while_disconnected() {
    let session = Arc::new(Session::new(SessionConfig::default()));
    let ac = AirConditioner::new(session);

    assert!(matches!(
        ac.set_desired_temperature(25.0),
        Err(ProtocolError::NotConnected)
    ));
}

#[test]
fn test_fan_speed_calibration() {
    let board = MockBoard::new();
    board.script(&[23, 7, 21, 4, 132]);
    let ac = AirConditioner::new(session_with(&board)).with_fan_calibration(13.2);

    ac.refresh().unwrap();

    assert_eq!(ac.fan_speed(), 132);
    assert!((ac.fan_speed_rps() - 10.0).abs() < 1e-9);
}

#[test]
fn test_foreground_set_waits_for_in_flight_exchange() {
    // The poll loop is mid-exchange (command written, reply pending) when a
    // foreground set arrives. The set must wait for the full write+read to
    // complete; no foreground byte may land inside another exchange.
    let board = MockBoard::with_reply_delay(Duration::from_millis(25));
    board.script(&[23, 7, 21, 4, 120]);
    let session = Arc::new(Session::new(SessionConfig {
        exchange_timeout: Duration::from_millis(200),
        settle_delay: Duration::from_millis(5),
        ..SessionConfig::default()
    }));
    session.attach(board.channel()).unwrap();
    let ac = AirConditioner::new(Arc::clone(&session));

    let refresher = {
        let ac = ac.clone();
        std::thread::spawn(move || ac.refresh())
    };
    std::thread::sleep(Duration::from_millis(10));
    ac.set_desired_temperature(50.0).unwrap();
    refresher.join().unwrap().unwrap();

    let events = board.events();
    let mut pending_get = None;
    for event in &events {
        match *event {
            WireEvent::Write(byte) if byte & 0xC0 == 0x00 => {
                assert!(pending_get.is_none(), "GET issued inside an exchange");
                pending_get = Some(byte);
            }
            WireEvent::Write(byte) => {
                assert!(
                    pending_get.is_none(),
                    "set byte {byte:#04x} landed between a poll's write and its read"
                );
            }
            WireEvent::Read(_) => {
                pending_get = None;
            }
        }
    }
    // Both halves of the set value made it out, in order.
    let writes = board.written_bytes();
    let int_pos = writes.iter().position(|&b| b == 0xC0 | 50).unwrap();
    let frac_pos = writes.iter().position(|&b| b == 0x80).unwrap();
    assert!(int_pos < frac_pos);
}

#[test]
fn test_readings_serialize() {
    let board = MockBoard::new();
    board.script(&[23, 7, 21, 4, 120]);
    let ac = AirConditioner::new(session_with(&board));
    ac.refresh().unwrap();

    let json = serde_json::to_value(ac.reading()).unwrap();
    assert_eq!(json["desired_temperature"], 23.7);
    assert_eq!(json["fan_speed"], 120);
}
