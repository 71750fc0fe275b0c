//! Inbound frame routing.
//!
//! Frames are dispatched by opcode, never by payload shape. Any sequence
//! number on a frame is recorded into the session before the payload is
//! looked at, so a resume after a failed dispatch never loses position.

use presence_common::{
    event_type, opcode, FormatError, GatewayFrame, MemberListUpdate, MembershipUpdate, Ready,
    StatusUpdate,
};

use super::Session;

/// Where a frame goes after routing.
#[derive(Debug)]
pub enum RoutedEvent {
    /// Arm the heartbeat with the announced interval (millis).
    Hello(u64),
    /// Clear the pending-pulse flag.
    HeartbeatAck,
    /// Tear down and reconnect, keeping resumability.
    ReconnectRequested,
    /// Tear down and reconnect after forgetting the session.
    SessionInvalidated,
    /// Domain event for the presence tracker.
    Dispatch(DispatchEvent),
    /// Unrecognized opcode; dropped after logging.
    Unhandled(u8),
}

/// Decoded dispatch (op 0) events, discriminated by the `t` field.
#[derive(Debug)]
pub enum DispatchEvent {
    Ready(Ready),
    StatusUpdate(StatusUpdate),
    MembershipUpdate(MembershipUpdate),
    MemberListUpdate(MemberListUpdate),
    /// Event sub-type this client does not consume.
    Unknown(String),
}

/// Route one inbound frame. A `FormatError` means the payload did not match
/// its opcode's shape; the caller logs and drops the frame, the sequence
/// number has already been recorded.
pub fn route(frame: &GatewayFrame, session: &mut Session) -> Result<RoutedEvent, FormatError> {
    if let Some(s) = frame.s {
        session.record_sequence(s);
    }

    match frame.op {
        opcode::HELLO => {
            let hello: presence_common::Hello = frame.payload()?;
            Ok(RoutedEvent::Hello(hello.heartbeat_interval))
        }
        opcode::HEARTBEAT_ACK => Ok(RoutedEvent::HeartbeatAck),
        opcode::RECONNECT => Ok(RoutedEvent::ReconnectRequested),
        opcode::INVALID_SESSION => Ok(RoutedEvent::SessionInvalidated),
        opcode::DISPATCH => {
            let event = match frame.event_type() {
                Some(event_type::READY) => DispatchEvent::Ready(frame.payload()?),
                Some(event_type::STATUS_UPDATE) => DispatchEvent::StatusUpdate(frame.payload()?),
                Some(event_type::MEMBERSHIP_UPDATE) => {
                    DispatchEvent::MembershipUpdate(frame.payload()?)
                }
                Some(event_type::MEMBER_LIST_UPDATE) => {
                    DispatchEvent::MemberListUpdate(frame.payload()?)
                }
                Some(other) => DispatchEvent::Unknown(other.to_string()),
                None => DispatchEvent::Unknown(String::new()),
            };
            Ok(RoutedEvent::Dispatch(event))
        }
        other => Ok(RoutedEvent::Unhandled(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> GatewayFrame {
        GatewayFrame::decode(text).unwrap()
    }

    #[test]
    fn test_hello_routes_interval() {
        let mut session = Session::new();
        let frame = decode(r#"{"op":10,"d":{"heartbeat_interval":45000}}"#);
        match route(&frame, &mut session).unwrap() {
            RoutedEvent::Hello(interval) => assert_eq!(interval, 45000),
            other => panic!("expected Hello, got {:?}", other),
        }
    }

    #[test]
    fn test_control_opcodes_route_without_payload() {
        let mut session = Session::new();
        assert!(matches!(
            route(&decode(r#"{"op":11,"d":null}"#), &mut session).unwrap(),
            RoutedEvent::HeartbeatAck
        ));
        assert!(matches!(
            route(&decode(r#"{"op":7,"d":null}"#), &mut session).unwrap(),
            RoutedEvent::ReconnectRequested
        ));
        assert!(matches!(
            route(&decode(r#"{"op":9,"d":false}"#), &mut session).unwrap(),
            RoutedEvent::SessionInvalidated
        ));
    }

    #[test]
    fn test_sequence_recorded_before_payload_decoding() {
        let mut session = Session::new();
        // Dispatch frame whose payload does not match its sub-type.
        let frame = decode(r#"{"op":0,"d":"garbage","s":42,"t":"READY"}"#);
        assert!(route(&frame, &mut session).is_err());
        assert_eq!(session.last_sequence(), Some(42));
    }

    #[test]
    fn test_dispatch_routes_by_event_type() {
        let mut session = Session::new();
        let frame = decode(
            r#"{"op":0,"d":{"entity":{"id":"e1"},"status":"idle"},"s":1,"t":"STATUS_UPDATE"}"#,
        );
        match route(&frame, &mut session).unwrap() {
            RoutedEvent::Dispatch(DispatchEvent::StatusUpdate(ev)) => {
                assert_eq!(ev.entity.id, "e1");
            }
            other => panic!("expected StatusUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_type_is_not_an_error() {
        let mut session = Session::new();
        let frame = decode(r#"{"op":0,"d":{},"s":2,"t":"TYPING_START"}"#);
        match route(&frame, &mut session).unwrap() {
            RoutedEvent::Dispatch(DispatchEvent::Unknown(t)) => assert_eq!(t, "TYPING_START"),
            other => panic!("expected Unknown, got {:?}", other),
        }
        assert_eq!(session.last_sequence(), Some(2));
    }

    #[test]
    fn test_unrecognized_opcode_is_unhandled() {
        let mut session = Session::new();
        let frame = decode(r#"{"op":42,"d":null}"#);
        assert!(matches!(
            route(&frame, &mut session).unwrap(),
            RoutedEvent::Unhandled(42)
        ));
    }
}
