//! Integration tests for complete protocol exchanges.
//!
//! Drives the codec with the exact byte sequences a device session
//! produces: check-in, login, and periodic feedback.

use bytes::BytesMut;
use geotrack_core::DeviceId;
use geotrack_protocol::{CommandCode, Frame, LocationReport, TrackerCodec};
use tokio_util::codec::{Decoder, Encoder};

const DEVICE_ID: &str = "35701588506";
const FEEDBACK_BODY: &str = "240101A3600.0000N04500.0000E000.0120000090.0011110000L00000000";

fn device() -> DeviceId {
    DeviceId::new(DEVICE_ID).unwrap()
}

/// Run one inbound frame and the matching response through a codec pair,
/// as the session and a device would.
fn exchange(codec: &mut TrackerCodec, inbound: Frame, response: Option<Frame>) -> Frame {
    let mut wire = BytesMut::new();
    codec.encode(inbound, &mut wire).unwrap();

    let received = codec.decode(&mut wire).unwrap().unwrap();

    if let Some(response) = response {
        let mut reply_wire = BytesMut::new();
        codec.encode(response.clone(), &mut reply_wire).unwrap();
        let reply = codec.decode(&mut reply_wire).unwrap().unwrap();
        assert_eq!(reply, response);
    }

    received
}

#[test]
fn test_check_in_sequence() {
    let mut codec = TrackerCodec::new();

    // 1. Device announces itself
    let handshake = Frame::build(&device(), CommandCode::Handshake, "").unwrap();
    let ack = Frame::build(&device(), CommandCode::HandshakeAck, "HSO").unwrap();
    let received = exchange(&mut codec, handshake, Some(ack));
    assert_eq!(received.command(), CommandCode::Handshake);

    // 2. Device logs in
    let login = Frame::build(&device(), CommandCode::Login, "").unwrap();
    let login_ack = Frame::build(&device(), CommandCode::LoginAck, "").unwrap();
    let received = exchange(&mut codec, login, Some(login_ack));
    assert_eq!(received.command(), CommandCode::Login);

    // 3. Device starts reporting; feedback has no response
    let feedback = Frame::build(&device(), CommandCode::Feedback, FEEDBACK_BODY).unwrap();
    let received = exchange(&mut codec, feedback, None);
    assert_eq!(received.command(), CommandCode::Feedback);

    // The feedback body decodes into the report the session persists
    let report = LocationReport::parse(received.body()).unwrap();
    assert_eq!(report.latitude, 36.0);
    assert_eq!(report.longitude, 45.0);
    assert!(report.is_valid_fix());
}

#[test]
fn test_fragmented_check_in() {
    let mut codec = TrackerCodec::new();

    let handshake = Frame::build(&device(), CommandCode::Handshake, "").unwrap();
    let feedback = Frame::build(&device(), CommandCode::Feedback, FEEDBACK_BODY).unwrap();

    let mut stream = handshake.contents();
    stream.extend_from_slice(&feedback.contents());

    // Bytes dribble in 7 at a time, as a congested link would deliver them
    let mut decoded = Vec::new();
    let mut buffer = BytesMut::new();
    for chunk in stream.chunks(7) {
        buffer.extend_from_slice(chunk);
        while let Some(frame) = codec.decode(&mut buffer).unwrap() {
            decoded.push(frame);
        }
    }

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0], handshake);
    assert_eq!(decoded[1], feedback);
}

#[test]
fn test_device_id_flows_through_unchanged() {
    let mut codec = TrackerCodec::new();

    let frame = Frame::build(&device(), CommandCode::Handshake, "").unwrap();
    let mut wire = BytesMut::new();
    codec.encode(frame, &mut wire).unwrap();

    let received = codec.decode(&mut wire).unwrap().unwrap();
    assert_eq!(received.device_id().as_str(), DEVICE_ID);
    assert_eq!(received.device_id().as_u64(), 35_701_588_506);
}
