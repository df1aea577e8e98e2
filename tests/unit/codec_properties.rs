//! Property tests for framing, decoding and conversions.

use proptest::prelude::*;

use stepper_scl::config::{check_acceleration, MAX_ACCELERATION, MIN_ACCELERATION};
use stepper_scl::protocol::{decode, encode, Command, DecodedValue, ResponseKind};
use stepper_scl::{Degrees, EncoderCounts, Gearing};

fn reply(payload: &str) -> Vec<u8> {
    let mut raw = vec![0x00, 0x07];
    raw.extend_from_slice(payload.as_bytes());
    raw.push(b'\r');
    raw
}

proptest! {
    #[test]
    fn frame_wraps_command(command in "[A-Z]{2}[0-9A-Z.-]{0,12}") {
        let frame = encode(&Command::new(&command).unwrap());
        prop_assert_eq!(frame.len(), command.len() + 3);
        prop_assert_eq!(&frame[..2], &[0x00, 0x07]);
        prop_assert_eq!(&frame[2..frame.len() - 1], command.as_bytes());
        prop_assert_eq!(frame[frame.len() - 1], b'\r');
    }

    #[test]
    fn signed_hex_is_twos_complement(value in any::<i32>()) {
        let raw = reply(&format!("IE={:08X}", value as u32));
        prop_assert_eq!(
            decode(&raw, ResponseKind::SignedHexValue),
            Ok(DecodedValue::Signed(value))
        );
    }

    #[test]
    fn decimal_values_parse(value in 0u32..1_000_000) {
        let raw = reply(&format!("%AC={}", value));
        prop_assert_eq!(
            decode(&raw, ResponseKind::Value),
            Ok(DecodedValue::Number(f64::from(value)))
        );
    }

    #[test]
    fn executed_ack_rejects_other_markers(ack in any::<u8>()) {
        let raw = [0x00, 0x07, ack, b'\r'];
        let result = decode(&raw, ResponseKind::ExecutedAck);
        prop_assert_eq!(result.is_ok(), ack == b'%' || ack == b'*');
    }

    #[test]
    fn acceleration_range(rate in -10.0f64..6000.0) {
        let inside = (MIN_ACCELERATION..=MAX_ACCELERATION).contains(&rate);
        prop_assert_eq!(check_acceleration(rate).is_ok(), inside);
    }

    #[test]
    fn angle_round_trip(
        counts in -1_000_000i64..1_000_000,
        electronic in prop::sample::select(vec![200u32, 400, 800, 4000]),
        mechanical in prop::sample::select(vec![1.0f64, 2.5]),
    ) {
        let gearing = Gearing::new(electronic, mechanical);
        let angle = gearing.encoder_to_angle(EncoderCounts(counts)).unwrap();
        prop_assert_eq!(gearing.angle_to_encoder(angle), Ok(EncoderCounts(counts)));
    }

    #[test]
    fn angle_survives_encoder_round_trip(
        degrees in -720.0f64..720.0,
        electronic in prop::sample::select(vec![200u32, 400, 800, 4000]),
        mechanical in prop::sample::select(vec![1.0f64, 2.5]),
    ) {
        let gearing = Gearing::new(electronic, mechanical);
        let counts = gearing.angle_to_encoder(Degrees(degrees)).unwrap();
        let back = gearing.encoder_to_angle(counts).unwrap();

        let one_count = 360.0 / (f64::from(electronic) * mechanical);
        prop_assert!((back.0 - degrees).abs() <= one_count);
    }

    #[test]
    fn angle_conversion_is_odd(degrees in -720.0f64..720.0) {
        let gearing = Gearing::default();
        let forward = gearing.angle_to_encoder(Degrees(degrees)).unwrap();
        let backward = gearing.angle_to_encoder(Degrees(-degrees)).unwrap();
        prop_assert_eq!(forward.0, -backward.0);
    }
}
