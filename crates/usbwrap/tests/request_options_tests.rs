//! Property tests for the `bmRequestType` encoder
//!
//! Covers every defined (direction, request type, recipient) triple and the
//! behaviour of the setters on arbitrary raw bytes.

use proptest::prelude::*;
use usbwrap::{DataDirection, RecipientType, RequestOptions, RequestType};

fn direction() -> impl Strategy<Value = DataDirection> {
    prop_oneof![
        Just(DataDirection::HostToDevice),
        Just(DataDirection::DeviceToHost),
    ]
}

fn request_type() -> impl Strategy<Value = RequestType> {
    prop_oneof![
        Just(RequestType::Standard),
        Just(RequestType::Class),
        Just(RequestType::Vendor),
    ]
}

fn recipient() -> impl Strategy<Value = RecipientType> {
    prop_oneof![
        Just(RecipientType::Device),
        Just(RecipientType::Interface),
        Just(RecipientType::Endpoint),
        Just(RecipientType::Other),
    ]
}

proptest! {
    #[test]
    fn decode_inverts_encode(d in direction(), t in request_type(), r in recipient()) {
        let options = RequestOptions::new(d, t, r);
        prop_assert_eq!(options.direction(), d);
        prop_assert_eq!(options.request_type(), Some(t));
        prop_assert_eq!(options.recipient(), Some(r));
        prop_assert_eq!(RequestOptions::from_bits(u8::from(options)), options);
    }

    #[test]
    fn recipients_differ_only_in_low_bits(
        d in direction(),
        t in request_type(),
        a in recipient(),
        b in recipient(),
    ) {
        let x = RequestOptions::new(d, t, a).bits();
        let y = RequestOptions::new(d, t, b).bits();
        prop_assert_eq!((x ^ y) & !0x1f, 0);
    }

    #[test]
    fn setters_preserve_other_bits(bits in any::<u8>(), d in direction(), t in request_type(), r in recipient()) {
        let original = RequestOptions::from_bits(bits);

        let changed = original.with_recipient(r);
        prop_assert_eq!(changed.bits() & !0x1f, bits & !0x1f);
        prop_assert_eq!(changed.recipient(), Some(r));

        let changed = original.with_request_type(t);
        prop_assert_eq!(changed.bits() & !0x60, bits & !0x60);
        prop_assert_eq!(changed.request_type(), Some(t));

        let changed = original.with_direction(d);
        prop_assert_eq!(changed.bits() & !0x80, bits & !0x80);
        prop_assert_eq!(changed.direction(), d);
    }

    #[test]
    fn raw_bytes_pass_through(bits in any::<u8>()) {
        let options = RequestOptions::from(bits);
        prop_assert_eq!(options.bits(), bits);
        prop_assert_eq!(options.recipient_bits(), bits & 0x1f);
        prop_assert_eq!(options.request_type_bits(), (bits >> 5) & 0x03);
    }
}

#[test]
fn test_setter_chain_matches_constructor() {
    let mut options = RequestOptions::default();
    options.set_direction(DataDirection::DeviceToHost);
    options.set_request_type(RequestType::Vendor);
    options.set_recipient(RecipientType::Interface);

    let expected = RequestOptions::new(
        DataDirection::DeviceToHost,
        RequestType::Vendor,
        RecipientType::Interface,
    );
    assert_eq!(options, expected);
    assert_eq!(options.bits(), 0xc1);
}
