//! Control request options (`bmRequestType`)
//!
//! The first byte of a USB setup packet packs three fields:
//!
//! | bits | field                                   |
//! |------|-----------------------------------------|
//! | 0-4  | recipient (device, interface, ...)      |
//! | 5-6  | request type (standard, class, vendor)  |
//! | 7    | data phase direction                    |
//!
//! [`RequestOptions`] keeps the raw byte and exposes typed accessors and
//! mutators for each field. Bit patterns outside the enumerated values are
//! never rejected; they are carried through unchanged.

use std::fmt;

const RECIPIENT_POS: u8 = 0;
const RECIPIENT_MASK: u8 = 0x1f << RECIPIENT_POS;

const REQUEST_TYPE_POS: u8 = 5;
const REQUEST_TYPE_MASK: u8 = 0x03 << REQUEST_TYPE_POS;

const DIRECTION_POS: u8 = 7;
const DIRECTION_MASK: u8 = 0x01 << DIRECTION_POS;

/// Direction of the data phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataDirection {
    /// OUT: host writes to the device
    HostToDevice = 0,
    /// IN: device returns data to the host
    DeviceToHost = 1,
}

/// Request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestType {
    /// Standard request defined by chapter 9 of the USB specification
    Standard = 0,
    /// Request defined by a device class specification
    Class = 1,
    /// Vendor-specific request
    Vendor = 2,
}

impl RequestType {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Standard),
            1 => Some(Self::Class),
            2 => Some(Self::Vendor),
            _ => None,
        }
    }
}

/// Recipient of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecipientType {
    Device = 0,
    Interface = 1,
    Endpoint = 2,
    Other = 3,
}

impl RecipientType {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Device),
            1 => Some(Self::Interface),
            2 => Some(Self::Endpoint),
            3 => Some(Self::Other),
            _ => None,
        }
    }
}

/// Packed `bmRequestType` byte
///
/// The default value is `0x00` (host-to-device, standard, device). That is a
/// legal encoding, but it is rarely the request you actually want to send;
/// build options explicitly with [`RequestOptions::new`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestOptions(u8);

impl RequestOptions {
    /// Pack the three fields into a request options byte.
    pub const fn new(
        direction: DataDirection,
        request_type: RequestType,
        recipient: RecipientType,
    ) -> Self {
        Self(
            ((direction as u8) << DIRECTION_POS)
                | ((request_type as u8) << REQUEST_TYPE_POS)
                | ((recipient as u8) << RECIPIENT_POS),
        )
    }

    /// Wrap a raw byte without validation.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw byte, ready to be placed in a setup packet.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn direction(self) -> DataDirection {
        if self.0 & DIRECTION_MASK == 0 {
            DataDirection::HostToDevice
        } else {
            DataDirection::DeviceToHost
        }
    }

    pub fn set_direction(&mut self, value: DataDirection) {
        self.0 = (self.0 & !DIRECTION_MASK) | ((value as u8) << DIRECTION_POS);
    }

    /// Decoded request type, or `None` for the reserved pattern `0b11`.
    pub fn request_type(self) -> Option<RequestType> {
        RequestType::from_bits(self.request_type_bits())
    }

    /// Raw two-bit request type field.
    pub const fn request_type_bits(self) -> u8 {
        (self.0 & REQUEST_TYPE_MASK) >> REQUEST_TYPE_POS
    }

    pub fn set_request_type(&mut self, value: RequestType) {
        self.0 = (self.0 & !REQUEST_TYPE_MASK) | ((value as u8) << REQUEST_TYPE_POS);
    }

    /// Decoded recipient, or `None` for reserved patterns `4..=31`.
    pub fn recipient(self) -> Option<RecipientType> {
        RecipientType::from_bits(self.recipient_bits())
    }

    /// Raw five-bit recipient field.
    pub const fn recipient_bits(self) -> u8 {
        (self.0 & RECIPIENT_MASK) >> RECIPIENT_POS
    }

    pub fn set_recipient(&mut self, value: RecipientType) {
        self.0 = (self.0 & !RECIPIENT_MASK) | ((value as u8) << RECIPIENT_POS);
    }

    pub fn with_direction(mut self, value: DataDirection) -> Self {
        self.set_direction(value);
        self
    }

    pub fn with_request_type(mut self, value: RequestType) -> Self {
        self.set_request_type(value);
        self
    }

    pub fn with_recipient(mut self, value: RecipientType) -> Self {
        self.set_recipient(value);
        self
    }
}

impl From<RequestOptions> for u8 {
    fn from(options: RequestOptions) -> Self {
        options.0
    }
}

impl From<u8> for RequestOptions {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RequestOptions");
        s.field("direction", &self.direction());
        match self.request_type() {
            Some(t) => s.field("request_type", &t),
            None => s.field("request_type", &self.request_type_bits()),
        };
        match self.recipient() {
            Some(r) => s.field("recipient", &r),
            None => s.field("recipient", &self.recipient_bits()),
        };
        s.field("bits", &format_args!("{:#04x}", self.0)).finish()
    }
}

impl fmt::Display for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        let options = RequestOptions::default();
        assert_eq!(options.bits(), 0x00);
        assert_eq!(options.direction(), DataDirection::HostToDevice);
        assert_eq!(options.request_type(), Some(RequestType::Standard));
        assert_eq!(options.recipient(), Some(RecipientType::Device));
    }

    #[test]
    fn test_known_encodings() {
        // GET_STATUS to device
        let get_status = RequestOptions::new(
            DataDirection::DeviceToHost,
            RequestType::Standard,
            RecipientType::Device,
        );
        assert_eq!(get_status.bits(), 0x80);

        // SET_FEATURE(ENDPOINT_HALT) / CLEAR_FEATURE to an endpoint
        let clear_halt = RequestOptions::new(
            DataDirection::HostToDevice,
            RequestType::Standard,
            RecipientType::Endpoint,
        );
        assert_eq!(clear_halt.bits(), 0x02);

        // HID GET_REPORT
        let get_report = RequestOptions::new(
            DataDirection::DeviceToHost,
            RequestType::Class,
            RecipientType::Interface,
        );
        assert_eq!(get_report.bits(), 0xa1);

        let vendor_out = RequestOptions::new(
            DataDirection::HostToDevice,
            RequestType::Vendor,
            RecipientType::Other,
        );
        assert_eq!(vendor_out.bits(), 0x43);
    }

    #[test]
    fn test_setters_touch_only_their_field() {
        let mut options = RequestOptions::new(
            DataDirection::DeviceToHost,
            RequestType::Vendor,
            RecipientType::Endpoint,
        );

        options.set_recipient(RecipientType::Interface);
        assert_eq!(options.bits(), 0xc1);

        options.set_request_type(RequestType::Class);
        assert_eq!(options.bits(), 0xa1);

        options.set_direction(DataDirection::HostToDevice);
        assert_eq!(options.bits(), 0x21);
    }

    #[test]
    fn test_undefined_bits_pass_through() {
        // recipient 0x1f and request type 0b11 are reserved
        let options = RequestOptions::from_bits(0xff);
        assert_eq!(options.recipient(), None);
        assert_eq!(options.recipient_bits(), 0x1f);
        assert_eq!(options.request_type(), None);
        assert_eq!(options.request_type_bits(), 0x03);
        assert_eq!(options.direction(), DataDirection::DeviceToHost);
        assert_eq!(u8::from(options), 0xff);

        // Setting the direction leaves the reserved fields alone
        let options = options.with_direction(DataDirection::HostToDevice);
        assert_eq!(options.bits(), 0x7f);
    }

    #[test]
    fn test_debug_output() {
        let options = RequestOptions::new(
            DataDirection::DeviceToHost,
            RequestType::Class,
            RecipientType::Interface,
        );
        let debug = format!("{:?}", options);
        assert!(debug.contains("DeviceToHost"));
        assert!(debug.contains("Class"));
        assert!(debug.contains("Interface"));
        assert!(debug.contains("0xa1"));
        assert_eq!(options.to_string(), "0xa1");
    }
}
