//! Binary monitor constants: framing, command and response bytes, error codes.
//!
//! See section 13 "The binary remote monitor" of the VICE manual.

/// First byte of every request and response
pub const API_START: u8 = 0x02;
/// Protocol version spoken by this client
pub const API_VERSION: u8 = 0x02;

/// start(1) + version(1) + body length(4) + request id(4) + command(1)
pub const REQUEST_HEADER_LEN: usize = 11;
/// start(1) + version(1) + body length(4) + kind(1) + error(1) + request id(4)
pub const RESPONSE_HEADER_LEN: usize = 12;

/// side effects(1) + start(2) + end(2) + memspace(1) + bank(2)
pub const MEMORY_GET_BODY_LEN: u32 = 8;

/// Request id carried by unsolicited event responses
pub const EVENT_REQUEST_ID: u32 = 0xFFFF_FFFF;

/// Largest response body accepted before allocating
pub const MAX_BODY_LEN: u32 = 1024 * 1024;

// Commands
pub const CMD_MEMORY_GET: u8 = 0x01;
pub const CMD_KEYBOARD_FEED: u8 = 0x72;
pub const CMD_EXIT: u8 = 0xAA;
pub const CMD_QUIT: u8 = 0xBB;

// Memory get parameters
pub const SIDE_EFFECTS_NONE: u8 = 0x00;
pub const SIDE_EFFECTS_ALLOW: u8 = 0x01;
pub const MEMSPACE_MAIN: u8 = 0x00;
pub const BANK_CPU: u16 = 0x0000;

// Response kinds
pub const RES_INVALID: u8 = 0x00;
pub const RES_MEMORY_GET: u8 = 0x01;
pub const RES_REGISTER_INFO: u8 = 0x31;
pub const RES_JAM: u8 = 0x61;
pub const RES_STOPPED: u8 = 0x62;
pub const RES_RESUMED: u8 = 0x63;
pub const RES_KEYBOARD_FEED: u8 = 0x72;
pub const RES_EXIT: u8 = 0xAA;
pub const RES_QUIT: u8 = 0xBB;

// Error codes
pub const ERR_NONE: u8 = 0x00;
pub const ERR_OBJECT_MISSING: u8 = 0x01;
pub const ERR_INVALID_MEMSPACE: u8 = 0x02;
pub const ERR_CMD_INVALID_LENGTH: u8 = 0x80;
pub const ERR_INVALID_PARAMETER: u8 = 0x81;
pub const ERR_CMD_INVALID_API_VERSION: u8 = 0x82;
pub const ERR_CMD_INVALID_TYPE: u8 = 0x83;
pub const ERR_CMD_FAILURE: u8 = 0x8F;

/// Human readable text for a monitor error code
pub fn error_message(code: u8) -> Option<&'static str> {
    match code {
        ERR_NONE => Some("OK, everything worked"),
        ERR_OBJECT_MISSING => Some("The object you are trying to get or set doesn't exist."),
        ERR_INVALID_MEMSPACE => Some("The memspace is invalid"),
        ERR_CMD_INVALID_LENGTH => Some("Command length is not correct for this command"),
        ERR_INVALID_PARAMETER => Some("An invalid parameter value was present"),
        ERR_CMD_INVALID_API_VERSION => Some("The API version is not understood by the server"),
        ERR_CMD_INVALID_TYPE => Some("The command type is not understood by the server"),
        ERR_CMD_FAILURE => Some(
            "The command had parameter values that passed basic checks, but a general failure occurred",
        ),
        _ => None,
    }
}

/// Name of a response kind, for logging
pub fn response_name(kind: u8) -> &'static str {
    match kind {
        RES_INVALID => "invalid",
        RES_MEMORY_GET => "memory get",
        RES_REGISTER_INFO => "register info",
        RES_JAM => "jam",
        RES_STOPPED => "stopped",
        RES_RESUMED => "resumed",
        RES_KEYBOARD_FEED => "keyboard feed",
        RES_EXIT => "exit",
        RES_QUIT => "quit",
        _ => "unknown",
    }
}
