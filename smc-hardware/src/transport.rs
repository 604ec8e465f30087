//! Transport abstraction for controller round trips

use crate::protocol::{status, SmcRequest, SmcResponse};
use smc_core::Result;

/// One synchronous request/response exchange with the controller.
///
/// This trait enables testing of `Connection` without real hardware by
/// allowing simulated controllers. Implementations report the controller's
/// status byte as-is in [`SmcResponse::result`]; interpreting it is the
/// connection's job. `Err` is reserved for failures of the channel itself.
pub trait SmcTransport: Send {
    /// Send one command and block until its reply arrives
    fn call(&mut self, request: &SmcRequest) -> Result<SmcResponse>;

    /// Release the underlying handle. Further calls must fail.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Short description for logs (service name, "mock", ...)
    fn description(&self) -> &str;
}

/// Human-readable meaning of a controller status code
pub fn describe_status(result: u8) -> &'static str {
    match result {
        status::SUCCESS => "success",
        status::ERROR => "generic error",
        status::COMM_ERROR => "communication error",
        status::SPURIOUS_DATA => "spurious data",
        status::BAD_COMMAND => "bad command",
        status::BAD_PARAMETER => "bad parameter",
        status::KEY_NOT_FOUND => "key not found",
        status::KEY_NOT_READABLE => "key not readable",
        status::KEY_NOT_WRITABLE => "key not writable",
        status::KEY_SIZE_MISMATCH => "key size mismatch",
        status::FRAMING_ERROR => "framing error",
        status::BAD_ARGUMENT => "bad argument",
        status::TIMEOUT => "timeout",
        status::KEY_INDEX_RANGE => "key index out of range",
        _ => "unknown status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(status::KEY_NOT_FOUND), "key not found");
        assert_eq!(describe_status(status::SUCCESS), "success");
        assert_eq!(describe_status(0x42), "unknown status");
    }
}
