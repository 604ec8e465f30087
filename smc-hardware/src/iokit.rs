//! IOKit driver for the `AppleSMC` service (macOS only)
//!
//! Opens one user-client connection to the controller and performs struct
//! method calls on it. Only one handle may be open per process.

use std::ffi::{c_char, c_void, CStr, CString};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};

use core_foundation_sys::dictionary::{CFDictionaryRef, CFMutableDictionaryRef};
use mach2::kern_return::{kern_return_t, KERN_SUCCESS};
use mach2::port::mach_port_t;
use mach2::traps::mach_task_self;
use smc_core::{Result, SmcError};
use tracing::{debug, error, info};

use crate::protocol::{KeyData, SmcRequest, SmcResponse, KERNEL_INDEX_SMC};
use crate::transport::SmcTransport;

type IoObject = mach_port_t;

/// kIOReturnNotPrivileged
const KIO_RETURN_NOT_PRIVILEGED: kern_return_t = -536_870_174;

const SERVICE_NAME: &str = "AppleSMC";
/// Apple-silicon machines expose the key interface on this child entry
const KEYS_ENDPOINT: &str = "AppleSMCKeysEndpoint";

static HANDLE_OPEN: AtomicBool = AtomicBool::new(false);

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOServiceMatching(name: *const c_char) -> CFMutableDictionaryRef;
    fn IOServiceGetMatchingServices(
        main_port: mach_port_t,
        matching: CFDictionaryRef,
        existing: *mut IoObject,
    ) -> kern_return_t;
    fn IOIteratorNext(iterator: IoObject) -> IoObject;
    fn IORegistryEntryGetName(entry: IoObject, name: *mut c_char) -> kern_return_t;
    fn IOServiceOpen(
        service: IoObject,
        owning_task: mach_port_t,
        connection_type: u32,
        connection: *mut IoObject,
    ) -> kern_return_t;
    fn IOServiceClose(connection: IoObject) -> kern_return_t;
    fn IOObjectRelease(object: IoObject) -> kern_return_t;
    fn IOConnectCallStructMethod(
        connection: IoObject,
        selector: u32,
        input: *const c_void,
        input_size: usize,
        output: *mut c_void,
        output_size: *mut usize,
    ) -> kern_return_t;
}

/// Iterator over registry entries matching a service name
struct ServiceIterator {
    iterator: IoObject,
}

impl ServiceIterator {
    fn new(service_name: &str) -> Result<Self> {
        let name = CString::new(service_name)
            .map_err(|e| SmcError::Connection(format!("Invalid service name: {}", e)))?;
        let mut iterator: IoObject = 0;

        // IOServiceGetMatchingServices consumes the matching dictionary.
        let result = unsafe {
            let matching = IOServiceMatching(name.as_ptr());
            if matching.is_null() {
                return Err(SmcError::Connection(format!(
                    "Failed to create matching dictionary for {}",
                    service_name
                )));
            }
            IOServiceGetMatchingServices(0, matching as CFDictionaryRef, &mut iterator)
        };

        if result != KERN_SUCCESS {
            return Err(SmcError::Connection(format!(
                "{} service not found (IOKit error {})",
                service_name, result
            )));
        }

        Ok(Self { iterator })
    }
}

impl Iterator for ServiceIterator {
    type Item = (IoObject, String);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = unsafe { IOIteratorNext(self.iterator) };
        if entry == 0 {
            return None;
        }

        let mut name_buf = [0 as c_char; 128];
        let name = if unsafe { IORegistryEntryGetName(entry, name_buf.as_mut_ptr()) }
            == KERN_SUCCESS
        {
            unsafe { CStr::from_ptr(name_buf.as_ptr()) }
                .to_string_lossy()
                .into_owned()
        } else {
            String::new()
        };

        Some((entry, name))
    }
}

impl Drop for ServiceIterator {
    fn drop(&mut self) {
        if self.iterator != 0 {
            unsafe {
                IOObjectRelease(self.iterator);
            }
        }
    }
}

/// Connection to the `AppleSMC` user client
pub struct IoKitDriver {
    connection: IoObject,
    description: String,
}

impl IoKitDriver {
    /// Open the controller service.
    ///
    /// Fails with `SmcError::Connection` if the service is missing, access is
    /// denied, or this process already holds a handle.
    pub fn open() -> Result<Self> {
        if HANDLE_OPEN.swap(true, Ordering::AcqRel) {
            return Err(SmcError::Connection(
                "An SMC handle is already open in this process".to_string(),
            ));
        }

        match Self::open_service() {
            Ok(driver) => Ok(driver),
            Err(e) => {
                HANDLE_OPEN.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    fn open_service() -> Result<Self> {
        debug!("Searching for {} service", SERVICE_NAME);

        // Prefer the keys endpoint, otherwise the first matching entry.
        let mut chosen: Option<(IoObject, String)> = None;
        for (entry, name) in ServiceIterator::new(SERVICE_NAME)? {
            debug!("  Candidate entry: {:?}", name);
            let better = match &chosen {
                None => true,
                Some((_, current)) => name == KEYS_ENDPOINT && current != KEYS_ENDPOINT,
            };
            if better {
                if let Some((previous, _)) = chosen.replace((entry, name)) {
                    unsafe { IOObjectRelease(previous) };
                }
            } else {
                unsafe { IOObjectRelease(entry) };
            }
        }

        let (service, name) = chosen.ok_or_else(|| {
            error!("{} not found", SERVICE_NAME);
            SmcError::Connection(format!("No {} service entry found", SERVICE_NAME))
        })?;

        let mut connection: IoObject = 0;
        let result = unsafe {
            let result = IOServiceOpen(service, mach_task_self(), 0, &mut connection);
            IOObjectRelease(service);
            result
        };

        match result {
            KERN_SUCCESS if connection != 0 => {
                info!("Opened SMC connection via {}", name);
                Ok(Self {
                    connection,
                    description: format!("{} ({})", SERVICE_NAME, name),
                })
            }
            KIO_RETURN_NOT_PRIVILEGED => {
                error!("Access to {} denied", SERVICE_NAME);
                Err(SmcError::Connection(
                    "Access to the SMC was denied (kIOReturnNotPrivileged)".to_string(),
                ))
            }
            code => {
                error!("IOServiceOpen failed: {}", code);
                Err(SmcError::Connection(format!(
                    "Failed to open {}: IOKit error {}",
                    SERVICE_NAME, code
                )))
            }
        }
    }

    fn release(&mut self) {
        if self.connection != 0 {
            unsafe {
                IOServiceClose(self.connection);
            }
            self.connection = 0;
            HANDLE_OPEN.store(false, Ordering::Release);
            debug!("SMC connection closed");
        }
    }
}

impl SmcTransport for IoKitDriver {
    fn call(&mut self, request: &SmcRequest) -> Result<SmcResponse> {
        if self.connection == 0 {
            return Err(SmcError::Protocol("SMC connection is closed".to_string()));
        }

        let input = KeyData::from(request);
        let mut output = KeyData::default();
        let mut output_size = mem::size_of::<KeyData>();

        let result = unsafe {
            IOConnectCallStructMethod(
                self.connection,
                KERNEL_INDEX_SMC,
                &input as *const KeyData as *const c_void,
                mem::size_of::<KeyData>(),
                &mut output as *mut KeyData as *mut c_void,
                &mut output_size,
            )
        };

        if result != KERN_SUCCESS {
            error!(
                "IOConnectCallStructMethod failed for {:?} {}: {}",
                request.op, request.key, result
            );
            return Err(SmcError::Protocol(format!(
                "IOConnectCallStructMethod failed with IOKit error {}",
                result
            )));
        }

        Ok(SmcResponse::from(&output))
    }

    fn close(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for IoKitDriver {
    fn drop(&mut self) {
        self.release();
    }
}
