//! SMC wire protocol
//!
//! Every exchange with the controller is one fixed-size [`KeyData`] struct in
//! and one out, passed through the `AppleSMC` user client. The struct carries
//! an operation selector, the key, and (for reads) the key-info obtained
//! earlier; the reply carries a status byte plus key-info or value bytes.

use smc_core::{Key, KeyInfo, TypeTag};

/// `IOConnectCallStructMethod` selector of the SMC user client
pub const KERNEL_INDEX_SMC: u32 = 2;

/// Maximum value payload in one exchange
pub const MAX_DATA_SIZE: usize = 32;

/// Controller status codes carried in [`KeyData::result`]
pub mod status {
    pub const SUCCESS: u8 = 0x00;
    pub const ERROR: u8 = 0x01;
    pub const COMM_ERROR: u8 = 0x80;
    pub const SPURIOUS_DATA: u8 = 0x81;
    pub const BAD_COMMAND: u8 = 0x82;
    pub const BAD_PARAMETER: u8 = 0x83;
    pub const KEY_NOT_FOUND: u8 = 0x84;
    pub const KEY_NOT_READABLE: u8 = 0x85;
    pub const KEY_NOT_WRITABLE: u8 = 0x86;
    pub const KEY_SIZE_MISMATCH: u8 = 0x87;
    pub const FRAMING_ERROR: u8 = 0x88;
    pub const BAD_ARGUMENT: u8 = 0x89;
    pub const TIMEOUT: u8 = 0xB7;
    pub const KEY_INDEX_RANGE: u8 = 0xB8;
}

/// Operations used by the client. The client never writes keys.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmcOp {
    /// Read the value bytes of a key (5)
    ReadBytes = 5,
    /// Read the key stored at an index (8)
    ReadIndex = 8,
    /// Read size and type of a key (9)
    ReadKeyInfo = 9,
}

/// One structured command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmcRequest {
    pub op: SmcOp,
    pub key: Key,
    /// Key index for [`SmcOp::ReadIndex`]
    pub index: u32,
    /// Declared value size for [`SmcOp::ReadBytes`]
    pub data_size: u32,
    /// Declared value type for [`SmcOp::ReadBytes`]
    pub data_type: u32,
}

impl SmcRequest {
    /// Ask for the size and type of `key`
    pub fn key_info(key: Key) -> Self {
        Self {
            op: SmcOp::ReadKeyInfo,
            key,
            index: 0,
            data_size: 0,
            data_type: 0,
        }
    }

    /// Ask for the value of `key`, declaring the layout from `info`
    pub fn read_bytes(key: Key, info: &KeyInfo) -> Self {
        Self {
            op: SmcOp::ReadBytes,
            key,
            index: 0,
            data_size: info.size,
            data_type: info.tag.to_u32(),
        }
    }

    /// Ask for the key stored at `index`
    pub fn read_index(index: u32) -> Self {
        Self {
            op: SmcOp::ReadIndex,
            key: Key::from_u32(0),
            index,
            data_size: 0,
            data_type: 0,
        }
    }
}

/// One structured reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmcResponse {
    /// Controller status, [`status::SUCCESS`] on success
    pub result: u8,
    /// Key echoed back, or the key found at the requested index
    pub key: Key,
    /// Value size reported by key-info
    pub data_size: u32,
    /// Value type reported by key-info
    pub data_type: u32,
    /// Attribute bits reported by key-info
    pub data_attributes: u8,
    /// Value bytes for [`SmcOp::ReadBytes`]
    pub bytes: [u8; MAX_DATA_SIZE],
}

impl SmcResponse {
    /// A successful reply with no payload
    pub fn ok(key: Key) -> Self {
        Self {
            result: status::SUCCESS,
            key,
            data_size: 0,
            data_type: 0,
            data_attributes: 0,
            bytes: [0; MAX_DATA_SIZE],
        }
    }

    /// A failed reply carrying `result`
    pub fn failure(key: Key, result: u8) -> Self {
        Self {
            result,
            ..Self::ok(key)
        }
    }

    /// Key-info fields of the reply
    pub fn key_info(&self) -> KeyInfo {
        KeyInfo {
            size: self.data_size,
            tag: TypeTag::from_u32(self.data_type),
            attributes: self.data_attributes,
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyDataVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub reserved: u8,
    pub release: u16,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerLimitData {
    pub version: u16,
    pub length: u16,
    pub cpu_p_limit: u32,
    pub gpu_p_limit: u32,
    pub mem_p_limit: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyInfoData {
    pub data_size: u32,
    pub data_type: u32,
    pub data_attributes: u8,
}

/// The kernel-facing struct, 80 bytes with C layout.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyData {
    pub key: u32,
    pub vers: KeyDataVersion,
    pub p_limit_data: PowerLimitData,
    pub key_info: KeyInfoData,
    pub result: u8,
    pub status: u8,
    pub data8: u8,
    pub data32: u32,
    pub bytes: [u8; MAX_DATA_SIZE],
}

impl From<&SmcRequest> for KeyData {
    fn from(request: &SmcRequest) -> Self {
        KeyData {
            key: request.key.to_u32(),
            key_info: KeyInfoData {
                data_size: request.data_size,
                data_type: request.data_type,
                data_attributes: 0,
            },
            data8: request.op as u8,
            data32: request.index,
            ..Default::default()
        }
    }
}

impl From<&KeyData> for SmcResponse {
    fn from(data: &KeyData) -> Self {
        SmcResponse {
            result: data.result,
            key: Key::from_u32(data.key),
            data_size: data.key_info.data_size,
            data_type: data.key_info.data_type,
            data_attributes: data.key_info.data_attributes,
            bytes: data.bytes,
        }
    }
}
