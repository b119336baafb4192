//! # Code Table Serialization
//!
//! The decoder never sees the message frequencies, so the code table itself
//! is stored. Layout (all integers big-endian):
//!
//! ```text
//! [u16 symbol count]
//! repeated, ascending by symbol:
//!     [u8 symbol][u8 code length in bits][code bits, MSB first, zero padded to a byte]
//! ```
//!
//! Entries are written in symbol order, so equal tables always serialize to
//! identical bytes.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::common::bits::BitVec;
use crate::common::error::{Result, StegoError};
use crate::compression::huffman::CodeTable;

/// Longest code the one-byte length field can describe.
pub const MAX_CODE_LEN: usize = u8::MAX as usize;

pub fn serialize_table(table: &CodeTable) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(2 + table.len() * 3);
    bytes.extend_from_slice(&(table.len() as u16).to_be_bytes());

    for (symbol, code) in table.iter() {
        if code.len() > MAX_CODE_LEN {
            return Err(StegoError::InvalidTable(format!(
                "code of {symbol:#04x} is {} bits long",
                code.len()
            )));
        }
        bytes.push(symbol);
        bytes.push(code.len() as u8);
        bytes.extend_from_slice(code.as_bytes());
    }

    Ok(bytes)
}

pub fn deserialize_table(data: &[u8]) -> Result<CodeTable> {
    let mut cursor = Cursor::new(data);

    let mut count_bytes = [0u8; 2];
    read_field(&mut cursor, &mut count_bytes, "symbol count")?;
    let count = u16::from_be_bytes(count_bytes) as usize;
    if count == 0 || count > 256 {
        return Err(invalid(format!("symbol count {count} out of range")));
    }

    let mut codes = BTreeMap::new();
    for _ in 0..count {
        let mut header = [0u8; 2];
        read_field(&mut cursor, &mut header, "entry header")?;
        let [symbol, code_len] = header;
        if code_len == 0 {
            return Err(invalid(format!("symbol {symbol:#04x} has an empty code")));
        }

        let mut code_bytes = vec![0u8; (code_len as usize).div_ceil(8)];
        read_field(&mut cursor, &mut code_bytes, "code bits")?;
        let code = BitVec::from_bytes(code_bytes, code_len as usize)?;
        if !code.has_clean_padding() {
            return Err(invalid(format!("code of {symbol:#04x} has non-zero padding")));
        }

        if codes.insert(symbol, code).is_some() {
            return Err(invalid(format!("symbol {symbol:#04x} appears twice")));
        }
    }

    let consumed = cursor.position() as usize;
    if consumed != data.len() {
        let extra = data.len() - consumed;
        return Err(invalid(format!("{extra} unexpected bytes after the last entry")));
    }

    CodeTable::from_codes(codes)
}

fn read_field(cursor: &mut Cursor<&[u8]>, buf: &mut [u8], field: &str) -> Result<()> {
    cursor
        .read_exact(buf)
        .map_err(|_| invalid(format!("truncated while reading {field}")))
}

fn invalid(reason: String) -> StegoError {
    StegoError::InvalidTable(reason)
}
