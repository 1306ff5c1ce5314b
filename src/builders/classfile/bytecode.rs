//! Instruction-stream scanning for call sites.
//!
//! Only the invoke instructions matter, but every opcode must be stepped
//! over with its exact operand width or the scan desynchronises.

use super::reader::ByteReader;
use crate::errors::{Error, Result};

pub(crate) const INVOKEVIRTUAL: u8 = 0xb6;
pub(crate) const INVOKESPECIAL: u8 = 0xb7;
pub(crate) const INVOKESTATIC: u8 = 0xb8;
pub(crate) const INVOKEINTERFACE: u8 = 0xb9;
pub(crate) const INVOKEDYNAMIC: u8 = 0xba;

const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

/// One invoke instruction found in a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallSite {
    pub opcode: u8,
    /// Constant pool index of the callee reference.
    pub pool_index: u16,
    /// Byte offset of the instruction within the code array.
    pub offset: usize,
}

/// Operand byte count for fixed-width opcodes; `None` for the variable
/// width ones and for opcodes that are not defined.
fn operand_width(opcode: u8) -> Option<usize> {
    let width = match opcode {
        0x00..=0x0f => 0,
        0x10 => 1,
        0x11 => 2,
        0x12 => 1,
        0x13 | 0x14 => 2,
        0x15..=0x19 => 1,
        0x1a..=0x35 => 0,
        0x36..=0x3a => 1,
        0x3b..=0x83 => 0,
        IINC => 2,
        0x85..=0x98 => 0,
        0x99..=0xa8 => 2,
        0xa9 => 1,
        0xac..=0xb1 => 0,
        0xb2..=0xb5 => 2,
        INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => 2,
        INVOKEINTERFACE | INVOKEDYNAMIC => 4,
        0xbb => 2,
        0xbc => 1,
        0xbd => 2,
        0xbe | 0xbf => 0,
        0xc0 | 0xc1 => 2,
        0xc2 | 0xc3 => 0,
        0xc5 => 3,
        0xc6 | 0xc7 => 2,
        0xc8 | 0xc9 => 4,
        0xca | 0xfe | 0xff => 0,
        _ => return None,
    };
    Some(width)
}

/// Collect every invoke instruction in `code`, in instruction order.
pub(crate) fn scan_call_sites(code: &[u8]) -> Result<Vec<CallSite>> {
    let mut reader = ByteReader::new(code);
    let mut calls = Vec::new();

    while !reader.is_at_end() {
        let offset = reader.position();
        let opcode = reader.u8()?;

        match opcode {
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => {
                calls.push(CallSite {
                    opcode,
                    pool_index: reader.u16()?,
                    offset,
                });
            }
            INVOKEINTERFACE | INVOKEDYNAMIC => {
                calls.push(CallSite {
                    opcode,
                    pool_index: reader.u16()?,
                    offset,
                });
                // count/zero bytes
                reader.skip(2)?;
            }
            TABLESWITCH => {
                skip_padding(&mut reader, offset)?;
                reader.skip(4)?; // default
                let low = reader.i32()?;
                let high = reader.i32()?;
                if high < low {
                    return Err(Error::class_format("tableswitch high < low", offset));
                }
                let entries = (i64::from(high) - i64::from(low) + 1) as usize;
                reader.skip(entries * 4)?;
            }
            LOOKUPSWITCH => {
                skip_padding(&mut reader, offset)?;
                reader.skip(4)?; // default
                let pairs = reader.i32()?;
                if pairs < 0 {
                    return Err(Error::class_format("negative lookupswitch pair count", offset));
                }
                reader.skip(pairs as usize * 8)?;
            }
            WIDE => {
                let modified = reader.u8()?;
                reader.skip(if modified == IINC { 4 } else { 2 })?;
            }
            other => match operand_width(other) {
                Some(width) => reader.skip(width)?,
                None => {
                    return Err(Error::class_format(
                        format!("undefined opcode 0x{other:02x}"),
                        offset,
                    ))
                }
            },
        }
    }

    Ok(calls)
}

/// Switch operands start at the next 4-byte boundary of the code array.
fn skip_padding(reader: &mut ByteReader<'_>, opcode_offset: usize) -> Result<()> {
    let padding = (4 - (opcode_offset + 1) % 4) % 4;
    reader.skip(padding)
}
