//! Constant pool of a single class file.
//!
//! Call instructions carry an index into this table; resolving it yields
//! the owner class, member name and descriptor of the callee.

use super::reader::ByteReader;
use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Constant {
    /// Index 0 and the second slot of long/double entries.
    Unusable,
    Utf8(String),
    /// Integer, float, string, method type and other values call
    /// resolution never looks at.
    Opaque,
    /// Long or double; occupies two slots.
    Wide,
    Class {
        name_index: u16,
    },
    MemberRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    InvokeDynamic {
        name_and_type_index: u16,
    },
}

/// A resolved method reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// Dotted binary name of the owning class.
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let count = reader.u16()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let offset = reader.position();
            let tag = reader.u8()?;
            let constant = match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    // Modified UTF-8 differs from UTF-8 only for NUL and
                    // supplementary characters, neither of which affects
                    // qualified names.
                    Constant::Utf8(String::from_utf8_lossy(reader.take(len)?).into_owned())
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Opaque
                }
                5 | 6 => {
                    reader.skip(8)?;
                    Constant::Wide
                }
                7 => Constant::Class {
                    name_index: reader.u16()?,
                },
                8 | 16 | 19 | 20 => {
                    reader.skip(2)?;
                    Constant::Opaque
                }
                9 | 10 | 11 => Constant::MemberRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                12 => Constant::NameAndType {
                    name_index: reader.u16()?,
                    descriptor_index: reader.u16()?,
                },
                15 => {
                    reader.skip(3)?;
                    Constant::Opaque
                }
                17 => {
                    reader.skip(4)?;
                    Constant::Opaque
                }
                18 => {
                    let _bootstrap = reader.u16()?;
                    Constant::InvokeDynamic {
                        name_and_type_index: reader.u16()?,
                    }
                }
                other => {
                    return Err(Error::class_format(
                        format!("unknown constant pool tag {other}"),
                        offset,
                    ))
                }
            };

            let wide = constant == Constant::Wide;
            entries.push(constant);
            if wide {
                entries.push(Constant::Unusable);
            }
        }

        if entries.len() != count.max(1) {
            return Err(Error::class_format(
                "long or double entry overruns the constant pool",
                reader.position(),
            ));
        }

        Ok(Self { entries })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: u16) -> Result<&Constant> {
        self.entries
            .get(index as usize)
            .ok_or_else(|| Error::class_format(format!("constant pool index {index} out of range"), 0))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    /// Dotted binary name of a `Class` entry.
    pub fn class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            Constant::Class { name_index } => Ok(self.utf8(*name_index)?.replace('/', ".")),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    fn name_and_type(&self, index: u16) -> Result<(String, String)> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((
                self.utf8(*name_index)?.to_string(),
                self.utf8(*descriptor_index)?.to_string(),
            )),
            other => Err(mismatch(index, "NameAndType", other)),
        }
    }

    /// Resolve a `Methodref`, `InterfaceMethodref` or `Fieldref` operand.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef> {
        match self.get(index)? {
            Constant::MemberRef {
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok(MemberRef {
                    owner,
                    name,
                    descriptor,
                })
            }
            other => Err(mismatch(index, "MemberRef", other)),
        }
    }

    /// Name and descriptor of an `InvokeDynamic` call site.
    pub fn invoke_dynamic(&self, index: u16) -> Result<(String, String)> {
        match self.get(index)? {
            Constant::InvokeDynamic {
                name_and_type_index,
            } => self.name_and_type(*name_and_type_index),
            other => Err(mismatch(index, "InvokeDynamic", other)),
        }
    }
}

fn mismatch(index: u16, expected: &str, found: &Constant) -> Error {
    Error::class_format(
        format!("constant pool entry {index} is {found:?}, expected {expected}"),
        0,
    )
}
