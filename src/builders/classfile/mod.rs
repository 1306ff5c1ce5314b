//! Call graph construction from compiled JVM class files.
//!
//! Each class file is decoded on its own: the instruction stream of every
//! method is scanned for invoke instructions and each operand is resolved
//! through that class's constant pool. Calls into library classes still
//! produce nodes; they simply carry no source path.

mod bytecode;
mod constant_pool;
mod reader;

pub use constant_pool::MemberRef;

use self::bytecode::{scan_call_sites, INVOKEDYNAMIC, INVOKESPECIAL, INVOKESTATIC};
use self::constant_pool::ConstantPool;
use self::reader::ByteReader;
use super::{ensure_not_empty, unsupported_source, GraphBuilder, GraphSource};
use crate::config::Granularity;
use crate::errors::{Error, Result};
use crate::graph::{EdgeKind, UnitGraph};
use crate::resolver::SourceResolver;
use crate::unit::Unit;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    pub target: MemberRef,
    pub kind: EdgeKind,
    /// Byte offset of the invoke instruction.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMethod {
    pub name: String,
    pub descriptor: String,
    pub calls: Vec<ResolvedCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClass {
    /// Dotted binary name, e.g. `com.acme.Billing$Line`.
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<DecodedMethod>,
}

/// Decode one class-file image.
pub fn decode_class(bytes: &[u8]) -> Result<DecodedClass> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(Error::class_format(format!("bad magic 0x{magic:08x}"), 0));
    }
    let _minor = reader.u16()?;
    let _major = reader.u16()?;

    let pool = ConstantPool::parse(&mut reader)?;

    let _access = reader.u16()?;
    let name = pool.class_name(reader.u16()?)?;
    let super_name = match reader.u16()? {
        0 => None,
        index => Some(pool.class_name(index)?),
    };

    let interface_count = reader.u16()?;
    let interfaces = (0..interface_count)
        .map(|_| pool.class_name(reader.u16()?))
        .collect::<Result<Vec<_>>>()?;

    let field_count = reader.u16()?;
    for _ in 0..field_count {
        reader.skip(6)?; // access, name, descriptor
        skip_attributes(&mut reader)?;
    }

    let method_count = reader.u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        methods.push(decode_method(&mut reader, &pool, &name)?);
    }

    Ok(DecodedClass {
        name,
        super_name,
        interfaces,
        methods,
    })
}

fn skip_attributes(reader: &mut ByteReader<'_>) -> Result<()> {
    let count = reader.u16()?;
    for _ in 0..count {
        reader.skip(2)?;
        let len = reader.u32()? as usize;
        reader.skip(len)?;
    }
    Ok(())
}

fn decode_method(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    owner: &str,
) -> Result<DecodedMethod> {
    let _access = reader.u16()?;
    let name = pool.utf8(reader.u16()?)?.to_string();
    let descriptor = pool.utf8(reader.u16()?)?.to_string();

    let mut calls = Vec::new();
    let attribute_count = reader.u16()?;
    for _ in 0..attribute_count {
        let attribute_name = pool.utf8(reader.u16()?)?;
        let len = reader.u32()? as usize;
        let body = reader.take(len)?;
        if attribute_name == "Code" {
            let mut code = ByteReader::new(body);
            code.skip(4)?; // max_stack, max_locals
            let code_len = code.u32()? as usize;
            let instructions = code.take(code_len)?;
            for site in scan_call_sites(instructions)? {
                calls.push(resolve_call_site(
                    pool,
                    owner,
                    site.opcode,
                    site.pool_index,
                    site.offset,
                )?);
            }
        }
    }

    Ok(DecodedMethod {
        name,
        descriptor,
        calls,
    })
}

fn resolve_call_site(
    pool: &ConstantPool,
    owner: &str,
    opcode: u8,
    pool_index: u16,
    offset: usize,
) -> Result<ResolvedCall> {
    if opcode == INVOKEDYNAMIC {
        // No owner class in the pool; the call site belongs to the caller.
        let (name, descriptor) = pool.invoke_dynamic(pool_index)?;
        return Ok(ResolvedCall {
            target: MemberRef {
                owner: format!("{owner}$indy"),
                name,
                descriptor,
            },
            kind: EdgeKind::Virtual,
            offset,
        });
    }

    let kind = match opcode {
        INVOKESTATIC => EdgeKind::Static,
        INVOKESPECIAL => EdgeKind::Direct,
        _ => EdgeKind::Virtual,
    };
    Ok(ResolvedCall {
        target: pool.member_ref(pool_index)?,
        kind,
        offset,
    })
}

/// Parameter part of a method descriptor: `(ILjava/lang/String;)V` -> `(ILjava/lang/String;)`.
fn parameter_signature(descriptor: &str) -> String {
    match descriptor.find(')') {
        Some(end) => descriptor[..=end].to_string(),
        None => descriptor.to_string(),
    }
}

/// Builds call graphs from class files at method or class granularity.
pub struct ClassFileBuilder {
    granularity: Granularity,
    resolver: Arc<SourceResolver>,
}

impl ClassFileBuilder {
    pub fn new(granularity: Granularity, resolver: Arc<SourceResolver>) -> Self {
        Self {
            granularity,
            resolver,
        }
    }

    fn unit_for(&self, owner: &str, name: &str, descriptor: &str) -> Unit {
        let unit = match self.granularity {
            Granularity::Method => Unit::method(
                format!("{owner}.{name}"),
                Some(parameter_signature(descriptor)),
            ),
            Granularity::Class => Unit::class(owner),
        };
        self.resolver.attach(unit)
    }

    /// Add one decoded class's call edges to `graph`.
    pub fn add_class(&self, graph: &mut UnitGraph, class: &DecodedClass) {
        for method in &class.methods {
            let caller = self.unit_for(&class.name, &method.name, &method.descriptor);
            for call in &method.calls {
                let callee =
                    self.unit_for(&call.target.owner, &call.target.name, &call.target.descriptor);
                if self.granularity == Granularity::Class && callee == caller {
                    continue;
                }
                graph.add_call(caller.clone(), callee, call.kind);
            }
        }
    }

    /// Decode images in order; malformed images are logged and skipped.
    pub fn build_from_images<'a, I>(&self, images: I) -> UnitGraph
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut graph = UnitGraph::call_graph(self.granularity);
        for (label, bytes) in images {
            match decode_class(bytes) {
                Ok(class) => self.add_class(&mut graph, &class),
                Err(e) => tracing::warn!(file = label, error = %e, "skipping malformed class file"),
            }
        }
        graph
    }

    pub fn build_from_directory(&self, root: &Path) -> Result<UnitGraph> {
        let _span = tracing::info_span!("decode_class_files", root = %root.display()).entered();

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "class"))
            .collect();
        files.sort();
        tracing::debug!(files = files.len(), "found class files");

        let mut images = Vec::with_capacity(files.len());
        for path in &files {
            match std::fs::read(path) {
                Ok(bytes) => images.push((path.display().to_string(), bytes)),
                Err(e) => {
                    let err = Error::io(path, e);
                    tracing::warn!(error = %err, "skipping unreadable class file");
                }
            }
        }

        let graph = self.build_from_images(
            images
                .iter()
                .map(|(label, bytes)| (label.as_str(), bytes.as_slice())),
        );
        ensure_not_empty(graph, &root.display().to_string())
    }
}

impl GraphBuilder for ClassFileBuilder {
    fn name(&self) -> &'static str {
        "class-file decoder"
    }

    fn build(&self, source: &GraphSource) -> Result<UnitGraph> {
        match source {
            GraphSource::ClassDirectory(root) => self.build_from_directory(root),
            GraphSource::ClassImages(images) => {
                let graph = self.build_from_images(
                    images
                        .iter()
                        .map(|(label, bytes)| (label.as_str(), bytes.as_slice())),
                );
                ensure_not_empty(graph, &source.describe())
            }
            GraphSource::Extractor(_) => Err(unsupported_source(self.name(), source)),
        }
    }
}
