//! Minimal class-file writer for tests.

use std::collections::HashMap;

/// Invoke instruction used by [`ClassFileAssembler::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invoke {
    Virtual,
    Special,
    Static,
    Interface,
    Dynamic,
}

impl Invoke {
    fn encode(self, index: u16, out: &mut Vec<u8>) {
        let opcode = match self {
            Invoke::Virtual => 0xb6,
            Invoke::Special => 0xb7,
            Invoke::Static => 0xb8,
            Invoke::Interface => 0xb9,
            Invoke::Dynamic => 0xba,
        };
        out.push(opcode);
        out.extend_from_slice(&index.to_be_bytes());
        match self {
            Invoke::Interface => out.extend_from_slice(&[0x01, 0x00]),
            Invoke::Dynamic => out.extend_from_slice(&[0x00, 0x00]),
            _ => {}
        }
    }
}

struct MethodImage {
    name_index: u16,
    descriptor_index: u16,
    code: Vec<u8>,
}

/// Builds a class-file image entry by entry.
///
/// ```rust,ignore
/// let mut asm = ClassFileAssembler::new("com/acme/Billing");
/// let read = asm.method_ref("com/acme/Ledger", "read", "(I)J");
/// asm.method("total", "()J", &ClassFileAssembler::code(&[(Invoke::Static, read)]));
/// let bytes = asm.finish();
/// ```
pub struct ClassFileAssembler {
    pool: Vec<u8>,
    next_index: u16,
    utf8_cache: HashMap<String, u16>,
    class_cache: HashMap<String, u16>,
    this_class: u16,
    super_class: u16,
    code_attribute: u16,
    methods: Vec<MethodImage>,
}

impl ClassFileAssembler {
    /// `name` uses internal form, e.g. `com/acme/Billing`.
    pub fn new(name: &str) -> Self {
        let mut asm = Self {
            pool: Vec::new(),
            next_index: 1,
            utf8_cache: HashMap::new(),
            class_cache: HashMap::new(),
            this_class: 0,
            super_class: 0,
            code_attribute: 0,
            methods: Vec::new(),
        };
        asm.this_class = asm.class_ref(name);
        asm.super_class = asm.class_ref("java/lang/Object");
        asm.code_attribute = asm.utf8("Code");
        asm
    }

    fn push_entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.extend_from_slice(bytes);
        self.next_index += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8_cache.get(value) {
            return index;
        }
        let mut entry = vec![1];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        let index = self.push_entry(&entry, 1);
        self.utf8_cache.insert(value.to_string(), index);
        index
    }

    pub fn class_ref(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.class_cache.get(name) {
            return index;
        }
        let name_index = self.utf8(name);
        let mut entry = vec![7];
        entry.extend_from_slice(&name_index.to_be_bytes());
        let index = self.push_entry(&entry, 1);
        self.class_cache.insert(name.to_string(), index);
        index
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut entry = vec![12];
        entry.extend_from_slice(&name_index.to_be_bytes());
        entry.extend_from_slice(&descriptor_index.to_be_bytes());
        self.push_entry(&entry, 1)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(11, owner, name, descriptor)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class_ref(owner);
        let nat_index = self.name_and_type(name, descriptor);
        let mut entry = vec![tag];
        entry.extend_from_slice(&class_index.to_be_bytes());
        entry.extend_from_slice(&nat_index.to_be_bytes());
        self.push_entry(&entry, 1)
    }

    pub fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> u16 {
        let nat_index = self.name_and_type(name, descriptor);
        let mut entry = vec![18, 0x00, 0x00];
        entry.extend_from_slice(&nat_index.to_be_bytes());
        self.push_entry(&entry, 1)
    }

    pub fn long_constant(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push_entry(&entry, 2)
    }

    /// The `constant_pool_count` field: one more than the highest index.
    pub fn constant_count(&self) -> u16 {
        self.next_index
    }

    /// `constant_pool_count` followed by the encoded entries.
    pub fn constant_pool_bytes(&self) -> Vec<u8> {
        let mut out = self.constant_count().to_be_bytes().to_vec();
        out.extend_from_slice(&self.pool);
        out
    }

    /// Instruction stream of invokes followed by `return`.
    pub fn code(calls: &[(Invoke, u16)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (invoke, index) in calls {
            invoke.encode(*index, &mut out);
        }
        out.push(0xb1);
        out
    }

    pub fn method(&mut self, name: &str, descriptor: &str, code: &[u8]) -> &mut Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.methods.push(MethodImage {
            name_index,
            descriptor_index,
            code: code.to_vec(),
        });
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&52u16.to_be_bytes()); // major
        out.extend_from_slice(&self.constant_pool_bytes());
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces
        out.extend_from_slice(&0u16.to_be_bytes()); // fields

        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            out.extend_from_slice(&0x0001u16.to_be_bytes());
            out.extend_from_slice(&method.name_index.to_be_bytes());
            out.extend_from_slice(&method.descriptor_index.to_be_bytes());
            out.extend_from_slice(&1u16.to_be_bytes());

            // Code: max_stack, max_locals, code_length, code,
            // exception_table_length, attributes_count
            let body_len = 2 + 2 + 4 + method.code.len() + 2 + 2;
            out.extend_from_slice(&self.code_attribute.to_be_bytes());
            out.extend_from_slice(&(body_len as u32).to_be_bytes());
            out.extend_from_slice(&4u16.to_be_bytes());
            out.extend_from_slice(&4u16.to_be_bytes());
            out.extend_from_slice(&(method.code.len() as u32).to_be_bytes());
            out.extend_from_slice(&method.code);
            out.extend_from_slice(&0u16.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
        }

        out.extend_from_slice(&0u16.to_be_bytes()); // class attributes
        out
    }
}
