//! Binary stream codec for query builders
//!
//! Primitive layout:
//! - `i32` / `f32`: 4 bytes, big endian (floats as IEEE 754 bits)
//! - `vint`: 7 bits per byte, low groups first, high bit set on all but the last byte
//! - `string`: vint byte length followed by UTF-8 bytes
//! - `optional string`: presence byte (0 or 1), then the string when present
//!
//! Named queries are written as their discriminator string followed by the
//! query's own body, so nested queries can be decoded through a
//! [`NamedQueryRegistry`] without knowing their concrete type up front.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::config::StreamSettings;
use crate::error::QueryDslError;
use crate::query::ast::{QueryNode, SpanQueryNode};
use crate::query::registry::NamedQueryRegistry;
use crate::Result;

/// Growable output buffer that query builders serialize into
///
/// Writes are held to the same [`StreamSettings`] limits the reading side
/// enforces, so anything written here decodes under those settings.
#[derive(Debug, Default)]
pub struct StreamOutput {
    buf: BytesMut,
    settings: StreamSettings,
    depth: usize,
}

impl StreamOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn with_settings(settings: StreamSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.put_f32(value);
    }

    pub fn write_vint(&mut self, mut value: u32) {
        while value & !0x7F != 0 {
            self.buf.put_u8(((value & 0x7F) | 0x80) as u8);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let length = value.len();
        let max = self.settings.max_string_length;
        if length > max {
            return Err(QueryDslError::StringTooLong { length, max });
        }
        let encoded = u32::try_from(length).map_err(|_| QueryDslError::StringTooLong {
            length,
            max: u32::MAX as usize,
        })?;
        self.write_vint(encoded);
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    pub fn write_optional_string(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => {
                self.write_bool(true);
                self.write_string(value)
            }
            None => {
                self.write_bool(false);
                Ok(())
            }
        }
    }

    /// Write a query prefixed with its discriminator
    pub fn write_named_query<Q: QueryNode + ?Sized>(&mut self, query: &Q) -> Result<()> {
        if self.depth >= self.settings.max_nesting_depth {
            return Err(QueryDslError::NestingTooDeep(self.settings.max_nesting_depth));
        }
        self.write_string(query.name())?;

        self.depth += 1;
        let written = query.write_to(self);
        self.depth -= 1;
        written
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish writing and return the encoded bytes
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Input stream that query builders deserialize from
///
/// Named queries are decoded through the registry the stream was created
/// with. Nesting depth and string lengths are bounded by [`StreamSettings`].
pub struct StreamInput<'r> {
    buf: Bytes,
    registry: &'r NamedQueryRegistry,
    settings: StreamSettings,
    depth: usize,
}

impl<'r> StreamInput<'r> {
    pub fn new(buf: impl Into<Bytes>, registry: &'r NamedQueryRegistry) -> Self {
        Self::with_settings(buf, registry, StreamSettings::default())
    }

    pub fn with_settings(
        buf: impl Into<Bytes>,
        registry: &'r NamedQueryRegistry,
        settings: StreamSettings,
    ) -> Self {
        Self {
            buf: buf.into(),
            registry,
            settings,
            depth: 0,
        }
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(QueryDslError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(QueryDslError::InvalidBool(other)),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    pub fn read_vint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            // the fifth byte only has room for the top four bits
            if shift == 28 && byte & 0xF0 != 0 {
                return Err(QueryDslError::VIntTooLong);
            }
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(QueryDslError::VIntTooLong)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_vint()? as usize;
        if length > self.settings.max_string_length {
            return Err(QueryDslError::StringTooLong {
                length,
                max: self.settings.max_string_length,
            });
        }
        self.ensure(length)?;
        let bytes = self.buf.split_to(length);
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn read_optional_string(&mut self) -> Result<Option<String>> {
        if self.read_bool()? {
            Ok(Some(self.read_string()?))
        } else {
            Ok(None)
        }
    }

    /// Read a discriminator and decode the span query it names
    pub fn read_named_span_query(&mut self) -> Result<Box<dyn SpanQueryNode>> {
        let name = self.read_string()?;
        let decoder = self
            .registry
            .span_decoder(&name)
            .ok_or_else(|| QueryDslError::UnknownNamedQuery(name.clone()))?;

        if self.depth >= self.settings.max_nesting_depth {
            return Err(QueryDslError::NestingTooDeep(self.settings.max_nesting_depth));
        }

        trace!(query = %name, depth = self.depth, "decoding named span query");
        self.depth += 1;
        let query = decoder(self);
        self.depth -= 1;
        query
    }
}
