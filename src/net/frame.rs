// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Wire framing: a fixed 6-byte little-endian header followed by exactly
//! `body_size` payload bytes.
//!
//! ```text
//! offset 0..4   body_size : uint32, little-endian
//! offset 4..6   type      : uint16, little-endian
//! offset 6..6+body_size   payload : opaque bytes
//! ```
//!
//! Little-endian, no padding: wire compatibility depends on the exact
//! byte layout, not just the field order. The `zerocopy` derives give a
//! zero-copy wire view of a fixed-size struct without needing `unsafe`
//! transmutes.

use bytes::{BufMut, Bytes, BytesMut};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, U32};

/// Size of the wire header in bytes.
pub const HEADER_SIZE: usize = 6;
/// Largest accepted `body_size`, inclusive.
pub const MAX_PACKET_SIZE: u32 = 65536;

/// 16-bit packet type tag. The core is payload-agnostic beyond this tag;
/// concrete values are an application concern layered on top (see
/// [`crate::app::chat`]).
pub type PacketType = u16;

/// Client-to-server movement packet.
pub const C2S_MOVE: PacketType = 1;
/// Client-to-server chat packet.
pub const C2S_CHAT: PacketType = 2;
/// Server-to-client chat packet (not subject to inbound validation).
pub const S2C_CHAT: PacketType = 100;

/// Returns whether `type_tag` is legal on the inbound (client-to-server)
/// direction. Applications that extend the packet set should route
/// inbound validation through a type that wraps this predicate rather
/// than duplicating it, so the session's protocol-violation path stays
/// authoritative.
#[inline]
pub fn is_valid_inbound_type(type_tag: PacketType) -> bool {
    matches!(type_tag, C2S_MOVE | C2S_CHAT)
}

/// The fixed 6-byte wire header, byte-exact and padding-free.
///
/// `U32`/`U16` are zerocopy's byte-array-backed integer wrappers (align 1),
/// so a plain `#[repr(C)]` already produces a padding-free 6-byte layout —
/// no `packed` attribute, and so no unaligned-access hazard, needed.
#[repr(C)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable,
)]
pub struct PacketHeader {
    /// Payload length in bytes, excluding this header.
    pub body_size: U32<LittleEndian>,
    /// Packet type tag.
    pub r#type: U16<LittleEndian>,
}

impl PacketHeader {
    /// Decodes a header from exactly [`HEADER_SIZE`] bytes.
    ///
    /// # Panics
    /// Panics if `bytes.len() != HEADER_SIZE`; callers read exactly
    /// `HEADER_SIZE` bytes off the wire before calling this, so the
    /// length mismatch can't happen in the session read loop.
    pub fn decode(bytes: &[u8]) -> Self {
        Self::read_from_bytes(bytes).expect("header buffer must be exactly HEADER_SIZE bytes")
    }

    /// `body_size` as a plain `u32` in host byte order.
    #[inline]
    pub fn body_size(&self) -> u32 {
        self.body_size.get()
    }

    /// `type` as a plain `u16` in host byte order.
    #[inline]
    pub fn packet_type(&self) -> PacketType {
        self.r#type.get()
    }

    /// Whether `body_size` falls in the accepted `[1, MAX_PACKET_SIZE]`
    /// range.
    #[inline]
    pub fn body_size_in_range(&self) -> bool {
        self.fits_within(MAX_PACKET_SIZE)
    }

    /// Whether `body_size` falls in `[1, max_packet_size]`. The session read
    /// loop calls this with the configured cap rather than the global
    /// default, so a deployment can tighten it below [`MAX_PACKET_SIZE`].
    #[inline]
    pub fn fits_within(&self, max_packet_size: u32) -> bool {
        let n = self.body_size();
        n >= 1 && n <= max_packet_size
    }
}

/// Encodes `(type, payload)` into a contiguous frame buffer: header
/// followed by the payload, with no framing errors possible (unlike
/// decode, encode cannot observe an invalid `body_size` — the caller
/// controls `payload.len()`).
pub fn encode(type_tag: PacketType, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u32_le(payload.len() as u32);
    buf.put_u16_le(type_tag);
    buf.put_slice(payload);
    buf.freeze()
}
