//! codec/prim — примитивы: целые (big‑endian, независимо от порядка байт хоста), bool, строки.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ByteOrder};

use crate::entry::Traits;

use super::{StorageRead, StorageWrite};

pub fn put_u32<W: StorageWrite + ?Sized>(s: &mut W, v: u32) -> Result<()> {
    let mut b = [0u8; 4];
    BigEndian::write_u32(&mut b, v);
    s.write_bytes(&b)
}

pub fn put_i32<W: StorageWrite + ?Sized>(s: &mut W, v: i32) -> Result<()> {
    let mut b = [0u8; 4];
    BigEndian::write_i32(&mut b, v);
    s.write_bytes(&b)
}

/// u64 — две половины u32, старшая первой.
pub fn put_u64<W: StorageWrite + ?Sized>(s: &mut W, v: u64) -> Result<()> {
    put_u32(s, (v >> 32) as u32)?;
    put_u32(s, (v & 0xFFFF_FFFF) as u32)
}

pub fn put_bool<W: StorageWrite + ?Sized>(s: &mut W, v: bool) -> Result<()> {
    s.write_bytes(&[v as u8])
}

/// Строка: u32 длина в байтах UTF‑8, затем байты. Пустая строка — только длина 0.
pub fn put_str<W: StorageWrite + ?Sized>(s: &mut W, v: &str) -> Result<()> {
    let len = u32::try_from(v.len())
        .map_err(|_| anyhow!("codec: string of {} bytes is too long to encode", v.len()))?;
    put_u32(s, len)?;
    if len > 0 {
        s.write_bytes(v.as_bytes())?;
    }
    Ok(())
}

/// Traits — через строковый кодек над текстовой битовой маской.
pub fn put_traits<W: StorageWrite + ?Sized>(s: &mut W, t: Traits) -> Result<()> {
    put_str(s, &t.to_bit_string())
}

pub fn get_u32<R: StorageRead + ?Sized>(s: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    s.read_bytes(&mut b)?;
    Ok(BigEndian::read_u32(&b))
}

pub fn get_i32<R: StorageRead + ?Sized>(s: &mut R) -> Result<i32> {
    let mut b = [0u8; 4];
    s.read_bytes(&mut b)?;
    Ok(BigEndian::read_i32(&b))
}

pub fn get_u64<R: StorageRead + ?Sized>(s: &mut R) -> Result<u64> {
    let hi = get_u32(s)? as u64;
    let lo = get_u32(s)? as u64;
    Ok((hi << 32) | lo)
}

pub fn get_bool<R: StorageRead + ?Sized>(s: &mut R) -> Result<bool> {
    let mut b = [0u8; 1];
    s.read_bytes(&mut b)?;
    Ok(b[0] != 0)
}

pub fn get_str<R: StorageRead + ?Sized>(s: &mut R) -> Result<String> {
    let len = get_u32(s)? as usize;
    if len == 0 {
        return Ok(String::new());
    }
    let mut buf = vec![0u8; len];
    s.read_bytes(&mut buf)?;
    String::from_utf8(buf).map_err(|e| anyhow!("codec: string is not valid UTF-8: {}", e))
}

pub fn get_traits<R: StorageRead + ?Sized>(s: &mut R) -> Result<Traits> {
    let text = get_str(s)?;
    Traits::from_bit_string(&text)
}
